//! 确认轮询器
//!
//! 反复调用探测函数直到得到终态：
//! - 探测返回 `Pending` 或出错：等待一个间隔后重试
//! - 返回 `Succeeded` / `Failed`：立即返回
//!
//! 默认没有最大次数、没有退避、没有时限，与调用方一次 swap 的生命周期一致。
//! 需要有界轮询时由调用方通过 `with_deadline` / `with_cancel_flag` 主动开启。

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::common::error::{SwapError, SwapResult};
use crate::constants::DEFAULT_POLL_INTERVAL;
use crate::trading::outcome::PollOutcome;

/// 注入的时钟，测试中可替换为手动推进的实现
pub trait PollClock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// 基于 tokio 定时器的时钟（不会忙等）
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl PollClock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// 取消标志，可在其他任务中设置
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone)]
pub struct ConfirmationPoller {
    interval: Duration,
    deadline: Option<Duration>,
    cancel: Option<CancelFlag>,
    clock: Arc<dyn PollClock>,
}

impl Default for ConfirmationPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ConfirmationPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval, deadline: None, cancel: None, clock: Arc::new(TokioClock) }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 轮询直到终态
    ///
    /// 探测错误不会向上传播；未设置 deadline / cancel 时只会返回 `Ok`。
    pub async fn poll_until_resolved<F, Fut>(&self, mut probe: F) -> SwapResult<PollOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<PollOutcome>>,
    {
        let started = self.clock.now();
        let mut attempt: u64 = 0;

        loop {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                return Err(SwapError::PollAborted(format!("cancelled after {attempt} attempts")));
            }

            attempt += 1;
            match probe().await {
                Ok(outcome) if outcome.is_terminal() => {
                    debug!("poll resolved to {:?} after {} attempts", outcome, attempt);
                    return Ok(outcome);
                }
                Ok(_) => debug!("attempt {}: still pending", attempt),
                Err(e) => debug!("attempt {}: probe failed, retrying: {:#}", attempt, e),
            }

            if let Some(deadline) = self.deadline {
                let elapsed = self.clock.now().saturating_duration_since(started);
                if elapsed >= deadline {
                    return Err(SwapError::PollAborted(format!(
                        "deadline {deadline:?} reached after {attempt} attempts"
                    )));
                }
            }

            self.clock.sleep(self.interval).await;
        }
    }
}

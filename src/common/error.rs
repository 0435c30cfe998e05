//! Swap 流程的错误分类
//!
//! 报价、构建、发送阶段的错误都直接向调用方传播，内部不重试。
//! 确认阶段的探测错误由 `ConfirmationPoller` 吞掉并按间隔重试，
//! 只有调用方主动设置了 deadline / cancel 时才会出现 `PollAborted`。

/// Swap 错误
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    /// 金额非法（负数、溢出或无法解析）
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// 地址无法解析
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Router 元数据或 jetton 钱包查询失败
    #[error("router lookup failed: {0}")]
    RouterLookup(String),
    /// 价格模拟失败或计算出现除零
    #[error("quote computation failed: {0}")]
    QuoteComputation(String),
    /// 签名或广播失败
    #[error("dispatch failed: {0}")]
    Dispatch(String),
    /// 轮询被 deadline 或取消标志终止
    #[error("confirmation polling aborted: {0}")]
    PollAborted(String),
}

impl SwapError {
    /// 把 anyhow 错误链压平成一行，保留所有 context
    pub(crate) fn flatten(err: &anyhow::Error) -> String {
        format!("{err:#}")
    }
}

pub type SwapResult<T> = Result<T, SwapError>;

//! 交易结果判定
//!
//! 按交易 hash 拉取事件：
//! 1. 索引器仍在处理 -> `Pending`
//! 2. 找到 `JettonSwap` 且输入或输出 jetton master 等于交易资产的 action
//! 3. 找不到、该 action 非 ok、或事件中任何 action 非 ok -> `Failed`
//! 4. 否则 -> `Succeeded`

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::common::address::TonAddress;
use crate::common::error::SwapResult;
use crate::common::ton_api::{EventAction, LedgerEvent};

pub const JETTON_SWAP_ACTION: &str = "JettonSwap";
pub const ACTION_STATUS_OK: &str = "ok";

/// 链上事件服务
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn get_event(&self, hash: &str) -> Result<LedgerEvent>;
}

/// 单次探测的结果；`Pending` 由轮询器重试，其余为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollOutcome {
    Pending,
    Succeeded,
    Failed,
}

impl PollOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollOutcome::Pending)
    }
}

/// 对单个事件做判定（纯函数）
pub fn classify_event(event: &LedgerEvent, asset: &TonAddress) -> PollOutcome {
    if event.in_progress {
        return PollOutcome::Pending;
    }

    let matching = event.actions.iter().find(|action| is_matching_swap(action, asset));
    let any_failed = event.actions.iter().any(|action| action.status != ACTION_STATUS_OK);

    match matching {
        Some(action) if action.status == ACTION_STATUS_OK && !any_failed => PollOutcome::Succeeded,
        _ => PollOutcome::Failed,
    }
}

fn is_matching_swap(action: &EventAction, asset: &TonAddress) -> bool {
    if action.kind != JETTON_SWAP_ACTION {
        return false;
    }
    let Some(swap) = action.jetton_swap.as_ref() else {
        return false;
    };

    [swap.jetton_master_in.as_ref(), swap.jetton_master_out.as_ref()]
        .into_iter()
        .flatten()
        .any(|master| master.address.parse::<TonAddress>().is_ok_and(|addr| addr == *asset))
}

pub struct OutcomeClassifier {
    events: Arc<dyn EventSource>,
}

impl OutcomeClassifier {
    pub fn new(events: Arc<dyn EventSource>) -> Self {
        Self { events }
    }

    /// 拉取事件并判定；拉取失败原样返回，由轮询器决定是否重试
    pub async fn classify(&self, hash: &str, asset: &TonAddress) -> Result<PollOutcome> {
        let event = self.events.get_event(hash).await?;
        Ok(classify_event(&event, asset))
    }

    /// 解析资产地址，便于在轮询前一次性校验
    pub fn parse_asset(asset_address: &str) -> SwapResult<TonAddress> {
        asset_address.parse()
    }
}

//! 交易相关默认值与 gas 常量

use std::time::Duration;

/// 默认滑点（百分比刻度，20 表示 0.20）
pub const DEFAULT_SLIPPAGE: u32 = 20;

/// 确认轮询默认间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// TON -> Jetton：随 pTON 转账附带的 forward gas（0.3 TON）
pub const SWAP_TON_TO_JETTON_FORWARD_GAS: u128 = 300_000_000;

/// Jetton -> TON：附加到 jetton 转账消息上的 gas（0.3 TON）
pub const SWAP_JETTON_TO_TON_GAS: u128 = 300_000_000;

/// Jetton -> TON：jetton 钱包转发给 router 的 gas（0.24 TON）
pub const SWAP_JETTON_TO_TON_FORWARD_GAS: u128 = 240_000_000;

//! 常用资产常量定义

/// 原生 TON 在 STON.fi API 中使用的伪地址
pub const TON_ADDRESS: &str = "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c";

/// TON 与 jetton 的链上精度（小数位数）
pub const NANO_DECIMALS: u32 = 9;

/// 1 TON = 10^9 nanoTON
pub const NANO_PER_UNIT: u128 = 1_000_000_000;

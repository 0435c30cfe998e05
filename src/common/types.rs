use std::env;
use std::time::Duration;

use super::ston_api::StonApiConfig;
use super::ton_api::TonApiConfig;
use crate::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_SLIPPAGE};

/// SDK 配置
///
/// 钱包助记词不在这里：签名与广播由外部 `TransactionSender` 负责。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwapConfig {
    pub ston_api: StonApiConfig,
    pub ton_api: TonApiConfig,
    /// 请求未指定滑点时使用（百分比刻度，20 = 0.20）
    pub default_slippage: u32,
    /// 确认轮询间隔（默认 1s）
    pub poll_interval: Duration,
    /// 确认轮询的总时限，None 表示一直等到终态
    pub poll_deadline: Option<Duration>,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapConfig {
    pub fn new() -> Self {
        Self {
            ston_api: StonApiConfig::default(),
            ton_api: TonApiConfig::default(),
            default_slippage: DEFAULT_SLIPPAGE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_deadline: None,
        }
    }

    /// 从环境变量读取配置
    ///
    /// - `TON_API_TOKEN`：TonAPI bearer token
    /// - `STON_API_URL` / `TON_API_URL`：覆盖默认 API 地址
    pub fn from_env() -> Self {
        let mut config = Self::new();
        config.ton_api.api_key = non_empty_env("TON_API_TOKEN");
        if let Some(url) = non_empty_env("STON_API_URL") {
            config.ston_api.base_host = url;
        }
        if let Some(url) = non_empty_env("TON_API_URL") {
            config.ton_api.base_host = url;
        }
        config
    }

    pub fn with_default_slippage(mut self, slippage: u32) -> Self {
        self.default_slippage = slippage;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// 设置确认轮询总时限（默认不限时）
    pub fn with_poll_deadline(mut self, deadline: Duration) -> Self {
        self.poll_deadline = Some(deadline);
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub type AnyResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SwapConfig::new();
        assert_eq!(config.default_slippage, 20);
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert!(config.poll_deadline.is_none());
        assert_eq!(config.ston_api.base_host, "https://api.ston.fi");
        assert!(config.ton_api.api_key.is_none());
    }

    #[test]
    fn test_builders() {
        let config = SwapConfig::new()
            .with_default_slippage(5)
            .with_poll_interval(Duration::from_millis(250))
            .with_poll_deadline(Duration::from_secs(60));
        assert_eq!(config.default_slippage, 5);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.poll_deadline, Some(Duration::from_secs(60)));
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::ston_api::build_http_client;
use crate::trading::outcome::EventSource;

/// TonAPI 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TonApiConfig {
    /// 基础地址，例如 `https://tonapi.io`
    pub base_host: String,
    /// Bearer token（可选，未配置时走匿名限流）
    pub api_key: Option<String>,
    /// 请求超时时间（毫秒）
    pub timeout_millis: u64,
}

impl Default for TonApiConfig {
    fn default() -> Self {
        Self {
            base_host: "https://tonapi.io".to_string(),
            api_key: None,
            timeout_millis: 10_000,
        }
    }
}

/// TonAPI HTTP 客户端，只用于按 hash 查询链上事件
#[derive(Clone)]
pub struct TonApiClient {
    http: Client,
    pub config: TonApiConfig,
}

impl TonApiClient {
    pub fn new(config: TonApiConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_millis)?;
        Ok(Self { http, config })
    }

    /// `GET /v2/events/{hash}`
    ///
    /// 未被索引的 hash 会返回 404，这里作为普通错误返回，由轮询层重试。
    pub async fn get_event(&self, hash: &str) -> Result<LedgerEvent> {
        let url = format!("{}/v2/events/{}", self.config.base_host.trim_end_matches('/'), hash);
        let mut req = self.http.get(url);
        if let Some(key) = self.config.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .context("event request failed")?
            .error_for_status()?;

        resp.json::<LedgerEvent>()
            .await
            .with_context(|| format!("failed to parse event {hash}"))
    }
}

#[async_trait]
impl EventSource for TonApiClient {
    async fn get_event(&self, hash: &str) -> Result<LedgerEvent> {
        TonApiClient::get_event(self, hash).await
    }
}

// ===================== 响应类型定义 =====================

/// 一个链上事件（可能包含多个 action）
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEvent {
    #[serde(default)]
    pub event_id: String,
    /// 索引器仍在处理该事件
    pub in_progress: bool,
    #[serde(default)]
    pub actions: Vec<EventAction>,
}

/// 事件中的单个 action
#[derive(Debug, Clone, Deserialize)]
pub struct EventAction {
    /// 例如 `"JettonSwap"`, `"TonTransfer"`
    #[serde(rename = "type")]
    pub kind: String,
    /// `"ok"` 或 `"failed"`
    pub status: String,
    #[serde(rename = "JettonSwap", default)]
    pub jetton_swap: Option<JettonSwapAction>,
}

/// JettonSwap action 的详情
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JettonSwapAction {
    #[serde(default)]
    pub dex: Option<String>,
    #[serde(default)]
    pub amount_in: Option<String>,
    #[serde(default)]
    pub amount_out: Option<String>,
    #[serde(default)]
    pub jetton_master_in: Option<JettonMaster>,
    #[serde(default)]
    pub jetton_master_out: Option<JettonMaster>,
}

/// Jetton master 的简要信息，地址为 raw 格式
#[derive(Debug, Clone, Deserialize)]
pub struct JettonMaster {
    pub address: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

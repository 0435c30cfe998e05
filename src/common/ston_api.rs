use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

use crate::trading::router::{JettonWalletSource, RouterMetadataSource};
use crate::utils::quote::SwapSimulator;

/// STON.fi API 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StonApiConfig {
    /// 基础地址，例如 `https://api.ston.fi`
    pub base_host: String,
    /// 请求超时时间（毫秒）
    pub timeout_millis: u64,
}

impl Default for StonApiConfig {
    fn default() -> Self {
        Self {
            base_host: "https://api.ston.fi".to_string(),
            timeout_millis: 10_000,
        }
    }
}

/// STON.fi HTTP API 客户端（价格模拟、router 元数据、jetton 钱包地址查询）
#[derive(Clone)]
pub struct StonApiClient {
    http: Client,
    pub config: StonApiConfig,
}

impl StonApiClient {
    /// 使用给定配置创建新的 STON.fi API 客户端
    pub fn new(config: StonApiConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_millis)?;
        Ok(Self { http, config })
    }

    /// 使用默认配置（主网 + 10s 超时）创建客户端
    pub fn mainnet_default() -> Result<Self> {
        Self::new(StonApiConfig::default())
    }

    #[inline]
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_host.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// `POST /v1/swap/simulate`
    pub async fn simulate_swap(&self, req: &SimulateSwapRequest) -> Result<SwapSimulation> {
        let url = self.endpoint("/v1/swap/simulate");
        let resp = self
            .http
            .post(url)
            .query(req)
            .send()
            .await
            .context("swap simulate request failed")?
            .error_for_status()?;

        resp.json::<SwapSimulation>()
            .await
            .context("failed to parse swap simulation")
    }

    /// `GET /v1/routers/{address}`
    pub async fn get_router(&self, router_address: &str) -> Result<RouterInfo> {
        let url = self.endpoint(&format!("/v1/routers/{router_address}"));
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("router request failed")?
            .error_for_status()?;

        let wrapper = resp
            .json::<RouterResponse>()
            .await
            .context("failed to parse router info")?;
        Ok(wrapper.router)
    }

    /// `GET /v1/jetton/{jetton}/address?owner_address=...`
    pub async fn get_jetton_wallet_address(&self, jetton_address: &str, owner_address: &str) -> Result<String> {
        let url = self.endpoint(&format!("/v1/jetton/{jetton_address}/address"));
        let resp = self
            .http
            .get(url)
            .query(&[("owner_address", owner_address)])
            .send()
            .await
            .context("jetton wallet request failed")?
            .error_for_status()?;

        let wallet = resp
            .json::<JettonWalletResponse>()
            .await
            .context("failed to parse jetton wallet address")?;
        Ok(wallet.address)
    }
}

#[async_trait]
impl SwapSimulator for StonApiClient {
    async fn simulate_swap(&self, req: &SimulateSwapRequest) -> Result<SwapSimulation> {
        StonApiClient::simulate_swap(self, req).await
    }
}

#[async_trait]
impl RouterMetadataSource for StonApiClient {
    async fn get_router(&self, router_address: &str) -> Result<RouterInfo> {
        StonApiClient::get_router(self, router_address).await
    }
}

#[async_trait]
impl JettonWalletSource for StonApiClient {
    async fn get_jetton_wallet_address(&self, jetton_address: &str, owner_address: &str) -> Result<String> {
        StonApiClient::get_jetton_wallet_address(self, jetton_address, owner_address).await
    }
}

/// 构建带连接池和代理设置的 reqwest 客户端
///
/// 优先使用 HTTPS_PROXY，其次 HTTP_PROXY（从 .env 或进程环境变量读取）
pub(crate) fn build_http_client(timeout_millis: u64) -> Result<Client> {
    let mut builder = Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(16)
        .tcp_nodelay(true)
        .timeout(Duration::from_millis(timeout_millis))
        .connect_timeout(Duration::from_secs(5));

    if let Ok(https_proxy) = env::var("HTTPS_PROXY").or_else(|_| env::var("https_proxy")) {
        builder = builder.proxy(Proxy::https(&https_proxy)?);
    } else if let Ok(http_proxy) = env::var("HTTP_PROXY").or_else(|_| env::var("http_proxy")) {
        builder = builder.proxy(Proxy::http(&http_proxy)?);
    }

    Ok(builder.build()?)
}

// ===================== 请求/响应类型定义 =====================

/// 价格模拟请求参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulateSwapRequest {
    pub offer_address: String,
    pub ask_address: String,
    /// 输入数量（nano 整数字符串）
    pub units: String,
    /// 小数形式的滑点，例如 `"0.2"`
    pub slippage_tolerance: String,
    /// 只在 v2 router 的池子里寻找路由
    pub dex_v2: bool,
}

/// 价格模拟结果，所有单位字段都是 nano 整数字符串
#[derive(Debug, Clone, Deserialize)]
pub struct SwapSimulation {
    pub ask_units: String,
    pub min_ask_units: String,
    pub fee_units: String,
    pub router_address: String,
    #[serde(default)]
    pub offer_units: Option<String>,
    #[serde(default)]
    pub swap_rate: Option<String>,
    #[serde(default)]
    pub price_impact: Option<String>,
}

/// STON.fi router 元数据，按地址获取后不可变
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouterInfo {
    pub address: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub pton_master_address: String,
    /// `"major.minor"` 形式，例如 `"2.1"`
    pub pton_version: String,
    pub pton_wallet_address: String,
    pub router_type: String,
    pub pool_creation_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct RouterResponse {
    router: RouterInfo,
}

#[derive(Debug, Deserialize)]
struct JettonWalletResponse {
    address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_router_response() {
        let body = r#"{
            "router": {
                "address": "EQBCl1JANkTpMpJ9N3lZktPMpp2btRe2vVwHon0la8ibRied",
                "major_version": 2,
                "minor_version": 2,
                "pton_master_address": "EQBnGWMCf3-FZZq1W4IWcWiGAc3PHuZ0_H-7sad2oY00o83S",
                "pton_version": "2.1",
                "pton_wallet_address": "EQCCxwFhFbNJhjPp1TXlzsdE4W9eEbvXkmsaEvAO1ERKsJ3d",
                "router_type": "ConstantProduct",
                "pool_creation_enabled": true
            }
        }"#;
        let parsed: RouterResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.router.major_version, 2);
        assert_eq!(parsed.router.pton_version, "2.1");
        assert!(parsed.router.pool_creation_enabled);
    }

    #[test]
    fn test_parse_simulation_ignores_unknown_fields() {
        let body = r#"{
            "offer_address": "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c",
            "ask_address": "EQBMIIYlgAI5HtWc2GTNWh5bDKY0GwHW6i3CqGxORqLDXNuE",
            "router_address": "EQBCl1JANkTpMpJ9N3lZktPMpp2btRe2vVwHon0la8ibRied",
            "offer_units": "1000000000",
            "ask_units": "1000000000",
            "min_ask_units": "950000000",
            "fee_units": "10000000",
            "swap_rate": "1",
            "price_impact": "0.001",
            "fee_percent": "0.002"
        }"#;
        let sim: SwapSimulation = serde_json::from_str(body).unwrap();
        assert_eq!(sim.min_ask_units, "950000000");
        assert_eq!(sim.offer_units.as_deref(), Some("1000000000"));
    }

    #[test]
    fn test_endpoint_join() {
        let client = StonApiClient::new(StonApiConfig {
            base_host: "https://api.ston.fi/".to_string(),
            timeout_millis: 1_000,
        })
        .unwrap();
        assert_eq!(client.endpoint("/v1/swap/simulate"), "https://api.ston.fi/v1/swap/simulate");
    }
}

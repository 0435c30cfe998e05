//! Router 解析与版本选择
//!
//! 链上 router 元数据可能报告比本地 swap 构建逻辑更新的版本。
//! 版本不在已实现集合中时，统一回退到本地支持的最新版本。

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::common::error::{SwapError, SwapResult};
use crate::common::router_cache::RouterInfoCache;
use crate::common::ston_api::RouterInfo;

/// Router 元数据服务
#[async_trait]
pub trait RouterMetadataSource: Send + Sync {
    async fn get_router(&self, router_address: &str) -> Result<RouterInfo>;
}

/// Jetton 钱包地址查询服务
#[async_trait]
pub trait JettonWalletSource: Send + Sync {
    async fn get_jetton_wallet_address(&self, jetton_address: &str, owner_address: &str) -> Result<String>;
}

/// 本地实现的 router 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RouterVersion {
    #[serde(rename = "v2_1")]
    V2_1,
    #[serde(rename = "v2_2")]
    V2_2,
}

impl RouterVersion {
    pub const IMPLEMENTED: [RouterVersion; 2] = [RouterVersion::V2_1, RouterVersion::V2_2];
    pub const LATEST: RouterVersion = RouterVersion::V2_2;

    pub fn tag(&self) -> &'static str {
        match self {
            RouterVersion::V2_1 => "v2_1",
            RouterVersion::V2_2 => "v2_2",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::IMPLEMENTED.into_iter().find(|v| v.tag() == tag)
    }
}

/// 本地实现的 proxy TON (pTON) 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProxyTonVersion {
    #[serde(rename = "v2_1")]
    V2_1,
}

impl ProxyTonVersion {
    pub const IMPLEMENTED: [ProxyTonVersion; 1] = [ProxyTonVersion::V2_1];
    pub const LATEST: ProxyTonVersion = ProxyTonVersion::V2_1;

    pub fn tag(&self) -> &'static str {
        match self {
            ProxyTonVersion::V2_1 => "v2_1",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::IMPLEMENTED.into_iter().find(|v| v.tag() == tag)
    }
}

impl fmt::Display for RouterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for ProxyTonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 根据 router 元数据选择 (router 版本, pTON 版本)
pub fn select_versions(info: &RouterInfo) -> (RouterVersion, ProxyTonVersion) {
    let router_tag = format!("v{}_{}", info.major_version, info.minor_version);
    let router_version = RouterVersion::from_tag(&router_tag).unwrap_or_else(|| {
        warn!(
            "router {} reports {}, not implemented; falling back to {}",
            info.address,
            router_tag,
            RouterVersion::LATEST
        );
        RouterVersion::LATEST
    });

    // "2.1" -> "v2_1"；缺少 minor 时得到无法匹配的 tag，同样走回退
    let mut parts = info.pton_version.split('.');
    let proxy_tag = format!(
        "v{}_{}",
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default()
    );
    let proxy_version = ProxyTonVersion::from_tag(&proxy_tag).unwrap_or_else(|| {
        warn!(
            "pTON {} reports {}, not implemented; falling back to {}",
            info.pton_master_address,
            proxy_tag,
            ProxyTonVersion::LATEST
        );
        ProxyTonVersion::LATEST
    });

    (router_version, proxy_version)
}

/// 已选定版本的 router 合约引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterContract {
    pub address: String,
    pub version: RouterVersion,
}

/// 已选定版本的 pTON 引用，用于原生 TON 的包装
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyTon {
    pub master_address: String,
    /// router 持有的 pTON 钱包地址
    pub router_wallet_address: String,
    pub version: ProxyTonVersion,
}

/// RouterResolver
///
/// 缓存由调用方注入；`resolve` 不在内部重试，失败直接返回 `RouterLookup`。
pub struct RouterResolver {
    source: Arc<dyn RouterMetadataSource>,
    cache: Arc<RouterInfoCache>,
}

impl RouterResolver {
    pub fn new(source: Arc<dyn RouterMetadataSource>, cache: Arc<RouterInfoCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<RouterInfoCache> {
        &self.cache
    }

    /// 获取 router 元数据，优先读缓存
    pub async fn resolve(&self, router_address: &str) -> SwapResult<Arc<RouterInfo>> {
        if let Some(info) = self.cache.get(router_address) {
            debug!("router {} served from cache", router_address);
            return Ok(info);
        }

        let info = self
            .source
            .get_router(router_address)
            .await
            .map_err(|e| SwapError::RouterLookup(format!("{router_address}: {}", SwapError::flatten(&e))))?;

        Ok(self.cache.insert(router_address, info))
    }

    /// 根据元数据构造 router 与 pTON 引用
    pub fn contracts(&self, info: &RouterInfo) -> (RouterContract, ProxyTon) {
        let (router_version, proxy_version) = select_versions(info);
        (
            RouterContract { address: info.address.clone(), version: router_version },
            ProxyTon {
                master_address: info.pton_master_address.clone(),
                router_wallet_address: info.pton_wallet_address.clone(),
                version: proxy_version,
            },
        )
    }
}

//! Router 元数据缓存
//!
//! 按 router 地址缓存，没有过期也没有失效：router 元数据与地址绑定，
//! 一旦获取在进程生命周期内不会刷新。
//! 缓存对象由组合根（`SwapClient`）持有并注入 `RouterResolver`，不使用全局静态。

use dashmap::DashMap;
use std::sync::Arc;

use super::ston_api::RouterInfo;

const INITIAL_CAPACITY: usize = 16;

#[derive(Debug, Default)]
pub struct RouterInfoCache {
    routers: DashMap<String, Arc<RouterInfo>>,
}

impl RouterInfoCache {
    pub fn new() -> Self {
        Self { routers: DashMap::with_capacity(INITIAL_CAPACITY) }
    }

    pub fn get(&self, router_address: &str) -> Option<Arc<RouterInfo>> {
        self.routers.get(router_address).map(|entry| entry.value().clone())
    }

    /// 写入缓存，同一地址重复写入时后写覆盖
    pub fn insert(&self, router_address: &str, info: RouterInfo) -> Arc<RouterInfo> {
        let info = Arc::new(info);
        self.routers.insert(router_address.to_string(), info.clone());
        info
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    pub fn clear(&self) {
        self.routers.clear();
    }
}

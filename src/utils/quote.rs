//! 报价计算
//!
//! 调用 STON.fi 价格模拟，推导最少/最多可得数量与平台手续费。
//! 报价每次请求重新计算，不做缓存。

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::units::{Amount, to_nano, units_to_amount};
use crate::common::error::{SwapError, SwapResult};
use crate::common::ston_api::{RouterInfo, SimulateSwapRequest, SwapSimulation};
use crate::constants::TON_ADDRESS;
use crate::trading::router::RouterResolver;

/// 价格模拟服务
#[async_trait]
pub trait SwapSimulator: Send + Sync {
    async fn simulate_swap(&self, req: &SimulateSwapRequest) -> Result<SwapSimulation>;
}

/// 交易方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapDirection {
    /// TON -> 资产
    Buy,
    /// 资产 -> TON
    Sell,
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::Buy => f.write_str("Buy"),
            SwapDirection::Sell => f.write_str("Sell"),
        }
    }
}

/// 报价请求：`amount` 是支付方向上的数量（买入时为 TON，卖出时为资产）
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub amount: Amount,
    pub asset_address: String,
    /// 百分比刻度的滑点（20 = 0.20）
    pub slippage: u32,
}

/// 报价结果
#[derive(Debug, Clone)]
pub struct SwapQuote {
    pub min_receive: Amount,
    pub max_receive: Amount,
    /// 以支付币种计价的平台费
    pub platform_fee: Amount,
    pub router_info: Arc<RouterInfo>,
}

/// 把百分比刻度的滑点转成发送给模拟服务的小数字符串
pub fn slippage_fraction(slippage: u32) -> String {
    (Decimal::from(slippage) / Decimal::ONE_HUNDRED).normalize().to_string()
}

pub struct QuoteEngine {
    simulator: Arc<dyn SwapSimulator>,
    routers: Arc<RouterResolver>,
}

impl QuoteEngine {
    pub fn new(simulator: Arc<dyn SwapSimulator>, routers: Arc<RouterResolver>) -> Self {
        Self { simulator, routers }
    }

    pub fn routers(&self) -> &Arc<RouterResolver> {
        &self.routers
    }

    pub async fn quote(&self, direction: SwapDirection, req: &QuoteRequest) -> SwapResult<SwapQuote> {
        match direction {
            SwapDirection::Buy => self.quote_buy(req).await,
            SwapDirection::Sell => self.quote_sell(req).await,
        }
    }

    /// TON -> 资产
    ///
    /// 模拟结果中的手续费以目标资产计价，而买入的平台费需以 TON 计价：
    /// `platform_fee = fee / (min_receive + fee) * ton_amount`
    pub async fn quote_buy(&self, req: &QuoteRequest) -> SwapResult<SwapQuote> {
        let (sim, router_info) = self.simulate(TON_ADDRESS, &req.asset_address, req).await?;

        let max_receive = units_to_amount(&sim.ask_units)?;
        let min_receive = units_to_amount(&sim.min_ask_units)?;
        let fee_in_asset = units_to_amount(&sim.fee_units)?;

        let platform_fee = min_receive
            .checked_add(fee_in_asset)
            .filter(|total| !total.is_zero())
            .and_then(|total| fee_in_asset.checked_div(total))
            .and_then(|share| share.checked_mul(req.amount))
            .ok_or_else(|| {
                SwapError::QuoteComputation(format!(
                    "degenerate buy fee: min_receive={min_receive}, fee={fee_in_asset}"
                ))
            })?;

        Self::finish(min_receive, max_receive, platform_fee, router_info)
    }

    /// 资产 -> TON；模拟结果中的手续费已经是 TON，无需换算
    pub async fn quote_sell(&self, req: &QuoteRequest) -> SwapResult<SwapQuote> {
        let (sim, router_info) = self.simulate(&req.asset_address, TON_ADDRESS, req).await?;

        let max_receive = units_to_amount(&sim.ask_units)?;
        let min_receive = units_to_amount(&sim.min_ask_units)?;
        let platform_fee = units_to_amount(&sim.fee_units)?;

        Self::finish(min_receive, max_receive, platform_fee, router_info)
    }

    async fn simulate(
        &self,
        offer_address: &str,
        ask_address: &str,
        req: &QuoteRequest,
    ) -> SwapResult<(SwapSimulation, Arc<RouterInfo>)> {
        let payload = SimulateSwapRequest {
            offer_address: offer_address.to_string(),
            ask_address: ask_address.to_string(),
            units: to_nano(req.amount)?.to_string(),
            slippage_tolerance: slippage_fraction(req.slippage),
            dex_v2: true,
        };

        let sim = self
            .simulator
            .simulate_swap(&payload)
            .await
            .map_err(|e| SwapError::QuoteComputation(SwapError::flatten(&e)))?;
        debug!(
            "simulated {} -> {}: ask={} min_ask={} fee={} router={}",
            offer_address, ask_address, sim.ask_units, sim.min_ask_units, sim.fee_units, sim.router_address
        );

        let router_info = self.routers.resolve(&sim.router_address).await?;
        Ok((sim, router_info))
    }

    fn finish(
        min_receive: Amount,
        max_receive: Amount,
        platform_fee: Amount,
        router_info: Arc<RouterInfo>,
    ) -> SwapResult<SwapQuote> {
        if min_receive > max_receive {
            return Err(SwapError::QuoteComputation(format!(
                "min_receive {min_receive} exceeds max_receive {max_receive}"
            )));
        }
        Ok(SwapQuote { min_receive, max_receive, platform_fee, router_info })
    }
}

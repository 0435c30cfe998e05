pub mod common;
pub mod constants;
pub mod trading;
pub mod utils;

use std::sync::Arc;
use tracing::{error, info};

use crate::common::{
    AnyResult, RouterInfoCache, StonApiClient, SwapConfig, SwapError, SwapResult, TonAddress, TonApiClient,
};
use crate::trading::{
    BuildSwapRequest, ConfirmationPoller, EventSource, JettonWalletSource, OutcomeClassifier, PollOutcome,
    RouterMetadataSource, RouterResolver, TransactionBuilder, TransactionSender,
};
use crate::utils::{Amount, QuoteEngine, QuoteRequest, SwapDirection, SwapQuote, SwapSimulator};

pub use crate::trading::TransactionParams;

/// 买入请求：用 `ton_amount` TON 买入 `asset_address`
#[derive(Debug, Clone)]
pub struct BuyRequest {
    pub asset_address: String,
    pub ton_amount: Amount,
    /// 百分比刻度滑点，None 时使用 `SwapConfig::default_slippage`
    pub slippage: Option<u32>,
}

/// 卖出请求：卖出 `asset_amount` 个 `asset_address` 换 TON
#[derive(Debug, Clone)]
pub struct SellRequest {
    pub asset_address: String,
    pub asset_amount: Amount,
    pub slippage: Option<u32>,
}

/// 一次 swap 的最终结果
#[derive(Debug, Clone)]
pub struct SwapReport {
    pub direction: SwapDirection,
    pub hash: String,
    pub outcome: PollOutcome,
    pub quote: SwapQuote,
}

impl SwapReport {
    pub fn is_success(&self) -> bool {
        self.outcome == PollOutcome::Succeeded
    }

    /// 人类可读的结果，例如 `"Buy success"` / `"Sell failed"`
    pub fn message(&self) -> String {
        let verdict = if self.is_success() { "success" } else { "failed" };
        format!("{} {}", self.direction, verdict)
    }
}

/// 外部服务集合，便于注入测试替身
#[derive(Clone)]
pub struct SwapServices {
    pub simulator: Arc<dyn SwapSimulator>,
    pub routers: Arc<dyn RouterMetadataSource>,
    pub wallets: Arc<dyn JettonWalletSource>,
    pub events: Arc<dyn EventSource>,
}

impl SwapServices {
    pub fn from_clients(ston: Arc<StonApiClient>, ton: Arc<TonApiClient>) -> Self {
        Self {
            simulator: ston.clone(),
            routers: ston.clone(),
            wallets: ston,
            events: ton,
        }
    }
}

/// STON.fi swap 客户端
///
/// 组合根：持有 API 客户端、router 缓存、钱包发送器与配置。
/// 一次 swap 依次执行 报价 -> 构建 -> 发送 -> 轮询确认，请求之间互不协调。
pub struct SwapClient {
    pub config: SwapConfig,
    pub builder: Arc<TransactionBuilder>,
    pub classifier: Arc<OutcomeClassifier>,
    pub sender: Arc<dyn TransactionSender>,
    poller: ConfirmationPoller,
}

impl SwapClient {
    /// 使用真实的 STON.fi / TonAPI 客户端创建
    pub fn new(config: SwapConfig, sender: Arc<dyn TransactionSender>) -> AnyResult<Self> {
        let ston = Arc::new(StonApiClient::new(config.ston_api.clone())?);
        let ton = Arc::new(TonApiClient::new(config.ton_api.clone())?);
        let services = SwapServices::from_clients(ston, ton);
        Ok(Self::with_services(config, services, sender, Arc::new(RouterInfoCache::new())))
    }

    /// 使用给定的外部服务与缓存创建
    pub fn with_services(
        config: SwapConfig,
        services: SwapServices,
        sender: Arc<dyn TransactionSender>,
        cache: Arc<RouterInfoCache>,
    ) -> Self {
        let resolver = Arc::new(RouterResolver::new(services.routers, cache));
        let quotes = Arc::new(QuoteEngine::new(services.simulator, resolver));
        let builder = Arc::new(TransactionBuilder::new(quotes, services.wallets));
        let classifier = Arc::new(OutcomeClassifier::new(services.events));

        let mut poller = ConfirmationPoller::new(config.poll_interval);
        if let Some(deadline) = config.poll_deadline {
            poller = poller.with_deadline(deadline);
        }

        Self { config, builder, classifier, sender, poller }
    }

    /// 替换确认轮询器（例如注入时钟或取消标志）
    pub fn with_poller(mut self, poller: ConfirmationPoller) -> Self {
        self.poller = poller;
        self
    }

    /// 仅报价，不构建交易
    pub async fn quote_buy(&self, req: &BuyRequest) -> SwapResult<SwapQuote> {
        let quote_req = QuoteRequest {
            amount: req.ton_amount,
            asset_address: req.asset_address.clone(),
            slippage: req.slippage.unwrap_or(self.config.default_slippage),
        };
        self.builder.quotes().quote_buy(&quote_req).await
    }

    pub async fn quote_sell(&self, req: &SellRequest) -> SwapResult<SwapQuote> {
        let quote_req = QuoteRequest {
            amount: req.asset_amount,
            asset_address: req.asset_address.clone(),
            slippage: req.slippage.unwrap_or(self.config.default_slippage),
        };
        self.builder.quotes().quote_sell(&quote_req).await
    }

    /// 买入并等待链上结果
    pub async fn buy(&self, req: BuyRequest) -> SwapResult<SwapReport> {
        self.execute(SwapDirection::Buy, req.asset_address, req.ton_amount, req.slippage).await
    }

    /// 卖出并等待链上结果
    pub async fn sell(&self, req: SellRequest) -> SwapResult<SwapReport> {
        self.execute(SwapDirection::Sell, req.asset_address, req.asset_amount, req.slippage).await
    }

    async fn execute(
        &self,
        direction: SwapDirection,
        asset_address: String,
        amount: Amount,
        slippage: Option<u32>,
    ) -> SwapResult<SwapReport> {
        let slippage = slippage.unwrap_or(self.config.default_slippage);
        info!(
            "{} request. asset: {}, amount: {}, slippage: {}",
            direction, asset_address, amount, slippage
        );

        // 在发送之前校验地址，避免轮询阶段才发现无法匹配
        let asset = OutcomeClassifier::parse_asset(&asset_address)?;

        let user_wallet_address = self
            .sender
            .address()
            .await
            .map_err(|e| SwapError::Dispatch(format!("wallet address: {}", SwapError::flatten(&e))))?;

        let prepared = self
            .builder
            .build(
                direction,
                &BuildSwapRequest {
                    amount,
                    asset_address: asset_address.clone(),
                    user_wallet_address,
                    slippage,
                    query_id: None,
                },
            )
            .await?;
        info!(
            "{} quote. min_receive: {}, max_receive: {}, platform_fee: {}",
            direction, prepared.quote.min_receive, prepared.quote.max_receive, prepared.quote.platform_fee
        );

        let hash = self
            .sender
            .send_transaction(&prepared.params)
            .await
            .map_err(|e| SwapError::Dispatch(SwapError::flatten(&e)))?;
        info!("{} dispatched. Tx hash: {}", direction, hash);

        let outcome = self.wait_for_outcome(&hash, &asset).await?;

        let report = SwapReport { direction, hash, outcome, quote: prepared.quote };
        if report.is_success() {
            info!("{}. Tx hash: {}", report.message(), report.hash);
        } else {
            error!("{}. Tx hash: {}", report.message(), report.hash);
        }
        Ok(report)
    }

    /// 轮询直到交易得到终态
    pub async fn wait_for_outcome(&self, hash: &str, asset: &TonAddress) -> SwapResult<PollOutcome> {
        let classifier = self.classifier.as_ref();
        self.poller
            .poll_until_resolved(move || classifier.classify(hash, asset))
            .await
    }
}

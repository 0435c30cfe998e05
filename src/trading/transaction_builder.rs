use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::common::error::{SwapError, SwapResult};
use crate::constants::{
    SWAP_JETTON_TO_TON_FORWARD_GAS, SWAP_JETTON_TO_TON_GAS, SWAP_TON_TO_JETTON_FORWARD_GAS,
};
use crate::trading::router::{JettonWalletSource, ProxyTon, RouterContract};
use crate::utils::quote::{QuoteEngine, QuoteRequest, SwapDirection, SwapQuote};
use crate::utils::units::{Amount, NanoAmount, to_nano};

/// 构建交易的输入
#[derive(Debug, Clone)]
pub struct BuildSwapRequest {
    /// 支付数量（买入为 TON，卖出为资产）
    pub amount: Amount,
    pub asset_address: String,
    pub user_wallet_address: String,
    pub slippage: u32,
    pub query_id: Option<u64>,
}

/// Router swap 指令中的转发负载
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapForwardPayload {
    /// router 持有的目标资产钱包
    pub ask_jetton_wallet_address: String,
    pub min_ask_amount: NanoAmount,
    pub receiver_address: String,
    pub refund_address: String,
}

/// 消息体，交给外部签名器编码
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SwapBody {
    /// 买入：原生 TON 经 pTON 包装后转入 router
    PtonTransfer {
        query_id: u64,
        ton_amount: NanoAmount,
        refund_address: String,
        forward_payload: SwapForwardPayload,
    },
    /// 卖出：jetton 从用户钱包转给 router
    JettonTransfer {
        query_id: u64,
        amount: NanoAmount,
        destination: String,
        response_destination: String,
        forward_ton_amount: NanoAmount,
        forward_payload: SwapForwardPayload,
    },
}

/// 交给外部签名/广播服务的交易参数，每次请求构建一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionParams {
    /// 消息目标地址
    pub to: String,
    /// 附带的 TON（nano）
    pub value: NanoAmount,
    pub body: SwapBody,
    pub router: RouterContract,
    pub proxy_ton: ProxyTon,
}

impl TransactionParams {
    /// 保证的最少输出（nano）
    pub fn min_ask_amount(&self) -> NanoAmount {
        match &self.body {
            SwapBody::PtonTransfer { forward_payload, .. }
            | SwapBody::JettonTransfer { forward_payload, .. } => forward_payload.min_ask_amount,
        }
    }
}

/// 报价与对应的交易参数
#[derive(Debug, Clone)]
pub struct PreparedSwap {
    pub direction: SwapDirection,
    pub quote: SwapQuote,
    pub params: TransactionParams,
}

/// 交易参数构建器，除报价与地址查询外无副作用，不负责发送
pub struct TransactionBuilder {
    quotes: Arc<QuoteEngine>,
    wallets: Arc<dyn JettonWalletSource>,
}

impl TransactionBuilder {
    pub fn new(quotes: Arc<QuoteEngine>, wallets: Arc<dyn JettonWalletSource>) -> Self {
        Self { quotes, wallets }
    }

    pub fn quotes(&self) -> &Arc<QuoteEngine> {
        &self.quotes
    }

    pub async fn build(&self, direction: SwapDirection, req: &BuildSwapRequest) -> SwapResult<PreparedSwap> {
        match direction {
            SwapDirection::Buy => self.build_buy_tx(req).await,
            SwapDirection::Sell => self.build_sell_tx(req).await,
        }
    }

    /// TON -> 资产
    pub async fn build_buy_tx(&self, req: &BuildSwapRequest) -> SwapResult<PreparedSwap> {
        let quote = self.quotes.quote_buy(&quote_request(req)).await?;
        let (router, proxy_ton) = self.quotes.routers().contracts(&quote.router_info);

        let offer_amount = to_nano(req.amount)?;
        let min_ask_amount = to_nano(quote.min_receive)?;
        let ask_jetton_wallet_address = self.jetton_wallet(&req.asset_address, &router.address).await?;

        let params = TransactionParams {
            to: proxy_ton.router_wallet_address.clone(),
            value: offer_amount + SWAP_TON_TO_JETTON_FORWARD_GAS,
            body: SwapBody::PtonTransfer {
                query_id: req.query_id.unwrap_or_default(),
                ton_amount: offer_amount,
                refund_address: req.user_wallet_address.clone(),
                forward_payload: SwapForwardPayload {
                    ask_jetton_wallet_address,
                    min_ask_amount,
                    receiver_address: req.user_wallet_address.clone(),
                    refund_address: req.user_wallet_address.clone(),
                },
            },
            router,
            proxy_ton,
        };

        info!(
            "buy tx built: offer={} nanoTON, min_ask={}, router={} ({})",
            offer_amount, min_ask_amount, params.router.address, params.router.version
        );
        Ok(PreparedSwap { direction: SwapDirection::Buy, quote, params })
    }

    /// 资产 -> TON
    pub async fn build_sell_tx(&self, req: &BuildSwapRequest) -> SwapResult<PreparedSwap> {
        let quote = self.quotes.quote_sell(&quote_request(req)).await?;
        let (router, proxy_ton) = self.quotes.routers().contracts(&quote.router_info);

        let offer_amount = to_nano(req.amount)?;
        let min_ask_amount = to_nano(quote.min_receive)?;
        let offer_jetton_wallet = self.jetton_wallet(&req.asset_address, &req.user_wallet_address).await?;

        let params = TransactionParams {
            to: offer_jetton_wallet,
            value: SWAP_JETTON_TO_TON_GAS,
            body: SwapBody::JettonTransfer {
                query_id: req.query_id.unwrap_or_default(),
                amount: offer_amount,
                destination: router.address.clone(),
                response_destination: req.user_wallet_address.clone(),
                forward_ton_amount: SWAP_JETTON_TO_TON_FORWARD_GAS,
                forward_payload: SwapForwardPayload {
                    ask_jetton_wallet_address: proxy_ton.router_wallet_address.clone(),
                    min_ask_amount,
                    receiver_address: req.user_wallet_address.clone(),
                    refund_address: req.user_wallet_address.clone(),
                },
            },
            router,
            proxy_ton,
        };

        info!(
            "sell tx built: offer={} units, min_ask={} nanoTON, router={} ({})",
            offer_amount, min_ask_amount, params.router.address, params.router.version
        );
        Ok(PreparedSwap { direction: SwapDirection::Sell, quote, params })
    }

    async fn jetton_wallet(&self, jetton_address: &str, owner_address: &str) -> SwapResult<String> {
        self.wallets
            .get_jetton_wallet_address(jetton_address, owner_address)
            .await
            .map_err(|e| {
                SwapError::RouterLookup(format!(
                    "jetton wallet of {owner_address} for {jetton_address}: {}",
                    SwapError::flatten(&e)
                ))
            })
    }
}

fn quote_request(req: &BuildSwapRequest) -> QuoteRequest {
    QuoteRequest {
        amount: req.amount,
        asset_address: req.asset_address.clone(),
        slippage: req.slippage,
    }
}

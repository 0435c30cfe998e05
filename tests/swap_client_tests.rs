//! SwapClient 端到端测试
//!
//! 报价 -> 构建 -> 发送 -> 轮询确认，全部使用内存替身。

use rust_decimal_macros::dec;
use ton_swap_sdk::common::SwapError;
use ton_swap_sdk::trading::{PollOutcome, SwapBody};
use ton_swap_sdk::utils::SwapDirection;
use ton_swap_sdk::{BuyRequest, SellRequest};

use test_helpers::*;

fn buy(amount: rust_decimal::Decimal) -> BuyRequest {
    BuyRequest { asset_address: JETTON.to_string(), ton_amount: amount, slippage: None }
}

fn sell(amount: rust_decimal::Decimal) -> SellRequest {
    SellRequest { asset_address: JETTON.to_string(), asset_amount: amount, slippage: Some(5) }
}

#[tokio::test]
async fn test_buy_success_after_pending() {
    let rig = TestRig::new(vec![
        Err("event not found".to_string()),
        Ok(event(true, vec![])),
        Ok(event(false, vec![jetton_swap("ok", None, Some(JETTON_RAW))])),
    ]);
    let client = rig.client();

    let report = client.buy(buy(dec!(1))).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.message(), "Buy success");
    assert_eq!(report.direction, SwapDirection::Buy);
    assert_eq!(report.hash, TX_HASH);
    assert_eq!(report.quote.min_receive, dec!(0.95));
    assert_eq!(rig.sender.sent_count(), 1);
    assert_eq!(rig.events.calls(), 3);
}

#[tokio::test]
async fn test_sell_failed_swap() {
    let rig = TestRig::new(vec![Ok(event(false, vec![jetton_swap("failed", Some(JETTON), None)]))]);
    let client = rig.client();

    let report = client.sell(sell(dec!(2))).await.unwrap();

    assert_eq!(report.outcome, PollOutcome::Failed);
    assert_eq!(report.message(), "Sell failed");

    let sent = rig.sender.sent.lock().unwrap();
    assert!(matches!(sent[0].body, SwapBody::JettonTransfer { amount: 2_000_000_000, .. }));
}

#[tokio::test]
async fn test_swap_for_other_asset_is_failure() {
    let other = "0:3333333333333333333333333333333333333333333333333333333333333333";
    let rig = TestRig::new(vec![Ok(event(false, vec![jetton_swap("ok", None, Some(other))]))]);

    let report = rig.client().buy(buy(dec!(1))).await.unwrap();
    assert_eq!(report.message(), "Buy failed");
}

#[tokio::test]
async fn test_dispatch_failure_skips_polling() {
    let mut rig = TestRig::new(vec![]);
    rig.sender = FakeSender::failing();

    let err = rig.client().buy(buy(dec!(1))).await.unwrap_err();

    match err {
        SwapError::Dispatch(msg) => assert!(msg.contains("seqno mismatch"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(rig.events.calls(), 0);
}

#[tokio::test]
async fn test_invalid_asset_rejected_before_sending() {
    let rig = TestRig::new(vec![]);
    let req = BuyRequest { asset_address: "not-an-address".to_string(), ton_amount: dec!(1), slippage: None };

    let err = rig.client().buy(req).await.unwrap_err();

    assert!(matches!(err, SwapError::InvalidAddress(_)));
    assert_eq!(rig.sender.sent_count(), 0);
    assert_eq!(rig.simulator.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_default_slippage_applied() {
    let rig = TestRig::new(vec![]);

    rig.client().quote_buy(&buy(dec!(1))).await.unwrap();
    assert_eq!(rig.simulator.last_request().slippage_tolerance, "0.2");

    rig.client().quote_sell(&sell(dec!(1))).await.unwrap();
    assert_eq!(rig.simulator.last_request().slippage_tolerance, "0.05");
}

#[tokio::test]
async fn test_router_cache_shared_across_swaps() {
    let rig = TestRig::new(vec![Ok(event(false, vec![jetton_swap("ok", Some(JETTON_RAW), None)]))]);
    let client = rig.client();

    client.sell(sell(dec!(1))).await.unwrap();
    client.sell(sell(dec!(1))).await.unwrap();
    // 新建客户端共享同一缓存
    rig.client().quote_buy(&buy(dec!(1))).await.unwrap();

    assert_eq!(rig.routers.calls(), 1);
    assert_eq!(rig.cache.len(), 1);
    assert_eq!(rig.sender.sent_count(), 2);
}

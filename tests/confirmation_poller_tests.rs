//! 确认轮询器测试
//!
//! 大部分用例使用手动时钟，不真正等待；一个用例用真实 tokio 定时器验证耗时。

use anyhow::anyhow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use ton_swap_sdk::common::SwapError;
use ton_swap_sdk::trading::{CancelFlag, ConfirmationPoller, OutcomeClassifier, PollOutcome};

use test_helpers::*;

const INTERVAL: Duration = Duration::from_millis(1000);

#[tokio::test]
async fn test_fails_twice_then_succeeds() {
    let clock = ManualClock::new();
    let poller = ConfirmationPoller::new(INTERVAL).with_clock(clock.clone());
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    let outcome = poller
        .poll_until_resolved(move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(anyhow!("not indexed yet")),
                _ => Ok(PollOutcome::Succeeded),
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Succeeded);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(clock.sleep_count(), 2);
    assert!(clock.total_slept() >= INTERVAL * 2);
}

#[tokio::test]
async fn test_real_clock_waits_between_attempts() {
    let interval = Duration::from_millis(20);
    let poller = ConfirmationPoller::new(interval);
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    let start = Instant::now();
    let outcome = poller
        .poll_until_resolved(move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(anyhow!("transient")),
                _ => Ok(PollOutcome::Succeeded),
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Succeeded);
    assert!(start.elapsed() >= interval * 2, "elapsed {:?}", start.elapsed());
}

#[tokio::test]
async fn test_pending_is_retried() {
    let clock = ManualClock::new();
    let poller = ConfirmationPoller::new(INTERVAL).with_clock(clock.clone());
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    let outcome = poller
        .poll_until_resolved(move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0..=3 => Ok::<_, anyhow::Error>(PollOutcome::Pending),
                _ => Ok(PollOutcome::Failed),
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Failed);
    assert_eq!(clock.sleep_count(), 4);
}

#[tokio::test]
async fn test_terminal_on_first_attempt_does_not_sleep() {
    let clock = ManualClock::new();
    let poller = ConfirmationPoller::new(INTERVAL).with_clock(clock.clone());

    let outcome = poller.poll_until_resolved(move || async move { Ok::<_, anyhow::Error>(PollOutcome::Failed) }).await.unwrap();

    assert_eq!(outcome, PollOutcome::Failed);
    assert_eq!(clock.sleep_count(), 0);
}

#[tokio::test]
async fn test_deadline_bounds_polling() {
    let clock = ManualClock::new();
    let poller = ConfirmationPoller::new(INTERVAL)
        .with_clock(clock.clone())
        .with_deadline(INTERVAL * 3);
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    let err = poller
        .poll_until_resolved(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(PollOutcome::Pending)
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::PollAborted(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(clock.total_slept(), INTERVAL * 3);
}

#[tokio::test]
async fn test_cancel_flag_stops_polling() {
    let clock = ManualClock::new();
    let cancel = CancelFlag::new();
    let poller = ConfirmationPoller::new(INTERVAL)
        .with_clock(clock.clone())
        .with_cancel_flag(cancel.clone());
    let calls = AtomicUsize::new(0);
    let calls = &calls;
    let cancel = &cancel;

    let err = poller
        .poll_until_resolved(move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 1 {
                cancel.cancel();
            }
            Err(anyhow!("unknown hash"))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::PollAborted(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_polls_classifier_until_indexed() {
    let events = ScriptedEvents::new(vec![
        Err("404 event not found".to_string()),
        Ok(event(true, vec![])),
        Ok(event(false, vec![jetton_swap("ok", None, Some(JETTON_RAW))])),
    ]);
    let classifier = OutcomeClassifier::new(events.clone());
    let asset = OutcomeClassifier::parse_asset(JETTON).unwrap();
    let clock = ManualClock::new();
    let poller = ConfirmationPoller::new(INTERVAL).with_clock(clock.clone());

    let (classifier, asset) = (&classifier, &asset);
    let outcome = poller
        .poll_until_resolved(move || classifier.classify(TX_HASH, asset))
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Succeeded);
    assert_eq!(events.calls(), 3);
    assert_eq!(clock.sleep_count(), 2);
}

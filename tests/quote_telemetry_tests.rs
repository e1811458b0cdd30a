//! 报价延迟埋点测试
//!
//! 验证每个报价周期只上报一次 `QuoteReceived`，耗时从第一次 Loading 算起。
//!
//! 运行测试:
//!     cargo test --test quote_telemetry_tests -- --nocapture

mod common;

use common::{Harness, dai_units};
use swap_flow_sdk::{Field, TelemetryEvent, TradeStatus};

fn quote_events(events: &[TelemetryEvent]) -> Vec<(u64, Option<u64>)> {
    events
        .iter()
        .filter_map(|event| match event {
            TelemetryEvent::QuoteReceived { quote_id, elapsed_ms, .. } => Some((*quote_id, *elapsed_ms)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_one_event_per_cycle_with_elapsed_from_first_loading() {
    let mut h = Harness::new();
    h.connected_usdc_to_dai();
    let o = h.orchestrator.clone();

    o.observe_quote(TradeStatus::Idle, None);
    // 第一次 Loading 在 t=1000
    o.observe_quote(TradeStatus::Loading, None);
    h.clock.advance(150);
    // 用户继续输入，再次 Loading，起点不变
    o.type_input(Field::Input, "120");
    o.observe_quote(TradeStatus::Loading, None);
    h.clock.advance(100);

    let quote = h.quote(dai_units(119), None);
    o.observe_quote(TradeStatus::Valid, Some(quote.clone()));
    assert_eq!(quote_events(&h.drain_events()), vec![(quote.id.0, Some(250))]);

    // 同一周期内的刷新不再上报
    h.clock.advance(500);
    o.observe_quote(TradeStatus::Syncing, Some(quote.clone()));
    let refreshed = h.quote(dai_units(118), None);
    o.observe_quote(TradeStatus::Valid, Some(refreshed));
    assert!(quote_events(&h.drain_events()).is_empty());

    let confirmation = o.confirmation();
    assert_eq!(confirmation.quote_received_at, Some(1_250));
}

#[tokio::test]
async fn test_syncing_ticks_before_first_valid_report_once() {
    let mut h = Harness::new();
    h.connected_usdc_to_dai();
    let o = h.orchestrator.clone();

    o.observe_quote(TradeStatus::Loading, None);
    let quote = h.quote(dai_units(99), None);
    for _ in 0..3 {
        h.clock.advance(10);
        o.observe_quote(TradeStatus::Syncing, Some(quote.clone()));
    }
    h.clock.advance(10);
    o.observe_quote(TradeStatus::Valid, Some(quote.clone()));
    o.observe_quote(TradeStatus::Valid, Some(quote.clone()));

    assert_eq!(quote_events(&h.drain_events()), vec![(quote.id.0, Some(40))]);
}

#[tokio::test]
async fn test_new_cycle_after_inputs_cleared() {
    let mut h = Harness::new();
    h.connected_usdc_to_dai();
    let o = h.orchestrator.clone();

    let first = h.deliver_quote(dai_units(99), None);
    assert_eq!(quote_events(&h.drain_events()), vec![(first.id.0, Some(0))]);

    o.type_input(Field::Input, "");
    o.observe_quote(TradeStatus::Idle, None);
    o.type_input(Field::Input, "5");
    h.clock.advance(40);
    o.observe_quote(TradeStatus::Loading, None);
    h.clock.advance(60);
    let second = h.quote(dai_units(5), None);
    o.observe_quote(TradeStatus::Valid, Some(second.clone()));

    assert_eq!(quote_events(&h.drain_events()), vec![(second.id.0, Some(60))]);
}

#[tokio::test]
async fn test_cleared_before_valid_emits_nothing() {
    let mut h = Harness::new();
    h.connected_usdc_to_dai();
    let o = h.orchestrator.clone();

    o.observe_quote(TradeStatus::Idle, None);
    o.observe_quote(TradeStatus::Loading, None);
    let late = h.quote(dai_units(99), None);
    h.clock.advance(80);
    // 输入被清空，窗口丢弃
    o.observe_quote(TradeStatus::Idle, None);
    o.observe_quote(TradeStatus::Valid, Some(late));

    assert!(quote_events(&h.drain_events()).is_empty());
    assert_eq!(o.confirmation().quote_received_at, None);
}

#[tokio::test]
async fn test_stale_quote_does_not_close_window() {
    let mut h = Harness::new();
    h.connected_usdc_to_dai();
    let o = h.orchestrator.clone();

    o.observe_quote(TradeStatus::Loading, None);
    let stale = h.quote(dai_units(99), None);
    o.type_input(Field::Input, "300");
    h.clock.advance(30);
    o.observe_quote(TradeStatus::Valid, Some(stale.clone()));
    assert!(quote_events(&h.drain_events()).is_empty());

    // 界面仍然显示最新收到的报价
    assert_eq!(o.confirmation().live_trade.map(|q| q.id), Some(stale.id));

    h.clock.advance(20);
    let fresh = h.quote(dai_units(297), None);
    o.observe_quote(TradeStatus::Valid, Some(fresh.clone()));
    assert_eq!(quote_events(&h.drain_events()), vec![(fresh.id.0, Some(50))]);
}

//! 授权流程测试
//!
//! 覆盖主按钮的授权阶段、在途互斥以及失败后恢复。

mod common;

use common::{ACCOUNT, Gate, Harness, MockAllowanceProvider, MockSwapExecutor, ROUTER, dai_units, usdc};
use std::sync::Arc;
use swap_flow_sdk::trading::AllowanceRequest;
use swap_flow_sdk::{
    ActionIntent, ActionOutcome, Address, AllowanceStatus, AuthorizationError, SwapError,
    SwapStage, TelemetryEvent,
};

fn needs_approval(h: &Harness) {
    h.connected_usdc_to_dai();
    h.orchestrator.observe_allowance(&Address::new(ACCOUNT), &usdc().address, &Address::new(ROUTER), 0);
    h.deliver_quote(dai_units(99), None);
}

#[tokio::test]
async fn test_approve_then_swap() {
    let mut h = Harness::new();
    needs_approval(&h);
    let o = h.orchestrator.clone();

    let action = o.primary_action();
    assert_eq!(o.stage(), SwapStage::NeedsAuthorization);
    assert_eq!(action.label, "Approve use of USDC");
    assert_eq!(action.intent, ActionIntent::Approve);
    assert!(action.enabled);

    assert_eq!(o.invoke_primary().await, ActionOutcome::Authorized);
    assert_eq!(o.allowance_status(), AllowanceStatus::Granted);
    assert_eq!(o.primary_action().label, "Swap");

    let events = h.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TelemetryEvent::AuthorizationSubmitted { token_symbol, amount, .. }
            if token_symbol == "USDC" && *amount == 100_000_000
    )));

    // 授权签名随执行请求一起提交
    assert!(matches!(o.invoke_primary().await, ActionOutcome::Settled { .. }));
    let request = h.swap.last_request.lock().clone().unwrap();
    assert_eq!(request.authorization.as_deref(), Some("0xpermit"));
}

#[tokio::test]
async fn test_single_pending_authorization() {
    let gate = Arc::new(Gate::default());
    let provider = MockAllowanceProvider { gate: Some(gate.clone()), ..Default::default() };
    let h = Harness::with_mocks(MockSwapExecutor::default(), provider);
    needs_approval(&h);
    let o = h.orchestrator.clone();

    let first = tokio::spawn({
        let o = o.clone();
        async move { o.invoke_primary().await }
    });
    gate.entered.notified().await;

    assert_eq!(o.allowance_status(), AllowanceStatus::Pending);
    let action = o.primary_action();
    assert_eq!(action.label, "Approval pending");
    assert!(!action.enabled);
    assert_eq!(o.invoke_primary().await, ActionOutcome::Ignored);

    let request = AllowanceRequest {
        owner: Address::new(ACCOUNT),
        token: usdc(),
        spender: Address::new(ROUTER),
        amount: 100_000_000,
    };
    assert_eq!(o.allowance().authorize(&request).await, Err(AuthorizationError::AlreadyPending));

    gate.release.notify_one();
    assert_eq!(first.await.unwrap(), ActionOutcome::Authorized);
    assert_eq!(h.allowance.calls(), 1);
}

#[tokio::test]
async fn test_rejected_authorization_returns_to_required() {
    let provider = MockAllowanceProvider::default();
    *provider.fail_next.lock() = Some("user denied signature".to_string());
    let h = Harness::with_mocks(MockSwapExecutor::default(), provider);
    needs_approval(&h);
    let o = h.orchestrator.clone();

    let outcome = o.invoke_primary().await;
    assert!(matches!(
        outcome,
        ActionOutcome::Failed(SwapError::Authorization(AuthorizationError::Rejected(ref msg)))
            if msg.contains("user denied")
    ));
    assert_eq!(o.allowance_status(), AllowanceStatus::Required);
    assert!(o.primary_action().enabled);

    // 重试成功
    assert_eq!(o.invoke_primary().await, ActionOutcome::Authorized);
    assert_eq!(h.allowance.calls(), 2);
}

#[tokio::test]
async fn test_larger_amount_needs_new_approval() {
    let h = Harness::new();
    h.connected_usdc_to_dai();
    let o = h.orchestrator.clone();
    o.observe_allowance(&Address::new(ACCOUNT), &usdc().address, &Address::new(ROUTER), 100_000_000);
    h.deliver_quote(dai_units(99), None);
    assert_eq!(o.allowance_status(), AllowanceStatus::Granted);

    o.type_input(swap_flow_sdk::Field::Input, "150");
    h.deliver_quote(dai_units(148), None);
    assert_eq!(o.allowance_status(), AllowanceStatus::Required);
}

#[tokio::test]
async fn test_spent_allowance_requires_new_approval() {
    let h = Harness::new();
    needs_approval(&h);
    let o = h.orchestrator.clone();

    assert_eq!(o.invoke_primary().await, ActionOutcome::Authorized);
    assert!(matches!(o.invoke_primary().await, ActionOutcome::Settled { .. }));
    assert!(o.dismiss());

    // 成交后数据流报告额度已花光
    o.observe_allowance(&Address::new(ACCOUNT), &usdc().address, &Address::new(ROUTER), 0);
    o.type_input(swap_flow_sdk::Field::Input, "50");
    h.deliver_quote(dai_units(49), None);

    assert_eq!(o.allowance_status(), AllowanceStatus::Required);
    let action = o.primary_action();
    assert_eq!(action.intent, ActionIntent::Approve);
    assert_eq!(action.label, "Approve use of USDC");
}

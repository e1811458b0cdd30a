//! 脚本化的兑换会话
//!
//! 用本地 mock 协作方跑一遍 授权 → 高价格影响确认 → 成交 的流程，每一步记录主按钮。
//!
//! 运行:
//!     RUST_LOG=swap_flow_sdk=debug cargo run -p swap_session

use async_trait::async_trait;
use std::sync::Arc;
use swap_flow_sdk::telemetry::TracingSink;
use swap_flow_sdk::trading::{
    AllowanceProvider, AllowanceRequest, Collaborators, ExecutionRequest, SwapExecutor,
    WalletConnector, WrapExecutor,
};
use swap_flow_sdk::utils::Percent;
use swap_flow_sdk::{
    Address, AnyResult, Field, FiatValues, Quote, SwapConfig, SwapOrchestrator, Token,
    TradeStatus, WrapType, system_clock,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct PrintingExecutor;

#[async_trait]
impl SwapExecutor for PrintingExecutor {
    async fn execute(&self, request: ExecutionRequest) -> AnyResult<String> {
        info!(request = %request.to_json(), "execute");
        Ok(format!("0x{:064x}", request.trade.id.0))
    }
}

struct NoWrap;

#[async_trait]
impl WrapExecutor for NoWrap {
    async fn execute_wrap(&self, wrap_type: WrapType, _amount: Option<u128>) -> AnyResult<String> {
        anyhow::bail!("{:?} is not available in this session", wrap_type)
    }
}

struct InstantPermit;

#[async_trait]
impl AllowanceProvider for InstantPermit {
    async fn approve_and_permit(&self, request: &AllowanceRequest) -> AnyResult<Option<String>> {
        info!(amount = request.amount, token = %request.token.symbol, spender = %request.spender, "approve");
        Ok(Some("0xpermit".to_string()))
    }
}

struct ConsoleWallet;

impl WalletConnector for ConsoleWallet {
    fn toggle(&self) {
        info!("wallet modal toggled");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("swap_flow_sdk=info,info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
}

fn show(step: &str, orchestrator: &SwapOrchestrator) {
    let action = orchestrator.primary_action();
    info!(
        step,
        stage = ?orchestrator.stage(),
        label = %action.label,
        enabled = action.enabled,
        danger = action.danger,
        "primary action"
    );
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = SwapConfig::from_env()?;
    let collaborators = Collaborators {
        swap: Arc::new(PrintingExecutor),
        wrap: Arc::new(NoWrap),
        allowance: Arc::new(InstantPermit),
        wallet: Arc::new(ConsoleWallet),
    };
    let orchestrator =
        SwapOrchestrator::new(config, collaborators, Arc::new(TracingSink), system_clock());

    let usdc = Token::erc20(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6);
    let dai = Token::erc20(1, "0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", 18);
    let account = Address::new("0x00000000000000000000000000000000000000aa");
    let router = Address::new("0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad");

    show("start", &orchestrator);
    orchestrator.invoke_primary().await;

    orchestrator.set_account(Some(account.clone()));
    orchestrator.set_currencies(Some(usdc.clone()), Some(dai.clone()));
    orchestrator.set_spender(Some(router.clone()));
    orchestrator.observe_balance(&usdc.address, 2_500_000_000);
    orchestrator.observe_allowance(&account, &usdc.address, &router, 0);
    show("connected", &orchestrator);

    orchestrator.type_input(Field::Input, "1000");
    orchestrator.observe_quote(TradeStatus::Loading, None);
    show("loading", &orchestrator);

    let Some(request) = orchestrator.derived().current_request else {
        anyhow::bail!("inputs are incomplete");
    };
    let quote = Quote::new(request, usdc, dai, 1_000_000_000, 935 * 10u128.pow(18))
        .with_price_impact(Percent::from_bps(620))
        .with_gas_estimate_usd(3.4);
    orchestrator.observe_quote(TradeStatus::Valid, Some(Arc::new(quote)));
    orchestrator.observe_fair_values(FiatValues { amount_in: Some(1000.0), amount_out: Some(935.0) });
    show("quoted", &orchestrator);

    let outcome = orchestrator.invoke_primary().await;
    info!(?outcome, "approve clicked");
    show("approved", &orchestrator);

    let outcome = orchestrator.invoke_primary().await;
    info!(?outcome, "swap clicked");
    show("confirming", &orchestrator);

    let outcome = orchestrator.accept().await;
    let confirmation = orchestrator.confirmation();
    info!(?outcome, result_handle = ?confirmation.result_handle, "confirmation accepted");

    orchestrator.dismiss();
    show("done", &orchestrator);
    Ok(())
}

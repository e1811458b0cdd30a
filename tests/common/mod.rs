//! 集成测试公共工具
//!
//! 提供可控的协作方 mock 和一个预先配置好的会话。

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use swap_flow_sdk::telemetry::ChannelSink;
use swap_flow_sdk::trading::{
    AllowanceProvider, AllowanceRequest, Collaborators, ExecutionRequest, SwapExecutor,
    WalletConnector, WrapExecutor,
};
use swap_flow_sdk::{
    Address, AnyResult, Field, ManualClock, Quote, SwapConfig, SwapOrchestrator, TelemetryEvent,
    Token, TradeStatus, WrapType,
};
use swap_flow_sdk::utils::Percent;
use tokio::sync::{Notify, mpsc};

pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";
pub const ROUTER: &str = "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad";

pub fn usdc() -> Token {
    Token::erc20(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6)
}

pub fn dai() -> Token {
    Token::erc20(1, "0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", 18)
}

pub fn eth() -> Token {
    Token::native(1, "ETH")
}

/// 可暂停的调用闸门：`entered` 在调用开始时通知，`release` 放行
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Default)]
pub struct MockSwapExecutor {
    pub calls: AtomicUsize,
    pub responses: Mutex<VecDeque<AnyResult<String>>>,
    pub last_request: Mutex<Option<ExecutionRequest>>,
    pub gate: Option<Arc<Gate>>,
}

impl MockSwapExecutor {
    pub fn push_ok(&self, handle: &str) {
        self.responses.lock().push_back(Ok(handle.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.responses.lock().push_back(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SwapExecutor for MockSwapExecutor {
    async fn execute(&self, request: ExecutionRequest) -> AnyResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        let next = self.responses.lock().pop_front();
        next.unwrap_or_else(|| Ok("0xhandle".to_string()))
    }
}

#[derive(Default)]
pub struct MockWrapExecutor {
    pub calls: Mutex<Vec<(WrapType, Option<u128>)>>,
}

#[async_trait]
impl WrapExecutor for MockWrapExecutor {
    async fn execute_wrap(&self, wrap_type: WrapType, amount: Option<u128>) -> AnyResult<String> {
        self.calls.lock().push((wrap_type, amount));
        Ok("0xwrap".to_string())
    }
}

#[derive(Default)]
pub struct MockAllowanceProvider {
    pub calls: AtomicUsize,
    pub fail_next: Mutex<Option<String>>,
    pub gate: Option<Arc<Gate>>,
}

impl MockAllowanceProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AllowanceProvider for MockAllowanceProvider {
    async fn approve_and_permit(&self, _request: &AllowanceRequest) -> AnyResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        let failure = self.fail_next.lock().take();
        match failure {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => Ok(Some("0xpermit".to_string())),
        }
    }
}

#[derive(Default)]
pub struct MockWallet {
    pub toggles: AtomicUsize,
}

impl WalletConnector for MockWallet {
    fn toggle(&self) {
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub orchestrator: Arc<SwapOrchestrator>,
    pub swap: Arc<MockSwapExecutor>,
    pub wrap: Arc<MockWrapExecutor>,
    pub allowance: Arc<MockAllowanceProvider>,
    pub wallet: Arc<MockWallet>,
    pub clock: Arc<ManualClock>,
    pub events: mpsc::UnboundedReceiver<TelemetryEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_mocks(MockSwapExecutor::default(), MockAllowanceProvider::default())
    }

    pub fn with_mocks(swap: MockSwapExecutor, allowance: MockAllowanceProvider) -> Self {
        let swap = Arc::new(swap);
        let wrap = Arc::new(MockWrapExecutor::default());
        let allowance = Arc::new(allowance);
        let wallet = Arc::new(MockWallet::default());
        let clock = Arc::new(ManualClock::new(1_000));
        let (sink, events) = ChannelSink::new();
        let collaborators = Collaborators {
            swap: swap.clone(),
            wrap: wrap.clone(),
            allowance: allowance.clone(),
            wallet: wallet.clone(),
        };
        let orchestrator = Arc::new(SwapOrchestrator::new(
            SwapConfig::default(),
            collaborators,
            Arc::new(sink),
            clock.clone(),
        ));
        Self { orchestrator, swap, wrap, allowance, wallet, clock, events }
    }

    /// 钱包已连接、USDC → DAI、输入 100 USDC、余额充足、授权已足够
    pub fn connected_usdc_to_dai(&self) {
        let o = &self.orchestrator;
        let account = Address::new(ACCOUNT);
        let router = Address::new(ROUTER);
        o.set_account(Some(account.clone()));
        o.set_currencies(Some(usdc()), Some(dai()));
        o.set_spender(Some(router.clone()));
        o.observe_balance(&usdc().address, 1_000 * 1_000_000);
        o.observe_allowance(&account, &usdc().address, &router, u128::MAX);
        o.type_input(Field::Input, "100");
    }

    /// 针对当前输入构造一个报价
    pub fn quote(&self, amount_out: u128, impact_bps: Option<i64>) -> Arc<Quote> {
        let request = self
            .orchestrator
            .derived()
            .current_request
            .expect("inputs must be complete before quoting");
        let amount_in = request.amount;
        let quote = Quote::new(request, usdc(), dai(), amount_in, amount_out);
        let quote = match impact_bps {
            Some(bps) => quote.with_price_impact(Percent::from_bps(bps)),
            None => quote,
        };
        Arc::new(quote)
    }

    /// Loading 之后推送一个有效报价
    pub fn deliver_quote(&self, amount_out: u128, impact_bps: Option<i64>) -> Arc<Quote> {
        let quote = self.quote(amount_out, impact_bps);
        self.orchestrator.observe_quote(TradeStatus::Loading, None);
        self.orchestrator.observe_quote(TradeStatus::Valid, Some(quote.clone()));
        quote
    }

    pub fn drain_events(&mut self) -> Vec<TelemetryEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn dai_units(amount: u128) -> u128 {
    amount * 10u128.pow(18)
}

//! 兑换流程编排
//!
//! 编排器持有一个会话的全部可变状态，放在 `parking_lot::Mutex` 里，锁从不跨 `.await`。
//! 授权、包装、执行三个异步操作都是单飞的：在途时再次触发直接返回 `Ignored`。

use crate::common::{
    Address, AuthorizationError, ClockRef, ExecutionError, FiatValues, Field, SwapConfig, SwapError,
    Token, WrapType,
};
use crate::constants::trade_platform::MULTI_HOP_TAG;
use crate::telemetry::{TelemetryEvent, TelemetryRef};
use crate::trading::action::{
    ActionIntent, ActionOutcome, DecisionInput, PrimaryAction, SwapStage, decide,
};
use crate::trading::allowance::{AllowanceCoordinator, AllowanceKey, AllowanceRequest, AllowanceStatus};
use crate::trading::attempt::{ConfirmationView, SwapAttempt};
use crate::trading::form::{DerivedSwapInfo, SwapForm};
use crate::trading::impact::{ImpactAssessment, ImpactGate};
use crate::trading::lifecycle::{Collaborators, ExecutionRequest};
use crate::trading::quote::{Quote, QuoteId, TradeStatus};
use crate::trading::quote_tracker::QuoteTracker;
use crate::utils::{format_units, max_amount_spend};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[cfg(feature = "perf-trace")]
use crate::common::Stopwatch;

#[derive(Debug)]
struct SessionState {
    account: Option<Address>,
    pair_supported: bool,
    expert_mode: bool,
    wrap_type: WrapType,
    wrap_input_error: Option<String>,
    form: SwapForm,
    spender: Option<Address>,
    balances: HashMap<Address, u128>,
    fiat_values: FiatValues,
    status: TradeStatus,
    quote: Option<Arc<Quote>>,
    tracker: QuoteTracker,
    attempt: SwapAttempt,
    /// 已经在确认弹窗里接受过价格影响的报价
    override_accepted_for: Option<QuoteId>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            account: None,
            pair_supported: true,
            expert_mode: false,
            wrap_type: WrapType::NotApplicable,
            wrap_input_error: None,
            form: SwapForm::default(),
            spender: None,
            balances: HashMap::new(),
            fiat_values: FiatValues::default(),
            status: TradeStatus::Idle,
            quote: None,
            tracker: QuoteTracker::new(),
            attempt: SwapAttempt::Idle,
            override_accepted_for: None,
        }
    }
}

impl SessionState {
    fn input_balance(&self) -> Option<u128> {
        let token = self.form.input_currency.as_ref()?;
        self.balances.get(&token.address).copied()
    }

    /// 授权所需额度：按滑点放大后的最大输入
    fn required_allowance(&self, slippage_bps: u32) -> Option<u128> {
        self.quote.as_ref().map(|quote| quote.maximum_amount_in(slippage_bps))
    }

    /// 收款人：打开了收款人输入时才有
    fn recipient(&self) -> Option<Address> {
        self.form.recipient_input.as_ref().and(self.form.resolved_recipient.clone())
    }
}

/// 一次完整判定的结果
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub derived: DerivedSwapInfo,
    pub impact: ImpactAssessment,
    pub allowance: AllowanceStatus,
    pub stage: SwapStage,
    pub action: PrimaryAction,
}

/// 单飞标记，drop 时释放
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok()?;
        Some(Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SwapOrchestrator {
    config: SwapConfig,
    gate: ImpactGate,
    allowance: AllowanceCoordinator,
    collaborators: Collaborators,
    telemetry: TelemetryRef,
    clock: ClockRef,
    state: Mutex<SessionState>,
    wrap_in_flight: AtomicBool,
}

impl SwapOrchestrator {
    pub fn new(
        config: SwapConfig,
        collaborators: Collaborators,
        telemetry: TelemetryRef,
        clock: ClockRef,
    ) -> Self {
        let allowance =
            AllowanceCoordinator::new(collaborators.allowance.clone(), telemetry.clone());
        Self {
            gate: ImpactGate::new(config.impact_thresholds),
            config,
            allowance,
            collaborators,
            telemetry,
            clock,
            state: Mutex::new(SessionState::default()),
            wrap_in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    pub fn allowance(&self) -> &AllowanceCoordinator {
        &self.allowance
    }

    // ---------------------------------------------------------------
    // 输入
    // ---------------------------------------------------------------

    pub fn set_account(&self, account: Option<Address>) {
        self.state.lock().account = account;
    }

    pub fn set_pair_supported(&self, supported: bool) {
        self.state.lock().pair_supported = supported;
    }

    pub fn set_expert_mode(&self, expert_mode: bool) {
        self.state.lock().expert_mode = expert_mode;
    }

    /// 包装类型及其输入错误（由包装服务判定）
    pub fn set_wrap(&self, wrap_type: WrapType, input_error: Option<String>) {
        let mut state = self.state.lock();
        state.wrap_type = wrap_type;
        state.wrap_input_error = input_error;
    }

    pub fn set_currencies(&self, input: Option<Token>, output: Option<Token>) {
        let mut state = self.state.lock();
        state.form.input_currency = input;
        state.form.output_currency = output;
    }

    /// 当前网络的授权对象；None 表示网络不支持
    pub fn set_spender(&self, spender: Option<Address>) {
        self.state.lock().spender = spender;
    }

    pub fn type_input(&self, field: Field, value: impl Into<String>) {
        self.state.lock().form.type_input(field, value);
    }

    pub fn set_recipient(&self, input: Option<String>, resolved: Option<Address>) {
        self.state.lock().form.set_recipient(input, resolved);
    }

    pub fn observe_balance(&self, token: &Address, amount: u128) {
        self.state.lock().balances.insert(token.clone(), amount);
    }

    pub fn observe_fair_values(&self, fiat_values: FiatValues) {
        self.state.lock().fiat_values = fiat_values;
    }

    pub fn observe_allowance(&self, owner: &Address, token: &Address, spender: &Address, amount: u128) {
        self.allowance.observe_allowance(owner, token, spender, amount);
    }

    /// 路由服务推送的最新状态，后到的覆盖先到的
    pub fn observe_quote(&self, status: TradeStatus, quote: Option<Arc<Quote>>) {
        let now = self.clock.now_millis();
        let event = {
            let mut state = self.state.lock();
            let request = state.form.current_request();
            let event = state.tracker.observe(status, quote.as_ref(), request.as_ref(), now);

            if let Some(live) = quote.as_ref() {
                if let SwapAttempt::Confirming { snapshot, accept_changes_required } = &mut state.attempt {
                    if !*accept_changes_required && snapshot.meaningfully_differs(live) {
                        debug!(snapshot = snapshot.id.0, live = live.id.0, "quote changed under confirmation");
                        *accept_changes_required = true;
                    }
                }
            }

            state.status = status;
            state.quote = quote;
            event
        };
        if let Some(event) = event {
            self.telemetry.emit(event);
        }
    }

    /// Max 按钮：原生币保留 gas
    pub fn apply_max_input(&self) -> Option<u128> {
        let (max, event) = {
            let mut state = self.state.lock();
            let token = state.form.input_currency.clone()?;
            let balance = state.input_balance()?;
            let max = max_amount_spend(balance, token.is_native, self.config.native_gas_reserve)?;
            let amount = format_units(max, token.decimals);
            state.form.type_input(Field::Input, amount.clone());
            debug!(token = %token.symbol, max, "max input applied");
            (max, TelemetryEvent::MaxInputApplied { token_symbol: token.symbol, amount })
        };
        self.telemetry.emit(event);
        Some(max)
    }

    // ---------------------------------------------------------------
    // 查询
    // ---------------------------------------------------------------

    /// 只看会话输入的判定，不叠加确认弹窗的状态
    fn decide_locked(&self, state: &SessionState) -> Evaluation {
        let slippage = self.config.allowed_slippage_bps;
        let derived = state.form.derive(
            state.wrap_type,
            state.quote.as_deref(),
            state.input_balance(),
            slippage,
        );
        let impact = self.gate.assess(state.quote.as_deref(), state.status, &state.fiat_values);
        let allowance = match (&state.account, &state.form.input_currency) {
            (Some(owner), Some(token)) => self.allowance.current_status(
                owner,
                token,
                state.required_allowance(slippage),
                state.spender.as_ref(),
            ),
            _ => AllowanceStatus::Unknown,
        };

        let input = DecisionInput {
            pair_supported: state.pair_supported,
            wallet_connected: state.account.is_some(),
            wrap_type: state.wrap_type,
            wrap_input_error: state.wrap_input_error.as_deref(),
            status: state.status,
            has_trade: state.quote.is_some(),
            both_sides_specified: derived.both_sides_specified,
            input_error: derived.input_error.as_ref(),
            input_symbol: state.form.input_currency.as_ref().map(|t| t.symbol.as_str()),
            allowance,
            impact: &impact,
            expert_mode: state.expert_mode,
        };
        let (stage, action) = decide(&input);
        Evaluation { derived, impact, allowance, stage, action }
    }

    fn evaluate_locked(&self, state: &SessionState) -> Evaluation {
        let mut evaluation = self.decide_locked(state);
        evaluation.stage = match &state.attempt {
            SwapAttempt::Idle => evaluation.stage,
            SwapAttempt::Confirming { .. } => SwapStage::Confirming,
            SwapAttempt::Submitting { .. } => SwapStage::Submitting,
            SwapAttempt::Settled { .. } => SwapStage::Settled,
            SwapAttempt::Failed { .. } => SwapStage::Failed,
        };
        if state.attempt.is_submitting() {
            evaluation.action.enabled = false;
        }
        evaluation
    }

    pub fn evaluate(&self) -> Evaluation {
        let state = self.state.lock();
        self.evaluate_locked(&state)
    }

    pub fn stage(&self) -> SwapStage {
        self.evaluate().stage
    }

    pub fn primary_action(&self) -> PrimaryAction {
        self.evaluate().action
    }

    pub fn impact(&self) -> ImpactAssessment {
        self.evaluate().impact
    }

    pub fn allowance_status(&self) -> AllowanceStatus {
        self.evaluate().allowance
    }

    pub fn derived(&self) -> DerivedSwapInfo {
        self.evaluate().derived
    }

    /// 输入框显示的两侧金额
    pub fn formatted_amounts(&self) -> (String, String) {
        let state = self.state.lock();
        let derived = self.evaluate_locked(&state).derived;
        state.form.formatted_amounts(&derived)
    }

    pub fn typed_value(&self) -> String {
        self.state.lock().form.typed_value.clone()
    }

    pub fn confirmation(&self) -> ConfirmationView {
        let state = self.state.lock();
        ConfirmationView::from_attempt(&state.attempt, state.quote.clone(), state.tracker.last_received_at())
    }

    // ---------------------------------------------------------------
    // 动作
    // ---------------------------------------------------------------

    /// 点击主按钮
    pub async fn invoke_primary(&self) -> ActionOutcome {
        let action = self.primary_action();
        if !action.enabled {
            debug!(label = %action.label, "primary action disabled, click ignored");
            return ActionOutcome::Ignored;
        }

        match action.intent {
            ActionIntent::None => ActionOutcome::Ignored,
            ActionIntent::ConnectWallet => self.connect_wallet(),
            ActionIntent::Wrap(wrap_type) => self.wrap(wrap_type).await,
            ActionIntent::Approve => self.approve().await,
            ActionIntent::Swap => self.start_swap().await,
        }
    }

    fn connect_wallet(&self) -> ActionOutcome {
        let received_swap_quote = self.state.lock().quote.is_some();
        self.telemetry.emit(TelemetryEvent::ConnectWalletClicked { received_swap_quote });
        self.collaborators.wallet.toggle();
        ActionOutcome::WalletPrompted
    }

    async fn wrap(&self, wrap_type: WrapType) -> ActionOutcome {
        let Some(_guard) = FlightGuard::acquire(&self.wrap_in_flight) else {
            debug!("wrap already in flight");
            return ActionOutcome::Ignored;
        };
        let amount = {
            let state = self.state.lock();
            let evaluation = self.evaluate_locked(&state);
            evaluation.derived.input_amount
        };

        match self.collaborators.wrap.execute_wrap(wrap_type, amount).await {
            Ok(handle) => {
                info!(?wrap_type, %handle, "wrap submitted");
                ActionOutcome::Wrapped { handle }
            },
            Err(e) => {
                warn!("包装失败 {:?}: {:#}", wrap_type, e);
                ActionOutcome::Failed(ExecutionError::WrapFailed(e.to_string()).into())
            },
        }
    }

    async fn approve(&self) -> ActionOutcome {
        let request = {
            let state = self.state.lock();
            match (&state.account, &state.form.input_currency, &state.spender) {
                (Some(owner), Some(token), Some(spender)) => {
                    state.required_allowance(self.config.allowed_slippage_bps).map(|amount| {
                        AllowanceRequest {
                            owner: owner.clone(),
                            token: token.clone(),
                            spender: spender.clone(),
                            amount,
                        }
                    })
                },
                _ => None,
            }
        };
        let Some(request) = request else {
            return ActionOutcome::Failed(AuthorizationError::MissingContext.into());
        };

        match self.allowance.authorize(&request).await {
            Ok(_) => ActionOutcome::Authorized,
            Err(AuthorizationError::AlreadyPending) => ActionOutcome::Ignored,
            Err(e) => ActionOutcome::Failed(e.into()),
        }
    }

    /// Swap 按钮：需要确认时打开弹窗，否则直接提交
    async fn start_swap(&self) -> ActionOutcome {
        let snapshot = {
            let mut state = self.state.lock();
            if matches!(state.attempt, SwapAttempt::Confirming { .. } | SwapAttempt::Submitting { .. }) {
                return ActionOutcome::Ignored;
            }
            // 点击之后报价可能已被替换，在同一把锁里重新判定
            let evaluation = self.decide_locked(&state);
            match evaluation.stage {
                SwapStage::Unsupported => return ActionOutcome::Failed(SwapError::UnsupportedAsset),
                SwapStage::InsufficientLiquidity => return ActionOutcome::Failed(SwapError::RouteNotFound),
                _ => {},
            }
            if !evaluation.action.enabled || evaluation.action.intent != ActionIntent::Swap {
                debug!(label = %evaluation.action.label, stage = ?evaluation.stage, "swap no longer available");
                return ActionOutcome::Ignored;
            }
            let Some(trade) = state.quote.clone() else {
                return ActionOutcome::Ignored;
            };
            let impact = evaluation.impact;
            if impact.requires_override() && state.override_accepted_for != Some(trade.id) {
                info!(quote_id = trade.id.0, severity = ?impact.severity, "price impact needs confirmation");
                state.attempt =
                    SwapAttempt::Confirming { snapshot: trade, accept_changes_required: false };
                return ActionOutcome::ConfirmationOpened;
            }
            trade
        };
        self.submit(snapshot).await
    }

    /// 确认弹窗里的确认按钮；失败后再次点击会重试同一快照
    pub async fn accept(&self) -> ActionOutcome {
        let snapshot = {
            let mut state = self.state.lock();
            let snapshot = match &state.attempt {
                SwapAttempt::Confirming { accept_changes_required: true, .. } => {
                    debug!("accept ignored until quote changes are accepted");
                    return ActionOutcome::Ignored;
                },
                SwapAttempt::Confirming { snapshot, .. } | SwapAttempt::Failed { snapshot, .. } => {
                    snapshot.clone()
                },
                _ => return ActionOutcome::Ignored,
            };
            let impact = self.gate.assess(Some(snapshot.as_ref()), state.status, &state.fiat_values);
            if impact.is_blocked(state.expert_mode) {
                warn!(quote_id = snapshot.id.0, "price impact too high, accept refused");
                return ActionOutcome::Ignored;
            }
            state.override_accepted_for = Some(snapshot.id);
            snapshot
        };
        self.submit(snapshot).await
    }

    /// 接受新报价，替换冻结的快照
    pub fn accept_changes(&self) -> bool {
        let mut state = self.state.lock();
        let live = state.quote.clone();
        match (&mut state.attempt, live) {
            (SwapAttempt::Confirming { snapshot, accept_changes_required }, Some(live))
                if *accept_changes_required =>
            {
                debug!(from = snapshot.id.0, to = live.id.0, "quote changes accepted");
                *snapshot = live;
                *accept_changes_required = false;
                true
            },
            _ => false,
        }
    }

    /// 关闭确认弹窗；已成交时清空输入
    pub fn dismiss(&self) -> bool {
        let mut state = self.state.lock();
        let had_handle = match &state.attempt {
            SwapAttempt::Idle => return false,
            SwapAttempt::Submitting { .. } => {
                debug!("dismiss ignored while submitting");
                return false;
            },
            attempt => attempt.result_handle().is_some(),
        };
        state.attempt = SwapAttempt::Idle;
        if had_handle {
            state.form.clear_input();
        }
        debug!(had_handle, "confirmation dismissed");
        true
    }

    async fn submit(&self, snapshot: Arc<Quote>) -> ActionOutcome {
        let (request, label, route) = {
            let mut state = self.state.lock();
            if state.attempt.is_submitting() {
                return ActionOutcome::Ignored;
            }
            state.attempt = SwapAttempt::Submitting { snapshot: snapshot.clone() };

            let recipient = state.recipient();
            let authorization = match (&state.account, &state.spender) {
                (Some(owner), Some(spender)) => self.allowance.authorization(&AllowanceKey::new(
                    owner,
                    &snapshot.input_token.address,
                    spender,
                )),
                _ => None,
            };
            let label = submitted_label(recipient.as_ref(), state.account.as_ref());
            let request = ExecutionRequest {
                trade: snapshot.clone(),
                fiat_values: state.fiat_values,
                allowed_slippage_bps: self.config.allowed_slippage_bps,
                authorization,
                recipient,
            };
            (request, label, self.route_label(&snapshot))
        };

        info!(request = %request.to_json(), "swap submitting");
        #[cfg(feature = "perf-trace")]
        let stopwatch = Stopwatch::start(self.clock.clone(), "swap_execute");

        let result = self.collaborators.swap.execute(request).await;

        #[cfg(feature = "perf-trace")]
        info!("[perf] {} 耗时 {}ms", stopwatch.label(), stopwatch.elapsed_millis());

        match result {
            Ok(result_handle) => {
                self.state.lock().attempt = SwapAttempt::Settled {
                    snapshot,
                    result_handle: result_handle.clone(),
                };
                info!(%result_handle, %label, "swap settled");
                self.telemetry.emit(TelemetryEvent::SwapSubmitted {
                    label,
                    route,
                    result_handle: result_handle.clone(),
                });
                ActionOutcome::Settled { result_handle }
            },
            Err(e) => {
                let error = e.to_string();
                warn!("兑换执行失败: {:#}", e);
                self.state.lock().attempt = SwapAttempt::Failed { snapshot, error: error.clone() };
                ActionOutcome::Failed(ExecutionError::Rejected(error).into())
            },
        }
    }

    fn route_label(&self, trade: &Quote) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.route_label, trade.input_token.symbol, trade.output_token.symbol, MULTI_HOP_TAG
        )
    }
}

/// 成交事件的 label：区分是否设置了收款人、收款人是否是自己
fn submitted_label(recipient: Option<&Address>, account: Option<&Address>) -> String {
    match recipient {
        None => "Swap w/o Send",
        Some(recipient) if Some(recipient) == account => "Swap w/o Send + recipient",
        Some(_) => "Swap w/ Send",
    }
    .to_string()
}

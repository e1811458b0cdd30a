//! 主按钮描述与阶段判定
//!
//! `decide` 是纯函数：输入一次状态快照，按优先级取第一条命中的规则。

use crate::common::{InputError, SwapError, WrapType};
use crate::constants::labels;
use crate::trading::allowance::AllowanceStatus;
use crate::trading::impact::{ImpactAssessment, Severity};
use crate::trading::quote::TradeStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionIntent {
    None,
    ConnectWallet,
    Wrap(WrapType),
    Approve,
    Swap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryAction {
    pub label: String,
    pub enabled: bool,
    pub intent: ActionIntent,
    /// 价格影响达到 High 及以上，按钮用警示样式
    pub danger: bool,
}

impl PrimaryAction {
    fn enabled(label: impl Into<String>, intent: ActionIntent) -> Self {
        Self { label: label.into(), enabled: true, intent, danger: false }
    }

    fn disabled(label: impl Into<String>) -> Self {
        Self { label: label.into(), enabled: false, intent: ActionIntent::None, danger: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapStage {
    NoInput,
    Unsupported,
    /// 钱包未连接
    Disconnected,
    NeedsWrap,
    InsufficientLiquidity,
    InvalidInput,
    /// 价格影响过大，非专家模式不可执行
    Blocked,
    NeedsAuthorization,
    ReadyToConfirm,
    Confirming,
    Submitting,
    Settled,
    Failed,
}

/// 点击主按钮（或确认弹窗按钮）的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// 按钮不可用或已有在途操作
    Ignored,
    WalletPrompted,
    ConfirmationOpened,
    Wrapped { handle: String },
    Authorized,
    Settled { result_handle: String },
    Failed(SwapError),
}

/// 一次判定需要的全部输入
#[derive(Debug, Clone)]
pub struct DecisionInput<'a> {
    pub pair_supported: bool,
    pub wallet_connected: bool,
    pub wrap_type: WrapType,
    pub wrap_input_error: Option<&'a str>,
    pub status: TradeStatus,
    pub has_trade: bool,
    pub both_sides_specified: bool,
    pub input_error: Option<&'a InputError>,
    pub input_symbol: Option<&'a str>,
    pub allowance: AllowanceStatus,
    pub impact: &'a ImpactAssessment,
    pub expert_mode: bool,
}

impl DecisionInput<'_> {
    /// 没有路由：明确返回 NoRoute，或者 Valid 却没有报价。Idle 和加载中都不算。
    pub fn route_not_found(&self) -> bool {
        match self.status {
            TradeStatus::NoRoute => true,
            TradeStatus::Valid => !self.has_trade,
            _ => false,
        }
    }
}

pub fn decide(input: &DecisionInput<'_>) -> (SwapStage, PrimaryAction) {
    if !input.pair_supported {
        return (SwapStage::Unsupported, PrimaryAction::disabled(labels::UNSUPPORTED_ASSET));
    }
    if !input.wallet_connected {
        return (
            SwapStage::Disconnected,
            PrimaryAction::enabled(labels::CONNECT_WALLET, ActionIntent::ConnectWallet),
        );
    }
    if input.wrap_type != WrapType::NotApplicable {
        let action = match input.wrap_input_error {
            Some(error) => PrimaryAction::disabled(error),
            None => {
                let label = match input.wrap_type {
                    WrapType::Unwrap => labels::UNWRAP,
                    _ => labels::WRAP,
                };
                PrimaryAction::enabled(label, ActionIntent::Wrap(input.wrap_type))
            },
        };
        return (SwapStage::NeedsWrap, action);
    }
    if input.route_not_found() && input.both_sides_specified {
        return (
            SwapStage::InsufficientLiquidity,
            PrimaryAction::disabled(labels::INSUFFICIENT_LIQUIDITY),
        );
    }
    if let Some(error) = input.input_error {
        let stage = match error {
            InputError::SelectToken | InputError::EnterAmount => SwapStage::NoInput,
            _ => SwapStage::InvalidInput,
        };
        return (stage, PrimaryAction::disabled(error.to_string()));
    }
    if input.impact.is_blocked(input.expert_mode) {
        let mut action = PrimaryAction::disabled(labels::PRICE_IMPACT_TOO_HIGH);
        action.danger = true;
        return (SwapStage::Blocked, action);
    }

    match input.allowance {
        AllowanceStatus::Required => {
            let symbol = input.input_symbol.unwrap_or_default();
            return (
                SwapStage::NeedsAuthorization,
                PrimaryAction::enabled(labels::approve_use_of(symbol), ActionIntent::Approve),
            );
        },
        AllowanceStatus::Pending => {
            return (SwapStage::NeedsAuthorization, PrimaryAction::disabled(labels::APPROVAL_PENDING));
        },
        _ => {},
    }

    if input.status.is_loading_or_syncing()
        || input.allowance == AllowanceStatus::Unknown
        || !input.has_trade
    {
        return (SwapStage::ReadyToConfirm, PrimaryAction::disabled(labels::SWAP));
    }

    let label =
        if input.impact.severity >= Severity::High { labels::SWAP_ANYWAY } else { labels::SWAP };
    let mut action = PrimaryAction::enabled(label, ActionIntent::Swap);
    action.danger = input.impact.is_dangerous();
    (SwapStage::ReadyToConfirm, action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Percent;

    fn ready<'a>(impact: &'a ImpactAssessment) -> DecisionInput<'a> {
        DecisionInput {
            pair_supported: true,
            wallet_connected: true,
            wrap_type: WrapType::NotApplicable,
            wrap_input_error: None,
            status: TradeStatus::Valid,
            has_trade: true,
            both_sides_specified: true,
            input_error: None,
            input_symbol: Some("USDC"),
            allowance: AllowanceStatus::Granted,
            impact,
            expert_mode: false,
        }
    }

    fn assessment(severity: Severity) -> ImpactAssessment {
        ImpactAssessment {
            effective_impact: Some(Percent::from_bps(1)),
            severity,
            ..ImpactAssessment::default()
        }
    }

    #[test]
    fn test_unsupported_wins_over_everything() {
        let impact = ImpactAssessment::default();
        let input = DecisionInput { pair_supported: false, wallet_connected: false, ..ready(&impact) };
        let (stage, action) = decide(&input);
        assert_eq!(stage, SwapStage::Unsupported);
        assert_eq!(action.label, "Unsupported Asset");
        assert!(!action.enabled);
    }

    #[test]
    fn test_no_route_only_when_not_loading() {
        let impact = ImpactAssessment::default();
        let input = DecisionInput { has_trade: false, status: TradeStatus::NoRoute, ..ready(&impact) };
        assert_eq!(decide(&input).0, SwapStage::InsufficientLiquidity);

        let loading = DecisionInput { has_trade: false, status: TradeStatus::Loading, ..ready(&impact) };
        let (stage, action) = decide(&loading);
        assert_eq!(stage, SwapStage::ReadyToConfirm);
        assert_eq!(action.label, "Swap");
        assert!(!action.enabled);
    }

    #[test]
    fn test_input_error_becomes_label() {
        let impact = ImpactAssessment::default();
        let error = InputError::InsufficientBalance { symbol: "USDC".into() };
        let input = DecisionInput { input_error: Some(&error), ..ready(&impact) };
        let (stage, action) = decide(&input);
        assert_eq!(stage, SwapStage::InvalidInput);
        assert_eq!(action.label, "Insufficient USDC balance");
    }

    #[test]
    fn test_wrap_error_disables() {
        let impact = ImpactAssessment::default();
        let input = DecisionInput {
            wrap_type: WrapType::Unwrap,
            wrap_input_error: Some("Insufficient WETH balance"),
            ..ready(&impact)
        };
        let (stage, action) = decide(&input);
        assert_eq!(stage, SwapStage::NeedsWrap);
        assert_eq!(action.label, "Insufficient WETH balance");
        assert!(!action.enabled);
    }

    #[test]
    fn test_severity_labels() {
        let high = assessment(Severity::High);
        let (_, action) = decide(&ready(&high));
        assert_eq!(action.label, "Swap Anyway");
        assert!(action.enabled && action.danger);

        let severe = assessment(Severity::Severe);
        let (stage, action) = decide(&ready(&severe));
        assert_eq!(stage, SwapStage::Blocked);
        assert_eq!(action.label, "Price Impact Too High");
        assert!(!action.enabled);

        let expert = DecisionInput { expert_mode: true, ..ready(&severe) };
        let (_, action) = decide(&expert);
        assert_eq!(action.label, "Swap Anyway");
        assert!(action.enabled);
    }

    #[test]
    fn test_unknown_allowance_disables_swap() {
        let impact = ImpactAssessment::default();
        let input = DecisionInput { allowance: AllowanceStatus::Unknown, ..ready(&impact) };
        let (_, action) = decide(&input);
        assert_eq!(action, PrimaryAction::disabled("Swap"));
    }
}

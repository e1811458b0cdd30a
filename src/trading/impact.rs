//! 价格影响分级
//!
//! 有效影响取执行价格影响与 USD 估值影响中较大的一个，再按阈值分级。
//! High 及以上需要用户确认；Severe 在非专家模式下直接禁用。

use crate::common::{FiatValues, ImpactThresholds};
use crate::trading::quote::{Quote, TradeStatus};
use crate::utils::{
    Percent, compute_fiat_value_price_impact, compute_realized_price_impact, larger_percent_value,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ImpactAssessment {
    pub execution_impact: Option<Percent>,
    pub fair_value_impact: Option<Percent>,
    pub effective_impact: Option<Percent>,
    pub severity: Severity,
}

impl ImpactAssessment {
    /// 提交前必须有一次明确的确认
    pub fn requires_override(&self) -> bool {
        self.severity >= Severity::High
    }

    pub fn is_blocked(&self, expert_mode: bool) -> bool {
        self.severity == Severity::Severe && !expert_mode
    }

    pub fn shows_warning(&self) -> bool {
        self.effective_impact.is_some() && self.severity == Severity::Severe
    }

    pub fn is_dangerous(&self) -> bool {
        self.severity >= Severity::High
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImpactGate {
    thresholds: ImpactThresholds,
}

impl Default for ImpactGate {
    fn default() -> Self {
        Self { thresholds: ImpactThresholds::default() }
    }
}

impl ImpactGate {
    pub fn new(thresholds: ImpactThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ImpactThresholds {
        &self.thresholds
    }

    pub fn severity(&self, impact: Option<Percent>) -> Severity {
        let Some(impact) = impact else {
            return Severity::None;
        };
        let t = &self.thresholds;
        if impact.exceeds_bps(t.blocked_bps) {
            Severity::Severe
        } else if impact.exceeds_bps(t.high_bps) {
            Severity::High
        } else if impact.exceeds_bps(t.medium_bps) {
            Severity::Medium
        } else if impact.exceeds_bps(t.low_bps) {
            Severity::Low
        } else {
            Severity::None
        }
    }

    pub fn assess(
        &self,
        trade: Option<&Quote>,
        status: TradeStatus,
        fiat_values: &FiatValues,
    ) -> ImpactAssessment {
        let valid_trade = trade.filter(|_| status == TradeStatus::Valid);
        let execution_impact = valid_trade.and_then(|quote| {
            quote
                .price_impact
                .map(|impact| compute_realized_price_impact(impact, quote.realized_lp_fee))
        });

        // 刷新中的报价与估值对不上，不计算
        let fair_value_impact = match trade {
            Some(_) if status != TradeStatus::Syncing => {
                compute_fiat_value_price_impact(fiat_values.amount_in, fiat_values.amount_out)
            },
            _ => None,
        };

        let effective_impact = larger_percent_value(execution_impact, fair_value_impact);
        ImpactAssessment {
            execution_impact,
            fair_value_impact,
            effective_impact,
            severity: self.severity(effective_impact),
        }
    }
}

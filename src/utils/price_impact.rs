//! 价格影响计算

use serde::{Deserialize, Serialize};
use std::fmt;

/// 百分比，内部以小数存储（0.05 == 5%）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Percent(f64);

impl Percent {
    pub fn from_fraction(fraction: f64) -> Self {
        Self(fraction)
    }

    pub fn from_bps(bps: i64) -> Self {
        Self(bps as f64 / 10_000.0)
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn bps(&self) -> f64 {
        self.0 * 10_000.0
    }

    /// 严格大于给定基点
    pub fn exceeds_bps(&self, bps: u32) -> bool {
        self.bps() > bps as f64
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0 * 100.0)
    }
}

/// 用 USD 估值计算的价格影响：1 - out / in
///
/// 任一估值缺失或输入估值不为正时无法计算。
pub fn compute_fiat_value_price_impact(
    fiat_value_input: Option<f64>,
    fiat_value_output: Option<f64>,
) -> Option<Percent> {
    let input = fiat_value_input?;
    let output = fiat_value_output?;
    if !input.is_finite() || !output.is_finite() || input <= 0.0 {
        return None;
    }
    Some(Percent::from_fraction(1.0 - output / input))
}

/// 路由报价自带的价格影响扣除 LP 手续费后的实际影响
pub fn compute_realized_price_impact(
    price_impact: Percent,
    realized_lp_fee: Option<Percent>,
) -> Percent {
    match realized_lp_fee {
        Some(fee) => Percent::from_fraction(price_impact.fraction() - fee.fraction()),
        None => price_impact,
    }
}

/// 两者取大；只有一个时取该值
pub fn larger_percent_value(a: Option<Percent>, b: Option<Percent>) -> Option<Percent> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a > b { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

//! 价格影响分级阈值（基点）
//!
//! 严格大于阈值才进入对应等级，与 `Severity` 的顺序一一对应。

/// 1%：Low
pub const ALLOWED_PRICE_IMPACT_LOW_BPS: u32 = 100;
/// 3%：Medium
pub const ALLOWED_PRICE_IMPACT_MEDIUM_BPS: u32 = 300;
/// 5%：High，需要用户在确认弹窗中显式同意
pub const ALLOWED_PRICE_IMPACT_HIGH_BPS: u32 = 500;
/// 15%：Severe，非专家模式下直接禁用
pub const BLOCKED_PRICE_IMPACT_NON_EXPERT_BPS: u32 = 1_500;

/// 默认滑点 0.5%
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

/// 基点分母
pub const BPS_DENOMINATOR: u32 = 10_000;

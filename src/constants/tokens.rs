//! 原生币相关常量

/// 原生币 18 位精度
pub const NATIVE_DECIMALS: u8 = 18;

/// Max 按钮为 gas 预留的原生币数量（0.01，18 位精度）
pub const MIN_NATIVE_CURRENCY_FOR_GAS: u128 = 10_000_000_000_000_000;

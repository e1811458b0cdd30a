use crate::common::errors::ConfigError;
use crate::constants::{
    ALLOWED_PRICE_IMPACT_HIGH_BPS, ALLOWED_PRICE_IMPACT_LOW_BPS, ALLOWED_PRICE_IMPACT_MEDIUM_BPS,
    BLOCKED_PRICE_IMPACT_NON_EXPERT_BPS, DEFAULT_SLIPPAGE_BPS, MIN_NATIVE_CURRENCY_FOR_GAS,
    NATIVE_DECIMALS,
};
use crate::constants::trade_platform::SWAP_ROUTER;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AnyResult<T> = anyhow::Result<T>;

/// 链上地址（统一小写，便于比较）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Token metadata as handed over by the token-selection collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    /// 原生币不需要授权
    pub is_native: bool,
}

impl Token {
    pub fn erc20(chain_id: u64, address: impl AsRef<str>, symbol: &str, decimals: u8) -> Self {
        Self {
            chain_id,
            address: Address::new(address),
            symbol: symbol.to_string(),
            decimals,
            is_native: false,
        }
    }

    pub fn native(chain_id: u64, symbol: &str) -> Self {
        Self {
            chain_id,
            address: Address::new("native"),
            symbol: symbol.to_string(),
            decimals: NATIVE_DECIMALS,
            is_native: true,
        }
    }
}

/// 用户正在输入的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Input,
    Output,
}

/// Native <-> wrapped native conversions bypass the router entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapType {
    #[default]
    NotApplicable,
    Wrap,
    Unwrap,
}

/// USD 估值（由外部价格服务提供）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FiatValues {
    pub amount_in: Option<f64>,
    pub amount_out: Option<f64>,
}

/// 价格影响分级阈值
///
/// 只有相对顺序是契约：`high_bps`（需要确认）必须严格小于 `blocked_bps`（直接禁用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactThresholds {
    pub low_bps: u32,
    pub medium_bps: u32,
    pub high_bps: u32,
    pub blocked_bps: u32,
}

impl Default for ImpactThresholds {
    fn default() -> Self {
        Self {
            low_bps: ALLOWED_PRICE_IMPACT_LOW_BPS,
            medium_bps: ALLOWED_PRICE_IMPACT_MEDIUM_BPS,
            high_bps: ALLOWED_PRICE_IMPACT_HIGH_BPS,
            blocked_bps: BLOCKED_PRICE_IMPACT_NON_EXPERT_BPS,
        }
    }
}

impl ImpactThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.low_bps < self.medium_bps
            && self.medium_bps < self.high_bps
            && self.high_bps < self.blocked_bps;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::UnorderedThresholds {
                low: self.low_bps,
                medium: self.medium_bps,
                high: self.high_bps,
                blocked: self.blocked_bps,
            })
        }
    }
}

/// Per-session configuration for the swap flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapConfig {
    /// 允许滑点（基点，50 = 0.5%）
    pub allowed_slippage_bps: u32,
    pub impact_thresholds: ImpactThresholds,
    /// Max 按钮在原生币余额里保留的 gas 数量（最小单位）
    pub native_gas_reserve: u128,
    /// 成交事件 label 里的路由名
    pub route_label: String,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            allowed_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            impact_thresholds: ImpactThresholds::default(),
            native_gas_reserve: MIN_NATIVE_CURRENCY_FOR_GAS,
            route_label: SWAP_ROUTER.to_string(),
        }
    }
}

impl SwapConfig {
    pub fn new() -> Self {
        let config = Self::default();
        tracing::debug!(
            slippage_bps = config.allowed_slippage_bps,
            high_bps = config.impact_thresholds.high_bps,
            blocked_bps = config.impact_thresholds.blocked_bps,
            "SwapConfig created with defaults"
        );
        config
    }

    /// 设置允许滑点（基点）
    pub fn with_slippage_bps(mut self, bps: u32) -> Self {
        self.allowed_slippage_bps = bps;
        self
    }

    pub fn with_impact_thresholds(
        mut self,
        thresholds: ImpactThresholds,
    ) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        self.impact_thresholds = thresholds;
        Ok(self)
    }

    pub fn with_native_gas_reserve(mut self, reserve: u128) -> Self {
        self.native_gas_reserve = reserve;
        self
    }

    pub fn with_route_label(mut self, label: impl Into<String>) -> Self {
        self.route_label = label.into();
        self
    }

    /// 从环境变量读取覆盖项
    ///
    /// - `SWAP_SLIPPAGE_BPS`
    /// - `SWAP_NATIVE_GAS_RESERVE`
    /// - `SWAP_IMPACT_HIGH_BPS`
    /// - `SWAP_IMPACT_BLOCKED_BPS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 与 `from_env` 相同，但由调用方提供取值函数
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("SWAP_SLIPPAGE_BPS") {
            config.allowed_slippage_bps = parse_value("SWAP_SLIPPAGE_BPS", &raw)?;
        }
        if let Some(raw) = lookup("SWAP_NATIVE_GAS_RESERVE") {
            config.native_gas_reserve = parse_value("SWAP_NATIVE_GAS_RESERVE", &raw)?;
        }
        if let Some(raw) = lookup("SWAP_IMPACT_HIGH_BPS") {
            config.impact_thresholds.high_bps = parse_value("SWAP_IMPACT_HIGH_BPS", &raw)?;
        }
        if let Some(raw) = lookup("SWAP_IMPACT_BLOCKED_BPS") {
            config.impact_thresholds.blocked_bps = parse_value("SWAP_IMPACT_BLOCKED_BPS", &raw)?;
        }

        config.impact_thresholds.validate()?;
        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue { key, value: raw.to_string() })
}

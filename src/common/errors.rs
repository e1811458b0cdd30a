//! 错误分类
//!
//! 每类错误都能落到一个确定的状态并可重试，不会跨组件抛出。

use crate::trading::allowance::AllowanceStatus;

/// 用户可修正的输入错误，`Display` 即主按钮文案
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Select a token")]
    SelectToken,
    #[error("Enter an amount")]
    EnterAmount,
    #[error("Enter a valid recipient")]
    InvalidRecipient,
    #[error("Insufficient {symbol} balance")]
    InsufficientBalance { symbol: String },
}

/// 授权失败：状态回到 Required，可重试
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("authorize called while allowance is {status:?}")]
    NotRequired { status: AllowanceStatus },
    #[error("an authorization for this token and spender is already pending")]
    AlreadyPending,
    #[error("no wallet, token or spender to authorize against")]
    MissingContext,
    #[error("authorization rejected: {0}")]
    Rejected(String),
}

/// 执行失败：回到 ReadyToConfirm，错误信息保留到下一次尝试或关闭弹窗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("{0}")]
    Rejected(String),
    #[error("wrap failed: {0}")]
    WrapFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error(
        "impact thresholds must be strictly increasing (low={low}, medium={medium}, high={high}, blocked={blocked})"
    )]
    UnorderedThresholds { low: u32, medium: u32, high: u32, blocked: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("no route found for this trade")]
    RouteNotFound,
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("unsupported asset pair")]
    UnsupportedAsset,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

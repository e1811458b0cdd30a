//! 一次兑换尝试的状态
//!
//! 快照只由编排器写入；进入 Confirming 时冻结，之后的新报价不会覆盖它，
//! 只会打开 accept_changes_required 标记。

use crate::trading::quote::Quote;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub enum SwapAttempt {
    #[default]
    Idle,
    /// 确认弹窗已打开，等待用户接受
    Confirming { snapshot: Arc<Quote>, accept_changes_required: bool },
    /// 执行中
    Submitting { snapshot: Arc<Quote> },
    Settled { snapshot: Arc<Quote>, result_handle: String },
    /// 执行失败，错误信息保留到下一次尝试或关闭弹窗
    Failed { snapshot: Arc<Quote>, error: String },
}

impl SwapAttempt {
    pub fn snapshot(&self) -> Option<&Arc<Quote>> {
        match self {
            SwapAttempt::Idle => None,
            SwapAttempt::Confirming { snapshot, .. }
            | SwapAttempt::Submitting { snapshot }
            | SwapAttempt::Settled { snapshot, .. }
            | SwapAttempt::Failed { snapshot, .. } => Some(snapshot),
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SwapAttempt::Submitting { .. })
    }

    pub fn result_handle(&self) -> Option<&str> {
        match self {
            SwapAttempt::Settled { result_handle, .. } => Some(result_handle),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SwapAttempt::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn accept_changes_required(&self) -> bool {
        matches!(self, SwapAttempt::Confirming { accept_changes_required: true, .. })
    }
}

/// 确认弹窗的展示数据
#[derive(Debug, Clone, Default)]
pub struct ConfirmationView {
    pub open: bool,
    pub trade_snapshot: Option<Arc<Quote>>,
    /// 最新报价，用于和快照对比
    pub live_trade: Option<Arc<Quote>>,
    pub attempting: bool,
    pub error_message: Option<String>,
    pub result_handle: Option<String>,
    pub accept_changes_required: bool,
    /// 最近一次上报报价的到达时间（毫秒）
    pub quote_received_at: Option<u64>,
}

impl ConfirmationView {
    pub fn from_attempt(
        attempt: &SwapAttempt,
        live_trade: Option<Arc<Quote>>,
        quote_received_at: Option<u64>,
    ) -> Self {
        Self {
            open: !matches!(attempt, SwapAttempt::Idle),
            trade_snapshot: attempt.snapshot().cloned(),
            live_trade,
            attempting: attempt.is_submitting(),
            error_message: attempt.error_message().map(str::to_string),
            result_handle: attempt.result_handle().map(str::to_string),
            accept_changes_required: attempt.accept_changes_required(),
            quote_received_at,
        }
    }
}

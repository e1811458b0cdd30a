//! 报价延迟统计
//!
//! 每个报价周期（一次连续的 Loading → Syncing* → Valid）最多上报一次 `QuoteReceived`。
//! 周期由 `QuoteTelemetryWindow` 显式表示，避免重复上报。

use crate::trading::quote::{Quote, QuoteRequest, TradeStatus};
use crate::telemetry::TelemetryEvent;
use crate::utils::format_units;
use std::sync::Arc;
use tracing::debug;

/// 一个报价周期的计时窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteTelemetryWindow {
    /// 当前没有待上报的周期
    Closed,
    /// 等待第一个可用报价
    Pending {
        /// 本周期第一次进入 Loading 的时间；会话刚开始时可能没有
        fetch_started_at: Option<u64>,
    },
}

impl QuoteTelemetryWindow {
    pub fn pending_log(&self) -> bool {
        matches!(self, QuoteTelemetryWindow::Pending { .. })
    }

    pub fn fetch_started_at(&self) -> Option<u64> {
        match self {
            QuoteTelemetryWindow::Pending { fetch_started_at } => *fetch_started_at,
            QuoteTelemetryWindow::Closed => None,
        }
    }
}

#[derive(Debug)]
pub struct QuoteTracker {
    window: QuoteTelemetryWindow,
    /// 最近一次上报的报价到达时间
    last_received_at: Option<u64>,
}

impl Default for QuoteTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteTracker {
    /// 会话开始时窗口处于待上报状态，第一个报价即使没有经过 Loading 也会上报（耗时为空）
    pub fn new() -> Self {
        Self { window: QuoteTelemetryWindow::Pending { fetch_started_at: None }, last_received_at: None }
    }

    pub fn window(&self) -> QuoteTelemetryWindow {
        self.window
    }

    pub fn last_received_at(&self) -> Option<u64> {
        self.last_received_at
    }

    /// 处理一次报价状态更新
    ///
    /// `current_request` 是当前表单对应的请求；与报价的请求不一致说明报价已过期，不参与统计。
    pub fn observe(
        &mut self,
        status: TradeStatus,
        quote: Option<&Arc<Quote>>,
        current_request: Option<&QuoteRequest>,
        now_millis: u64,
    ) -> Option<TelemetryEvent> {
        let fresh_quote =
            quote.filter(|q| current_request.is_some_and(|request| q.request == *request));

        if let QuoteTelemetryWindow::Pending { fetch_started_at } = self.window {
            if status == TradeStatus::Valid {
                if let Some(quote) = fresh_quote {
                    let elapsed_ms = fetch_started_at.map(|start| now_millis.saturating_sub(start));
                    self.window = QuoteTelemetryWindow::Closed;
                    self.last_received_at = Some(now_millis);
                    debug!(quote_id = quote.id.0, ?elapsed_ms, "quote cycle closed");
                    return Some(quote_received(quote, elapsed_ms));
                }
            }
        }

        match status {
            TradeStatus::Loading => match self.window {
                QuoteTelemetryWindow::Closed => {
                    debug!(started_at = now_millis, "quote cycle opened");
                    self.window = QuoteTelemetryWindow::Pending { fetch_started_at: Some(now_millis) };
                },
                QuoteTelemetryWindow::Pending { fetch_started_at: None } => {
                    self.window = QuoteTelemetryWindow::Pending { fetch_started_at: Some(now_millis) };
                },
                // 用户连续输入：保留第一次请求的起点
                QuoteTelemetryWindow::Pending { fetch_started_at: Some(_) } => {},
            },
            TradeStatus::Idle if quote.is_none() => {
                if self.window.pending_log() {
                    debug!("inputs cleared, quote cycle abandoned");
                }
                self.window = QuoteTelemetryWindow::Closed;
            },
            _ => {},
        }

        None
    }
}

fn quote_received(quote: &Quote, elapsed_ms: Option<u64>) -> TelemetryEvent {
    TelemetryEvent::QuoteReceived {
        quote_id: quote.id.0,
        input_symbol: quote.input_token.symbol.clone(),
        output_symbol: quote.output_token.symbol.clone(),
        amount_in: format_units(quote.amount_in, quote.input_token.decimals),
        amount_out: format_units(quote.amount_out, quote.output_token.decimals),
        gas_use_estimate_usd: quote.gas_use_estimate_usd,
        elapsed_ms,
    }
}

//! 埋点事件
//!
//! 事件只在决策核心内部产生，由 `TelemetrySink` 转发到外部（分析服务、日志、测试断言）。

use crate::common::Address;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// 一个报价周期内第一次拿到可用报价
    QuoteReceived {
        quote_id: u64,
        input_symbol: String,
        output_symbol: String,
        amount_in: String,
        amount_out: String,
        gas_use_estimate_usd: Option<f64>,
        /// 从本周期第一次 Loading 起算；没有记录到起点时为 None
        elapsed_ms: Option<u64>,
    },
    AuthorizationSubmitted {
        token_symbol: String,
        token_address: Address,
        amount: u128,
    },
    SwapSubmitted {
        /// "Swap w/o Send" / "Swap w/o Send + recipient" / "Swap w/ Send"
        label: String,
        /// SwapRouter/<IN>/<OUT>/MH
        route: String,
        result_handle: String,
    },
    ConnectWalletClicked {
        received_swap_quote: bool,
    },
    /// 点击 Max，输入框填入可花费余额
    MaxInputApplied {
        token_symbol: String,
        amount: String,
    },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::QuoteReceived { .. } => "quote_received",
            TelemetryEvent::AuthorizationSubmitted { .. } => "authorization_submitted",
            TelemetryEvent::SwapSubmitted { .. } => "swap_submitted",
            TelemetryEvent::ConnectWalletClicked { .. } => "connect_wallet_clicked",
            TelemetryEvent::MaxInputApplied { .. } => "max_input_applied",
        }
    }

    /// 获取事件的 JSON 表示（用于日志和上报）
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            warn!("埋点事件序列化失败: {}", e);
            serde_json::json!({ "event": self.name() })
        })
    }
}

/// 埋点出口
///
/// `emit` 在状态锁之外调用，实现方不应阻塞。
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

pub type TelemetryRef = Arc<dyn TelemetrySink>;

/// 空实现
#[derive(Clone, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn emit(&self, _event: TelemetryEvent) {}
}

/// 写入 tracing 日志
#[derive(Clone, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn emit(&self, event: TelemetryEvent) {
        info!(target: "swap_flow_sdk::telemetry", event = event.name(), payload = %event.to_json());
    }
}

/// 事件流：通过 tokio 无界通道交给消费方
#[derive(Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<TelemetryEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TelemetryEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl TelemetrySink for ChannelSink {
    fn emit(&self, event: TelemetryEvent) {
        if let Err(e) = self.sender.send(event) {
            warn!("埋点通道已关闭，丢弃事件 {}", e.0.name());
        }
    }
}

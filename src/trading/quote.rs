//! 报价快照
//!
//! 上游输入（金额、币对、滑点）一变就整体替换，从不原地修改。每个新对象都有新的 `QuoteId`。

use crate::common::{Address, Field, Token};
use crate::utils::{Percent, add_slippage};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_QUOTE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuoteId(pub u64);

/// 路由服务当前的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TradeStatus {
    /// 没有请求（输入被清空）
    #[default]
    Idle,
    /// 首次请求中，还没有任何结果
    Loading,
    /// 已有旧结果，正在刷新
    Syncing,
    Valid,
    NoRoute,
}

impl TradeStatus {
    pub fn is_loading_or_syncing(self) -> bool {
        matches!(self, TradeStatus::Loading | TradeStatus::Syncing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

impl From<Field> for TradeType {
    fn from(field: Field) -> Self {
        match field {
            Field::Input => TradeType::ExactInput,
            Field::Output => TradeType::ExactOutput,
        }
    }
}

/// 报价对应的请求，用来识别过期报价
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub input_token: Address,
    pub output_token: Address,
    pub independent_field: Field,
    pub amount: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub request: QuoteRequest,
    pub input_token: Token,
    pub output_token: Token,
    pub trade_type: TradeType,
    pub amount_in: u128,
    pub amount_out: u128,
    /// 路由给出的价格影响
    pub price_impact: Option<Percent>,
    pub realized_lp_fee: Option<Percent>,
    pub gas_use_estimate_usd: Option<f64>,
}

impl Quote {
    pub fn new(
        request: QuoteRequest,
        input_token: Token,
        output_token: Token,
        amount_in: u128,
        amount_out: u128,
    ) -> Self {
        let trade_type = TradeType::from(request.independent_field);
        Self {
            id: QuoteId(NEXT_QUOTE_ID.fetch_add(1, Ordering::Relaxed)),
            request,
            input_token,
            output_token,
            trade_type,
            amount_in,
            amount_out,
            price_impact: None,
            realized_lp_fee: None,
            gas_use_estimate_usd: None,
        }
    }

    pub fn with_price_impact(mut self, impact: Percent) -> Self {
        self.price_impact = Some(impact);
        self
    }

    pub fn with_realized_lp_fee(mut self, fee: Percent) -> Self {
        self.realized_lp_fee = Some(fee);
        self
    }

    pub fn with_gas_estimate_usd(mut self, usd: f64) -> Self {
        self.gas_use_estimate_usd = Some(usd);
        self
    }

    /// 最多花费的输入数量：exact-out 时按滑点放大
    pub fn maximum_amount_in(&self, slippage_bps: u32) -> u128 {
        match self.trade_type {
            TradeType::ExactInput => self.amount_in,
            TradeType::ExactOutput => add_slippage(self.amount_in, slippage_bps),
        }
    }

    /// 与另一个报价是否有实质差异（需要用户重新确认）
    pub fn meaningfully_differs(&self, other: &Quote) -> bool {
        self.trade_type != other.trade_type
            || self.input_token.address != other.input_token.address
            || self.output_token.address != other.output_token.address
            || self.amount_in != other.amount_in
            || self.amount_out != other.amount_out
    }
}

//! 兑换表单与派生信息
//!
//! 表单只保存用户输入；金额解析、报价请求、输入校验都在 `derive` 里按需计算。

use crate::common::{Address, Field, InputError, Token, WrapType};
use crate::trading::quote::{Quote, QuoteRequest};
use crate::utils::{format_units, parse_units};

#[derive(Debug, Clone, Default)]
pub struct SwapForm {
    pub independent_field: Option<Field>,
    pub typed_value: String,
    /// 用户输入的收款地址原文；None 表示没有打开收款人输入
    pub recipient_input: Option<String>,
    /// 地址簿解析后的收款地址
    pub resolved_recipient: Option<Address>,
    pub input_currency: Option<Token>,
    pub output_currency: Option<Token>,
}

/// 输入与报价合并后的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedSwapInfo {
    /// 用户输入一侧的解析值
    pub parsed_amount: Option<u128>,
    pub input_amount: Option<u128>,
    pub output_amount: Option<u128>,
    /// 两侧币种都已选择且输入金额有效
    pub both_sides_specified: bool,
    pub input_error: Option<InputError>,
    pub current_request: Option<QuoteRequest>,
}

impl SwapForm {
    pub fn field(&self) -> Field {
        self.independent_field.unwrap_or(Field::Input)
    }

    pub fn currency(&self, field: Field) -> Option<&Token> {
        match field {
            Field::Input => self.input_currency.as_ref(),
            Field::Output => self.output_currency.as_ref(),
        }
    }

    pub fn type_input(&mut self, field: Field, value: impl Into<String>) {
        self.independent_field = Some(field);
        self.typed_value = value.into();
    }

    pub fn clear_input(&mut self) {
        self.typed_value.clear();
    }

    pub fn set_recipient(&mut self, input: Option<String>, resolved: Option<Address>) {
        self.recipient_input = input;
        self.resolved_recipient = resolved;
    }

    /// 当前输入对应的报价请求
    pub fn current_request(&self) -> Option<QuoteRequest> {
        let input = self.input_currency.as_ref()?;
        let output = self.output_currency.as_ref()?;
        let field = self.field();
        let amount = self.parsed_amount()?;
        Some(QuoteRequest {
            input_token: input.address.clone(),
            output_token: output.address.clone(),
            independent_field: field,
            amount,
        })
    }

    fn parsed_amount(&self) -> Option<u128> {
        let token = self.currency(self.field())?;
        parse_units(&self.typed_value, token.decimals)
    }

    /// 合并输入、报价和余额
    ///
    /// `input_balance` 为 None 表示余额还没加载，此时不做余额校验。
    pub fn derive(
        &self,
        wrap_type: WrapType,
        trade: Option<&Quote>,
        input_balance: Option<u128>,
        slippage_bps: u32,
    ) -> DerivedSwapInfo {
        let field = self.field();
        let parsed_amount = self.parsed_amount();
        let current_request = self.current_request();

        let (input_amount, output_amount) = if wrap_type != WrapType::NotApplicable {
            (parsed_amount, parsed_amount)
        } else {
            match field {
                Field::Input => (parsed_amount, trade.map(|q| q.amount_out)),
                Field::Output => (trade.map(|q| q.amount_in), parsed_amount),
            }
        };

        let both_sides_specified = self.input_currency.is_some()
            && self.output_currency.is_some()
            && parsed_amount.is_some();

        let input_error = if self.input_currency.is_none() || self.output_currency.is_none() {
            Some(InputError::SelectToken)
        } else if parsed_amount.is_none() {
            Some(InputError::EnterAmount)
        } else if self.recipient_input.is_some() && self.resolved_recipient.is_none() {
            Some(InputError::InvalidRecipient)
        } else {
            let max_in = match (wrap_type, trade) {
                (WrapType::NotApplicable, Some(q)) => Some(q.maximum_amount_in(slippage_bps)),
                (WrapType::NotApplicable, None) => None,
                _ => parsed_amount,
            };
            match (input_balance, max_in, self.input_currency.as_ref()) {
                (Some(balance), Some(max_in), Some(token)) if balance < max_in => {
                    Some(InputError::InsufficientBalance { symbol: token.symbol.clone() })
                },
                _ => None,
            }
        };

        DerivedSwapInfo {
            parsed_amount,
            input_amount,
            output_amount,
            both_sides_specified,
            input_error,
            current_request,
        }
    }

    /// 两侧显示的金额：输入侧原样显示，另一侧显示报价结果
    pub fn formatted_amounts(&self, derived: &DerivedSwapInfo) -> (String, String) {
        let format_side = |side: Field, amount: Option<u128>| -> String {
            if side == self.field() {
                return self.typed_value.clone();
            }
            match (amount, self.currency(side)) {
                (Some(amount), Some(token)) => format_units(amount, token.decimals),
                _ => String::new(),
            }
        };
        (
            format_side(Field::Input, derived.input_amount),
            format_side(Field::Output, derived.output_amount),
        )
    }
}

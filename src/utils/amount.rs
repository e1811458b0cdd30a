//! 金额换算工具
//!
//! 用户输入是十进制字符串，内部统一用最小单位的 `u128`。

use crate::constants::BPS_DENOMINATOR;

/// 把用户输入解析为最小单位
///
/// 空串、非法字符、小数位超过精度、或者值为 0 都返回 `None`。
pub fn parse_units(value: &str, decimals: u8) -> Option<u128> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > decimals as usize {
        return None;
    }

    let scale = 10u128.checked_pow(decimals as u32)?;
    let whole_units = if whole.is_empty() { 0 } else { whole.parse::<u128>().ok()? };
    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse::<u128>().ok()?
    };

    let amount = whole_units.checked_mul(scale)?.checked_add(fraction_units)?;
    if amount == 0 { None } else { Some(amount) }
}

/// 最小单位格式化为十进制字符串，去掉末尾的 0
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let whole = amount / scale;
    let fraction = amount % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// amount × (1 + bps/10000)，向上取整
pub fn add_slippage(amount: u128, slippage_bps: u32) -> u128 {
    let denominator = BPS_DENOMINATOR as u128;
    let numerator = denominator + slippage_bps as u128;
    match amount.checked_mul(numerator) {
        Some(product) => product.div_ceil(denominator),
        None => amount.saturating_add(amount / denominator * slippage_bps as u128),
    }
}

/// Max 按钮可花费的数量：原生币需要预留 gas
pub fn max_amount_spend(balance: u128, is_native: bool, gas_reserve: u128) -> Option<u128> {
    let spendable = if is_native { balance.saturating_sub(gas_reserve) } else { balance };
    (spendable > 0).then_some(spendable)
}

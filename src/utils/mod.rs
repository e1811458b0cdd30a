pub mod amount;
pub mod price_impact;

pub use amount::{add_slippage, format_units, max_amount_spend, parse_units};
pub use price_impact::{
    Percent, compute_fiat_value_price_impact, compute_realized_price_impact, larger_percent_value,
};

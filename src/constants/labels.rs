//! 主按钮文案

pub const UNSUPPORTED_ASSET: &str = "Unsupported Asset";
pub const CONNECT_WALLET: &str = "Connect Wallet";
pub const WRAP: &str = "Wrap";
pub const UNWRAP: &str = "Unwrap";
pub const INSUFFICIENT_LIQUIDITY: &str = "Insufficient liquidity for this trade.";
pub const APPROVAL_PENDING: &str = "Approval pending";
pub const SWAP: &str = "Swap";
pub const SWAP_ANYWAY: &str = "Swap Anyway";
pub const PRICE_IMPACT_TOO_HIGH: &str = "Price Impact Too High";

/// "Approve use of <TOKEN>"
pub fn approve_use_of(symbol: &str) -> String {
    format!("Approve use of {}", symbol)
}

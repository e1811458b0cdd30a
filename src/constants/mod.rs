pub mod impact;
pub mod labels;
pub mod tokens;
pub mod trade_platform;

pub use impact::*;
pub use tokens::*;

/// 成交事件 label 中的路由名
pub const SWAP_ROUTER: &str = "SwapRouter";
/// 成交事件 label 的后缀标记
pub const MULTI_HOP_TAG: &str = "MH";

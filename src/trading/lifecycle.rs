//! 外部协作方接口
//!
//! 决策核心本身不构造交易，执行、包装、授权和钱包连接都委托给这里的 trait。
//! 所有实现都通过 `Arc<dyn ...>` 共享，需要 `Send + Sync`。

use crate::common::{Address, AnyResult, FiatValues, WrapType};
use crate::trading::allowance::AllowanceRequest;
use crate::trading::quote::Quote;
use async_trait::async_trait;
use std::sync::Arc;

/// 一次兑换提交的参数
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// 确认时冻结的报价
    pub trade: Arc<Quote>,
    pub fiat_values: FiatValues,
    pub allowed_slippage_bps: u32,
    /// 授权时拿到的签名（permit），没有则为 None
    pub authorization: Option<String>,
    /// 收款地址；None 表示发给自己
    pub recipient: Option<Address>,
}

impl ExecutionRequest {
    /// 获取请求的 JSON 表示（用于日志）
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "quote_id": self.trade.id.0,
            "input": self.trade.input_token.symbol,
            "output": self.trade.output_token.symbol,
            "amount_in": self.trade.amount_in.to_string(),
            "amount_out": self.trade.amount_out.to_string(),
            "slippage_bps": self.allowed_slippage_bps,
            "has_authorization": self.authorization.is_some(),
            "recipient": self.recipient.as_ref().map(|r| r.to_string()),
        })
    }
}

/// 交易执行服务
///
/// 成功时返回交易句柄（哈希），失败时返回可展示给用户的错误。
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> AnyResult<String>;
}

/// 原生币包装 / 解包
#[async_trait]
pub trait WrapExecutor: Send + Sync {
    async fn execute_wrap(&self, wrap_type: WrapType, amount: Option<u128>) -> AnyResult<String>;
}

/// 代币授权
///
/// 返回 permit 签名（如果授权方式是签名而不是链上 approve）。
#[async_trait]
pub trait AllowanceProvider: Send + Sync {
    async fn approve_and_permit(&self, request: &AllowanceRequest) -> AnyResult<Option<String>>;
}

/// 钱包连接弹窗开关
pub trait WalletConnector: Send + Sync {
    fn toggle(&self);
}

pub type SwapExecutorRef = Arc<dyn SwapExecutor>;
pub type WrapExecutorRef = Arc<dyn WrapExecutor>;
pub type AllowanceProviderRef = Arc<dyn AllowanceProvider>;
pub type WalletConnectorRef = Arc<dyn WalletConnector>;

/// 编排器依赖的全部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub swap: SwapExecutorRef,
    pub wrap: WrapExecutorRef,
    pub allowance: AllowanceProviderRef,
    pub wallet: WalletConnectorRef,
}

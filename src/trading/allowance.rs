//! 代币授权协调
//!
//! 链上授权额度由外部数据流通过 `observe_allowance` 推进来；`authorize` 负责发起授权，
//! 同一 (token, spender) 同时只允许一个授权在途。

use crate::common::{Address, AuthorizationError, Token};
use crate::telemetry::{TelemetryEvent, TelemetryRef};
use crate::trading::lifecycle::AllowanceProviderRef;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AllowanceStatus {
    /// 还没有读到链上额度，或者当前网络没有 spender
    Unknown,
    /// 原生币，或者不需要花费
    NotRequired,
    Required,
    /// 授权在途
    Pending,
    Granted,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllowanceKey {
    pub owner: Address,
    pub token: Address,
    pub spender: Address,
}

impl AllowanceKey {
    pub fn new(owner: &Address, token: &Address, spender: &Address) -> Self {
        Self { owner: owner.clone(), token: token.clone(), spender: spender.clone() }
    }
}

/// 发起授权的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceRequest {
    pub owner: Address,
    pub token: Token,
    pub spender: Address,
    /// 需要的额度（最小单位）
    pub amount: u128,
}

impl AllowanceRequest {
    pub fn key(&self) -> AllowanceKey {
        AllowanceKey::new(&self.owner, &self.token.address, &self.spender)
    }
}

#[derive(Debug, Clone, Default)]
struct AllowanceEntry {
    /// 数据流报告的链上额度
    on_chain: Option<u128>,
    /// 本会话授权成功的额度，下一次链上观测到来前有效
    authorized: Option<u128>,
    /// 授权签名
    proof: Option<String>,
}

impl AllowanceEntry {
    fn effective(&self) -> Option<u128> {
        match (self.on_chain, self.authorized) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}

/// 在途授权标记，drop 时释放
struct PendingGuard<'a> {
    in_flight: &'a DashMap<(Address, Address), ()>,
    key: (Address, Address),
}

impl<'a> PendingGuard<'a> {
    fn acquire(
        in_flight: &'a DashMap<(Address, Address), ()>,
        token: &Address,
        spender: &Address,
    ) -> Result<Self, AuthorizationError> {
        let key = (token.clone(), spender.clone());
        match in_flight.entry(key.clone()) {
            Entry::Occupied(_) => Err(AuthorizationError::AlreadyPending),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(Self { in_flight, key })
            },
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

pub struct AllowanceCoordinator {
    provider: AllowanceProviderRef,
    telemetry: TelemetryRef,
    entries: DashMap<AllowanceKey, AllowanceEntry>,
    in_flight: DashMap<(Address, Address), ()>,
}

impl AllowanceCoordinator {
    pub fn new(provider: AllowanceProviderRef, telemetry: TelemetryRef) -> Self {
        Self { provider, telemetry, entries: DashMap::new(), in_flight: DashMap::new() }
    }

    /// 数据流推送的链上额度
    ///
    /// 最新观测覆盖本会话的授权记录：成交后额度被花掉，状态要重新回到 Required。
    pub fn observe_allowance(&self, owner: &Address, token: &Address, spender: &Address, amount: u128) {
        let key = AllowanceKey::new(owner, token, spender);
        let mut entry = self.entries.entry(key).or_default();
        entry.on_chain = Some(amount);
        if entry.authorized.take().is_some() {
            entry.proof = None;
            debug!(token = %token, spender = %spender, amount, "session grant superseded by on-chain allowance");
        }
    }

    /// 计算当前授权状态
    ///
    /// `required` 为 None 表示还不知道要花多少（没有报价）。
    pub fn current_status(
        &self,
        owner: &Address,
        token: &Token,
        required: Option<u128>,
        spender: Option<&Address>,
    ) -> AllowanceStatus {
        if token.is_native || required == Some(0) {
            return AllowanceStatus::NotRequired;
        }
        let (Some(spender), Some(required)) = (spender, required) else {
            return AllowanceStatus::Unknown;
        };
        if self.in_flight.contains_key(&(token.address.clone(), spender.clone())) {
            return AllowanceStatus::Pending;
        }

        let key = AllowanceKey::new(owner, &token.address, spender);
        match self.entries.get(&key).and_then(|entry| entry.effective()) {
            None => AllowanceStatus::Unknown,
            Some(allowance) if allowance >= required => AllowanceStatus::Granted,
            Some(_) => AllowanceStatus::Required,
        }
    }

    /// 授权成功时拿到的签名
    pub fn authorization(&self, key: &AllowanceKey) -> Option<String> {
        self.entries.get(key).and_then(|entry| entry.proof.clone())
    }

    /// 发起授权
    ///
    /// 只有状态为 Required 时才能调用；失败后状态回到 Required，可以重试。
    pub async fn authorize(&self, request: &AllowanceRequest) -> Result<Option<String>, AuthorizationError> {
        let status = self.current_status(
            &request.owner,
            &request.token,
            Some(request.amount),
            Some(&request.spender),
        );
        match status {
            AllowanceStatus::Required => {},
            AllowanceStatus::Pending => return Err(AuthorizationError::AlreadyPending),
            other => return Err(AuthorizationError::NotRequired { status: other }),
        }

        let _guard = PendingGuard::acquire(&self.in_flight, &request.token.address, &request.spender)?;
        debug!(token = %request.token.symbol, spender = %request.spender, amount = request.amount, "authorization started");

        match self.provider.approve_and_permit(request).await {
            Ok(proof) => {
                {
                    let mut entry = self.entries.entry(request.key()).or_default();
                    entry.authorized = Some(request.amount);
                    if proof.is_some() {
                        entry.proof = proof.clone();
                    }
                }
                info!(token = %request.token.symbol, amount = request.amount, "authorization granted");
                self.telemetry.emit(TelemetryEvent::AuthorizationSubmitted {
                    token_symbol: request.token.symbol.clone(),
                    token_address: request.token.address.clone(),
                    amount: request.amount,
                });
                Ok(proof)
            },
            Err(e) => {
                error!("授权失败 {}: {:#}", request.token.symbol, e);
                Err(AuthorizationError::Rejected(e.to_string()))
            },
        }
    }
}

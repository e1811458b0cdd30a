pub mod action;
pub mod allowance;
pub mod attempt;
pub mod form;
pub mod impact;
pub mod lifecycle;
pub mod orchestrator;
pub mod quote;
pub mod quote_tracker;

pub use action::{ActionIntent, ActionOutcome, PrimaryAction, SwapStage};
pub use allowance::{AllowanceCoordinator, AllowanceKey, AllowanceRequest, AllowanceStatus};
pub use attempt::{ConfirmationView, SwapAttempt};
pub use form::{DerivedSwapInfo, SwapForm};
pub use impact::{ImpactAssessment, ImpactGate, Severity};
pub use lifecycle::{
    AllowanceProvider, AllowanceProviderRef, Collaborators, ExecutionRequest, SwapExecutor,
    SwapExecutorRef, WalletConnector, WalletConnectorRef, WrapExecutor, WrapExecutorRef,
};
pub use orchestrator::{Evaluation, SwapOrchestrator};
pub use quote::{Quote, QuoteId, QuoteRequest, TradeStatus, TradeType};
pub use quote_tracker::{QuoteTelemetryWindow, QuoteTracker};

pub mod common;
pub mod constants;
pub mod telemetry;
pub mod trading;
pub mod utils;

pub use crate::common::{
    Address, AnyResult, AuthorizationError, Clock, ClockRef, ConfigError, ExecutionError,
    FiatValues, Field, ImpactThresholds, InputError, ManualClock, SwapConfig, SwapError, Token,
    WrapType, system_clock,
};
pub use crate::telemetry::{
    ChannelSink, NoopSink, TelemetryEvent, TelemetryRef, TelemetrySink, TracingSink,
};
pub use crate::trading::{
    ActionIntent, ActionOutcome, AllowanceCoordinator, AllowanceProvider, AllowanceRequest,
    AllowanceStatus, Collaborators, ConfirmationView, ExecutionRequest, ImpactAssessment,
    ImpactGate, PrimaryAction, Quote, QuoteRequest, QuoteTracker, Severity, SwapExecutor,
    SwapOrchestrator, SwapStage, TradeStatus, WalletConnector, WrapExecutor,
};

pub mod clock;
pub mod errors;
pub mod types;

pub use clock::{Clock, ClockRef, ManualClock, Stopwatch, SystemClock, system_clock};
pub use errors::{AuthorizationError, ConfigError, ExecutionError, InputError, SwapError};
pub use types::*;

//! 计时模块
//!
//! 报价延迟统计依赖时间戳；生产环境用 `SystemClock`，测试用 `ManualClock` 手动推进。

use once_cell::sync::Lazy;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// 时间源
pub trait Clock: Send + Sync {
    /// 当前时间戳（毫秒）
    fn now_millis(&self) -> u64;

    /// 计算从 `start_millis` 到现在的耗时（毫秒）
    fn elapsed_millis(&self, start_millis: u64) -> u64 {
        self.now_millis().saturating_sub(start_millis)
    }
}

pub type ClockRef = Arc<dyn Clock>;

/// 单调时钟：启动时记录一次墙上时间，之后只按 `Instant` 递增
pub struct SystemClock {
    base_instant: Instant,
    base_epoch_millis: u64,
}

impl SystemClock {
    fn new() -> Self {
        let base_epoch_millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        Self { base_instant: Instant::now(), base_epoch_millis }
    }
}

impl Clock for SystemClock {
    #[inline(always)]
    fn now_millis(&self) -> u64 {
        let elapsed = u64::try_from(self.base_instant.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.base_epoch_millis.saturating_add(elapsed)
    }
}

/// 全局系统时钟
static SYSTEM_CLOCK: Lazy<Arc<SystemClock>> = Lazy::new(|| Arc::new(SystemClock::new()));

pub fn system_clock() -> ClockRef {
    SYSTEM_CLOCK.clone()
}

/// 手动推进的时钟
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self { now: AtomicU64::new(start_millis) }
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::AcqRel);
    }

    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

/// 计时器句柄 - 用于测量异步调用耗时
pub struct Stopwatch {
    clock: ClockRef,
    start_millis: u64,
    label: &'static str,
}

impl Stopwatch {
    pub fn start(clock: ClockRef, label: &'static str) -> Self {
        let start_millis = clock.now_millis();
        Self { clock, start_millis, label }
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.clock.elapsed_millis(self.start_millis)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

//! Simulated monotonic clock.
//!
//! Two flavours share one type:
//! - **manual**: time only moves through [`SimClock::advance`], plus an
//!   optional per-call auto step applied by [`Clock::now`];
//! - **wall**: anchored at construction and backed by `Instant`, for the
//!   host-run binary.
//!
//! Clones share the same time base. Simulated parts read it through
//! [`SimClock::peek`], which never applies the auto step, so only the
//! control unit's own `now()` calls drive auto-advancing time.

use mixmate_common::hal::Clock;
use mixmate_common::time::MonoTime;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug)]
struct ClockInner {
    /// Wall anchor. `None` for manual clocks.
    origin: Option<Instant>,
    /// Manual time, or offset added to wall time [ms].
    offset_ms: AtomicU64,
    /// Added on every `Clock::now` call [ms].
    auto_step_ms: AtomicU64,
}

/// Shared simulated clock.
#[derive(Debug, Clone)]
pub struct SimClock {
    inner: Arc<ClockInner>,
}

impl SimClock {
    /// Manual clock starting at `MonoTime::ZERO`.
    pub fn manual() -> Self {
        Self::with_origin(None)
    }

    /// Clock following real elapsed time since this call.
    pub fn wall() -> Self {
        Self::with_origin(Some(Instant::now()))
    }

    fn with_origin(origin: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(ClockInner {
                origin,
                offset_ms: AtomicU64::new(0),
                auto_step_ms: AtomicU64::new(0),
            }),
        }
    }

    /// Move time forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.inner.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Advance by `ms` on every `Clock::now` call. Zero disables.
    ///
    /// Lets blocking loops that poll the clock make progress in tests.
    pub fn set_auto_step(&self, ms: u64) {
        self.inner.auto_step_ms.store(ms, Ordering::SeqCst);
    }

    /// Current time without applying the auto step.
    pub fn peek(&self) -> MonoTime {
        let wall = self
            .inner
            .origin
            .map(|o| u64::try_from(o.elapsed().as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        MonoTime::from_millis(wall.saturating_add(self.inner.offset_ms.load(Ordering::SeqCst)))
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::manual()
    }
}

impl Clock for SimClock {
    fn now(&self) -> MonoTime {
        let step = self.inner.auto_step_ms.load(Ordering::SeqCst);
        if step > 0 {
            self.inner.offset_ms.fetch_add(step, Ordering::SeqCst);
        }
        self.peek()
    }
}

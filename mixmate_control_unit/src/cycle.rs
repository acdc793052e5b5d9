//! Dispatch loop pacing, statistics and RT setup.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` - lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` - pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)` - RT priority.
//!
//! Every step is a no-op without the `rt` feature.
//!
//! ## Pacing
//! With `rt`, ticks wake on absolute `CLOCK_MONOTONIC` deadlines via
//! `clock_nanosleep(TIMER_ABSTIME)`. Otherwise the pacer sleeps for whatever
//! is left of the tick interval. Overruns are counted, never fatal: a Home
//! command legitimately blocks one tick for the whole search.

use std::time::{Duration, Instant};
use thiserror::Error;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum tick duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum tick duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u128,
    /// Ticks that took longer than the interval.
    pub overruns: u64,
}

impl CycleStats {
    /// Zeroed stats.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record one tick. `budget` of zero disables overrun counting.
    #[inline]
    pub fn record(&mut self, duration: Duration, budget: Duration) {
        let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.cycle_count += 1;
        self.last_cycle_ns = ns;
        self.min_cycle_ns = self.min_cycle_ns.min(ns);
        self.max_cycle_ns = self.max_cycle_ns.max(ns);
        self.sum_cycle_ns += u128::from(ns);
        if !budget.is_zero() && duration > budget {
            self.overruns += 1;
        }
    }

    /// Average tick time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            (self.sum_cycle_ns / u128::from(self.cycle_count)) as u64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors during RT setup or pacing.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
}

// ─── RT Setup ───────────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the dispatch thread never faults on it.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param for the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup for the calling (dispatch) thread.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Pacer ──────────────────────────────────────────────────────────

/// Tick pacer for the dispatch loop.
#[derive(Debug)]
pub struct TickPacer {
    interval: Duration,
    tick_start: Instant,
    #[cfg(feature = "rt")]
    next_wake: Option<nix::sys::time::TimeSpec>,
}

impl TickPacer {
    /// Pacer for `interval`. Zero never sleeps.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            tick_start: Instant::now(),
            #[cfg(feature = "rt")]
            next_wake: None,
        }
    }

    /// Configured interval.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the start of a tick.
    #[inline]
    pub fn begin(&mut self) {
        self.tick_start = Instant::now();
    }

    /// Mark the end of a tick, sleep until the next one, return the tick's
    /// busy duration.
    pub fn finish(&mut self) -> Duration {
        let elapsed = self.tick_start.elapsed();
        if !self.interval.is_zero() {
            self.wait(elapsed);
        }
        elapsed
    }

    #[cfg(not(feature = "rt"))]
    fn wait(&mut self, elapsed: Duration) {
        if let Some(remaining) = self.interval.checked_sub(elapsed) {
            std::thread::sleep(remaining);
        }
    }

    #[cfg(feature = "rt")]
    fn wait(&mut self, elapsed: Duration) {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let interval_ns = self.interval.as_nanos() as i64;
        let base = match self.next_wake {
            Some(ts) => ts,
            None => match clock_gettime(clock) {
                Ok(now) => now,
                Err(_) => {
                    if let Some(remaining) = self.interval.checked_sub(elapsed) {
                        std::thread::sleep(remaining);
                    }
                    return;
                }
            },
        };
        let mut next = timespec_add_ns(base, interval_ns);
        // After an overrun (e.g. homing) re-anchor instead of bursting.
        if let Ok(now) = clock_gettime(clock) {
            if timespec_diff_ns(&next, &now) < 0 {
                next = timespec_add_ns(now, interval_ns);
            }
        }
        self.next_wake = Some(next);
        let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next);
    }
}

/// Add nanoseconds to a TimeSpec, normalizing.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let total = ts.tv_nsec() + ns;
    let secs = ts.tv_sec() + total.div_euclid(1_000_000_000);
    let nanos = total.rem_euclid(1_000_000_000);
    TimeSpec::new(secs, nanos)
}

/// Difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────

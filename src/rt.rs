//! Real-time setup and drift-free cycle pacing for the attitude core's
//! 200 Hz hot loop (spec.md §5), grounded in the teacher's
//! `evo_control_unit::cycle` RT setup sequence (`mlockall` →
//! `sched_setaffinity` → `sched_setscheduler(SCHED_FIFO)`) and its
//! `clock_nanosleep(TIMER_ABSTIME)` pacing. Every other cooperative task
//! in this crate runs far below 200 Hz and paces itself with plain
//! `thread::sleep` instead; only the interrupt-rate core needs
//! drift-free absolute-time sleep.

use std::time::Duration;

use thiserror::Error;

/// Errors from the real-time setup sequence. Startup-only; surfaced
/// through [`crate::error::CoreError`] and never produced mid-flight.
#[derive(Debug, Error)]
pub enum RtSetupError {
    #[error("mlockall failed: {0}")]
    Mlockall(String),
    #[error("sched_setaffinity failed: {0}")]
    Affinity(String),
    #[error("sched_setscheduler failed: {0}")]
    Scheduler(String),
}

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), RtSetupError> {
    use nix::sys::mman::{mlockall, MlockallFlags};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| RtSetupError::Mlockall(e.to_string()))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), RtSetupError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), RtSetupError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset.set(cpu).map_err(|e| RtSetupError::Affinity(e.to_string()))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset).map_err(|e| RtSetupError::Affinity(e.to_string()))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), RtSetupError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), RtSetupError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        return Err(RtSetupError::Scheduler(std::io::Error::last_os_error().to_string()));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), RtSetupError> {
    Ok(())
}

/// Lock pages, pin to `cpu_core`, and raise to `SCHED_FIFO` at
/// `priority`. No-ops with the default (non-`rt`) feature set, matching
/// the teacher's simulation-mode fallback.
pub fn rt_setup(cpu_core: usize, priority: i32) -> Result<(), RtSetupError> {
    rt_mlockall()?;
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(priority)?;
    Ok(())
}

/// Drift-free periodic pacer for the attitude core's 200 Hz loop
/// (`control::constants::DT` = 5 ms). Uses
/// `clock_nanosleep(TIMER_ABSTIME)` on `CLOCK_MONOTONIC` under the `rt`
/// feature; falls back to sleeping the remaining budget against
/// `Instant::now()` otherwise.
pub struct CyclePacer {
    period: Duration,
    #[cfg(feature = "rt")]
    next_wake: nix::sys::time::TimeSpec,
    #[cfg(not(feature = "rt"))]
    next_wake: std::time::Instant,
}

impl CyclePacer {
    pub fn new(period: Duration) -> Self {
        #[cfg(feature = "rt")]
        {
            let next_wake = nix::time::clock_gettime(nix::time::ClockId::CLOCK_MONOTONIC)
                .expect("CLOCK_MONOTONIC must be available");
            Self { period, next_wake }
        }
        #[cfg(not(feature = "rt"))]
        {
            Self {
                period,
                next_wake: std::time::Instant::now(),
            }
        }
    }

    /// Block until the next cycle boundary.
    pub fn tick(&mut self) {
        #[cfg(feature = "rt")]
        {
            use nix::sys::time::TimeSpec;
            let period_ns = self.period.as_nanos() as i64;
            let mut secs = self.next_wake.tv_sec();
            let mut nanos = self.next_wake.tv_nsec() + period_ns;
            while nanos >= 1_000_000_000 {
                secs += 1;
                nanos -= 1_000_000_000;
            }
            self.next_wake = TimeSpec::new(secs, nanos);
            let _ = nix::time::clock_nanosleep(
                nix::time::ClockId::CLOCK_MONOTONIC,
                nix::time::ClockNanosleepFlags::TIMER_ABSTIME,
                &self.next_wake,
            );
        }
        #[cfg(not(feature = "rt"))]
        {
            self.next_wake += self.period;
            let now = std::time::Instant::now();
            if self.next_wake > now {
                std::thread::sleep(self.next_wake - now);
            } else {
                self.next_wake = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rt_setup_is_a_noop_without_the_rt_feature() {
        #[cfg(not(feature = "rt"))]
        assert!(rt_setup(0, 80).is_ok());
    }

    #[test]
    fn pacer_tick_does_not_panic() {
        let mut pacer = CyclePacer::new(Duration::from_millis(1));
        pacer.tick();
        pacer.tick();
    }
}

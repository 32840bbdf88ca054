//! Ambient logging plumbing (spec.md §6 Log file, §7): a bounded, drop-
//! oldest-on-overflow queue the attitude core enqueues into without
//! blocking, a writer thread that drains it to a CSV-equivalent file, the
//! `tracing` subscriber setup shared by every binary entry point, and the
//! 5 Hz console printer (§4.7).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use heapless::Deque;
use parking_lot::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::control::CycleLog;
use crate::lifecycle::Lifecycle;
use crate::state::{CoreMode, SharedState};

/// Fixed capacity of the log queue (spec.md §5: "fixed-capacity, drops
/// oldest on overflow"). A `heapless::Deque` makes that literal — there is
/// no backing `Vec` to reallocate, unlike a capacity merely *tracked*
/// against a growable collection.
pub const LOG_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const CSV_HEADER: &str =
    "loop_count,roll,pitch,yaw,d_roll,d_pitch,d_yaw,u0,u1,u2,u3,esc0,esc1,esc2,esc3,battery_voltage\n";

/// A fixed-capacity, drop-oldest queue shared between the attitude core
/// (pushes, never blocks) and the log-writer thread (drains). Matches
/// spec.md §5's "fixed-capacity, drops oldest on overflow" log-sink
/// policy using the teacher's `heapless` fixed-size-collection style,
/// wrapped in the teacher's `parking_lot::Mutex` for the cross-thread
/// hand-off. `N` defaults to [`LOG_QUEUE_CAPACITY`]; tests use a smaller
/// `N` to exercise overflow without pushing a thousand records.
#[derive(Clone)]
pub struct LogQueue<const N: usize = LOG_QUEUE_CAPACITY> {
    inner: Arc<Mutex<Deque<CycleLog, N>>>,
}

impl<const N: usize> LogQueue<N> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Deque::new())),
        }
    }

    /// Enqueue one cycle's log record. Never blocks and never allocates:
    /// if the queue is already at capacity, the oldest record is dropped
    /// to make room.
    pub fn push(&self, entry: CycleLog) {
        let mut queue = self.inner.lock();
        if queue.is_full() {
            queue.pop_front();
        }
        let _ = queue.push_back(entry);
    }

    /// Drain every record currently queued, oldest first.
    pub fn drain_all(&self) -> Vec<CycleLog> {
        let mut queue = self.inner.lock();
        std::iter::from_fn(|| queue.pop_front()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for LogQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn write_row(file: &mut File, path: &Path, entry: &CycleLog) -> Result<(), LogError> {
    writeln!(
        file,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        entry.loop_count,
        entry.roll,
        entry.pitch,
        entry.yaw,
        entry.d_roll,
        entry.d_pitch,
        entry.d_yaw,
        entry.u[0],
        entry.u[1],
        entry.u[2],
        entry.u[3],
        entry.esc[0],
        entry.esc[1],
        entry.esc[2],
        entry.esc[3],
        entry.battery_voltage,
    )
    .map_err(|source| LogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

const DRAIN_PERIOD: Duration = Duration::from_millis(50);

/// Drains `queue` to `path` (CSV, header written once) until `lifecycle`
/// signals exit, then performs one final drain so nothing queued at
/// shutdown is lost.
pub fn run_writer<const N: usize>(path: &Path, queue: LogQueue<N>, lifecycle: Lifecycle) -> Result<(), LogError> {
    let mut file = File::create(path).map_err(|source| LogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(CSV_HEADER.as_bytes())
        .map_err(|source| LogError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    while !lifecycle.is_exiting() {
        for entry in queue.drain_all() {
            write_row(&mut file, path, &entry)?;
        }
        thread::sleep(DRAIN_PERIOD);
    }
    for entry in queue.drain_all() {
        write_row(&mut file, path, &entry)?;
    }
    Ok(())
}

const PRINT_PERIOD: Duration = Duration::from_millis(200);

/// One-line telemetry printer (§4.7), 5 Hz. Quiet mode (`-q`) simply never
/// spawns this task, matching the original's `options.quiet` gate.
pub fn run_printer(shared: SharedState, lifecycle: Lifecycle) {
    while !lifecycle.is_exiting() {
        let measured = shared.measured();
        let mode = shared.setpoint().mode();
        println!(
            "roll {:+.2} pitch {:+.2} yaw {:+.2} armed={}",
            measured.roll(),
            measured.pitch(),
            measured.yaw(),
            mode != CoreMode::Disarmed,
        );
        thread::sleep(PRINT_PERIOD);
    }
}

/// Installs the process-wide `tracing` subscriber. `verbose` raises the
/// default filter from `info` to `debug`; `RUST_LOG` always takes
/// precedence when set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

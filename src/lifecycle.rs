//! Process-wide lifecycle signal (spec.md §4.7, §5) and the pause-button
//! watcher that drives it.
//!
//! Every cooperatively scheduled task polls [`Lifecycle::is_exiting`] on its
//! own sleep cadence and returns when it sees `Exiting`; the attitude core
//! does not poll it at all (§5: the interrupt task never suspends and is
//! torn down by simply dropping its driving thread).

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::hal::PauseButton;
use crate::state::{CoreMode, SharedState};

/// Lifecycle states a process-wide value can be in.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Starting = 0,
    Running = 1,
    Exiting = 2,
}

impl RunState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => RunState::Running,
            2 => RunState::Exiting,
            _ => RunState::Starting,
        }
    }
}

/// A cloneable handle onto the process-wide run state.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: Arc<AtomicU8>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(RunState::Starting as u8)),
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn set_running(&self) {
        self.state.store(RunState::Running as u8, Ordering::SeqCst);
    }

    pub fn set_exiting(&self) {
        self.state.store(RunState::Exiting as u8, Ordering::SeqCst);
    }

    pub fn is_exiting(&self) -> bool {
        self.state() == RunState::Exiting
    }
}

/// Minimum hold time before a pause-button press is treated as "exit",
/// rather than a momentary disarm — the original's `i < 10` poll loop at
/// `usleep(100000)` (10 polls of 100 ms = 1.0 s).
const LONG_PRESS_POLLS: u32 = 10;
const POLL_PERIOD: Duration = Duration::from_millis(100);

/// A rising edge on the pause button, published to anyone watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
}

/// Edge-detects the pause button and republishes rising edges on an mpsc
/// channel (spec.md §9 redesign note #2: drivers publish events, tasks
/// receive them), decoupling "is the button down right now" from "what a
/// press means".
pub struct PauseButtonWatcher {
    sender: std::sync::mpsc::Sender<ButtonEvent>,
    was_pressed: bool,
}

impl PauseButtonWatcher {
    pub fn new() -> (Self, std::sync::mpsc::Receiver<ButtonEvent>) {
        let (sender, receiver) = std::sync::mpsc::channel();
        (
            Self {
                sender,
                was_pressed: false,
            },
            receiver,
        )
    }

    /// Poll the driver once; publishes a [`ButtonEvent::Pressed`] on the
    /// channel the first time a press is observed.
    fn poll<B: PauseButton>(&mut self, button: &mut B) -> bool {
        let pressed = button.is_pressed();
        let rising_edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if rising_edge {
            // Receiver may have been dropped (process shutting down); a
            // send failure here is not actionable.
            let _ = self.sender.send(ButtonEvent::Pressed);
        }
        pressed
    }
}

/// Cooperative task: a short press disarms; a press held for
/// [`LONG_PRESS_POLLS`] × [`POLL_PERIOD`] transitions the process to
/// [`RunState::Exiting`] (spec.md §4.7, original `on_pause_press`).
pub fn run<B: PauseButton>(mut button: B, shared: SharedState, lifecycle: Lifecycle) {
    let (mut watcher, events) = PauseButtonWatcher::new();

    while !lifecycle.is_exiting() {
        if watcher.poll(&mut button) && events.try_recv().is_ok() {
            shared.setpoint().disarm();
            let mut held_polls = 0;
            while held_polls < LONG_PRESS_POLLS {
                thread::sleep(POLL_PERIOD);
                if lifecycle.is_exiting() {
                    return;
                }
                if !button.is_pressed() {
                    break;
                }
                held_polls += 1;
            }
            if held_polls >= LONG_PRESS_POLLS {
                tracing::info!("pause button held, exiting");
                lifecycle.set_exiting();
                return;
            }
        }
        thread::sleep(POLL_PERIOD);
    }
}

/// Returns whether `mode` represents a state the process should keep
/// running in; kept here (rather than in `state`) since it only matters to
/// lifecycle-adjacent tasks such as the printer.
pub fn is_armed(mode: CoreMode) -> bool {
    mode != CoreMode::Disarmed
}

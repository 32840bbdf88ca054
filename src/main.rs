//! Binary entry point: wires configuration, shared state, and every
//! cooperative task together and drives the attitude core's 200 Hz loop.
//!
//! No real IMU/PWM/receiver/LED/pause-button driver ships in this crate
//! (spec.md §1: those are out-of-scope collaborators) so this binary runs
//! against the in-memory [`flight_core::hal::sim`] backends. A real
//! deployment swaps those four lines for hardware drivers implementing
//! the same traits; nothing else in `main` changes.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use nix::sys::signal::{self, SigHandler, Signal};
use parking_lot::{Mutex, RwLock};

use flight_core::cli::Args;
use flight_core::control::constants::DT;
use flight_core::control::{AttitudeCore, ImuTrims};
use flight_core::hal::sim::{SimImu, SimLeds, SimPauseButton, SimPwm, SimReceiver};
use flight_core::hal::{ImuSample, PwmDriver};
use flight_core::logging::{self, LogQueue};
use flight_core::state::SharedState;
use flight_core::{command, led, lifecycle, radio, rt, safety, telemetry, Config, CoreError};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install `SIGINT`/`SIGTERM` handlers that set a flag a watcher thread
/// polls, since a signal handler itself cannot safely touch the
/// `Lifecycle` atomic's surrounding machinery.
fn install_signal_handlers() -> Result<(), CoreError> {
    // SAFETY: the handler only stores to a `static AtomicBool`, which is
    // signal-safe.
    unsafe {
        signal::signal(Signal::SIGINT, SigHandler::Handler(handle_interrupt))
            .map_err(|e| CoreError::Args(format!("failed to install SIGINT handler: {e}")))?;
        signal::signal(Signal::SIGTERM, SigHandler::Handler(handle_interrupt))
            .map_err(|e| CoreError::Args(format!("failed to install SIGTERM handler: {e}")))?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init_tracing(args.verbose);

    if let Err(err) = run(args) {
        tracing::error!(%err, "flight-core startup failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CoreError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "flight-core starting");

    install_signal_handlers()?;

    let config_path: PathBuf = args.config;
    let config = Config::load_or_create(&config_path)?;
    let ground_station_ip = config.ground_station_ip.clone();
    let config = Arc::new(RwLock::new(config));

    let shared = SharedState::new();
    let lifecycle = lifecycle::Lifecycle::new();
    lifecycle.set_running();

    let mut pwm = SimPwm::default();
    pwm.init().map_err(CoreError::PwmInit)?;
    let pwm = Arc::new(Mutex::new(pwm));

    let log_queue = args.logging.then(LogQueue::new);

    let mut handles = Vec::new();

    handles.push(thread::spawn({
        let shared = shared.clone();
        let lifecycle = lifecycle.clone();
        move || safety::run(shared, lifecycle)
    }));

    handles.push(thread::spawn({
        let shared = shared.clone();
        let lifecycle = lifecycle.clone();
        let receiver = SimReceiver::default();
        move || radio::run(receiver, shared, lifecycle)
    }));

    handles.push(thread::spawn({
        let shared = shared.clone();
        let lifecycle = lifecycle.clone();
        let leds = SimLeds::default();
        move || led::run(leds, shared, lifecycle)
    }));

    handles.push(thread::spawn({
        let shared = shared.clone();
        let lifecycle = lifecycle.clone();
        let button = SimPauseButton::default();
        move || lifecycle::run(button, shared, lifecycle)
    }));

    handles.push(thread::spawn({
        let shared = shared.clone();
        let lifecycle = lifecycle.clone();
        let config = config.clone();
        let config_path = config_path.clone();
        let pwm = pwm.clone();
        move || command::run(shared, lifecycle, config, config_path, pwm)
    }));

    if args.mavlink {
        handles.push(thread::spawn({
            let shared = shared.clone();
            let lifecycle = lifecycle.clone();
            move || {
                if let Err(err) = telemetry::run(shared, lifecycle, &ground_station_ip) {
                    tracing::warn!(%err, "telemetry uplink disabled");
                }
            }
        }));
    }

    if let Some(queue) = log_queue.clone() {
        let lifecycle = lifecycle.clone();
        handles.push(thread::spawn(move || {
            let path = PathBuf::from("flight.csv");
            if let Err(err) = logging::run_writer(&path, queue, lifecycle) {
                tracing::warn!(%err, "log writer stopped");
            }
        }));
    }

    if !args.quiet {
        handles.push(thread::spawn({
            let shared = shared.clone();
            let lifecycle = lifecycle.clone();
            move || logging::run_printer(shared, lifecycle)
        }));
    }

    handles.push(thread::spawn({
        let shared = shared.clone();
        let lifecycle = lifecycle.clone();
        let config = config.clone();
        let pwm = pwm.clone();
        move || run_attitude_core(shared, lifecycle, config, pwm, log_queue)
    }));

    while !lifecycle.is_exiting() {
        if INTERRUPTED.load(Ordering::SeqCst) {
            tracing::info!("interrupt received, shutting down");
            lifecycle.set_exiting();
            break;
        }
        thread::sleep(Duration::from_millis(100));
    }

    for handle in handles {
        let _ = handle.join();
    }

    tracing::info!("flight-core shutdown complete");
    Ok(())
}

/// Drives the attitude core at 200 Hz using [`rt::CyclePacer`]. Runs
/// against a level-attitude, zero-rate [`SimImu`] sample repeated forever
/// — a stand-in for a real IMU driver, which this crate does not ship.
fn run_attitude_core(
    shared: SharedState,
    lifecycle: lifecycle::Lifecycle,
    config: Arc<RwLock<Config>>,
    pwm: Arc<Mutex<SimPwm>>,
    log_queue: Option<LogQueue>,
) {
    if let Err(err) = rt::rt_setup(0, 80) {
        tracing::warn!(%err, "real-time setup failed, continuing at default scheduling priority");
    }

    let mut imu = SimImu::with_samples(vec![ImuSample::default()]);
    let mut core = {
        let config = config.read();
        AttitudeCore::new(&config, ImuTrims::default())
    };

    let mut pacer = rt::CyclePacer::new(Duration::from_secs_f32(DT));
    while !lifecycle.is_exiting() {
        {
            let config = config.read();
            let mut pwm = pwm.lock();
            if let Some(log) = core.run_cycle(&shared, &config, &mut imu, &mut pwm) {
                if let Some(queue) = &log_queue {
                    queue.push(log);
                }
            }
        }
        pacer.tick();
    }
}

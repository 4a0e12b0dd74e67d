//! Signal handling for the brightr daemon.
//!
//! All external triggers funnel through one mpsc channel:
//! - SIGUSR1: user-initiated "apply now" cycle
//! - SIGUSR2: reload settings from disk
//! - SIGTERM / SIGINT / SIGHUP: graceful shutdown
//!
//! The periodic timer thread feeds the same channel, so the main loop sees a
//! single serialized stream of triggers.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc,
    thread,
};

/// Unified trigger message for the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    /// Periodic timer tick.
    Tick,
    /// User-initiated apply-now request (SIGUSR1).
    ApplyNow,
    /// Reload settings from disk (SIGUSR2).
    ReloadSettings,
    /// Graceful shutdown.
    Shutdown,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared when a shutdown signal arrives.
    pub running: Arc<AtomicBool>,
    pub receiver: mpsc::Receiver<EngineSignal>,
    pub sender: mpsc::Sender<EngineSignal>,
}

/// Install the signal handler thread and build the trigger channel.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (sender, receiver) = mpsc::channel();

    let mut signals = Signals::new([SIGUSR1, SIGUSR2, SIGTERM, SIGINT, SIGHUP])
        .context("Failed to register signal handlers")?;

    let thread_running = Arc::clone(&running);
    let thread_sender = sender.clone();
    thread::spawn(move || {
        for signal in signals.forever() {
            let message = match signal {
                SIGUSR1 => EngineSignal::ApplyNow,
                SIGUSR2 => EngineSignal::ReloadSettings,
                SIGTERM | SIGINT | SIGHUP => {
                    thread_running.store(false, Ordering::SeqCst);
                    EngineSignal::Shutdown
                }
                _ => continue,
            };
            if debug_enabled {
                log_debug!("Received signal {signal}, dispatching {message:?}");
            }
            if thread_sender.send(message).is_err() {
                break;
            }
            if message == EngineSignal::Shutdown {
                break;
            }
        }
    });

    Ok(SignalState {
        running,
        receiver,
        sender,
    })
}

/// Spawn the periodic tick thread feeding the trigger channel.
///
/// The thread exits on its own once the main loop drops the receiver or the
/// running flag clears.
pub fn spawn_tick_timer(
    sender: mpsc::Sender<EngineSignal>,
    running: Arc<AtomicBool>,
    interval_secs: u64,
) {
    thread::spawn(move || {
        loop {
            thread::sleep(std::time::Duration::from_secs(interval_secs));
            if !running.load(Ordering::SeqCst) {
                break;
            }
            if sender.send(EngineSignal::Tick).is_err() {
                break;
            }
        }
    });
}

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::logging::{log, warning};

/// Global shutdown flag (atomic bool)
///
/// Set to true when shutdown is requested via signal.
/// The pipe loop checks it between lines and after each reopen.
pub static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Global flag to track which signal triggered shutdown
///
/// Values: 0 = none, 1 = SIGINT, 2 = SIGTERM
pub static SIGNAL_TYPE: AtomicU8 = AtomicU8::new(0);

/// Set by the main thread once the pipe loop has returned
static STOPPED: AtomicBool = AtomicBool::new(false);

/// Checks if graceful shutdown has been requested
pub fn is_shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Asks the pipe loop to stop after the current line
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Request shutdown with signal type for later logging
///
/// Only sets atomic flags.
///
/// # Arguments
/// * `signal_type` - 1 for SIGINT, 2 for SIGTERM
pub fn request_shutdown_with_signal(signal_type: u8) {
    SIGNAL_TYPE.store(signal_type, Ordering::SeqCst);
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Get the signal type that triggered shutdown
///
/// # Returns
/// * `None` if no signal received
/// * `Some(1)` for SIGINT (Ctrl+C)
/// * `Some(2)` for SIGTERM
pub fn get_signal_type() -> Option<u8> {
    match SIGNAL_TYPE.load(Ordering::SeqCst) {
        0 => None,
        signal_type => Some(signal_type),
    }
}

pub fn signal_name(signal_type: u8) -> &'static str {
    match signal_type {
        1 => "SIGINT",
        2 => "SIGTERM",
        _ => "unknown signal",
    }
}

/// Records that the pipe loop has finished
pub fn mark_stopped() {
    STOPPED.store(true, Ordering::SeqCst);
}

pub fn is_stopped() -> bool {
    STOPPED.load(Ordering::SeqCst)
}

/// Starts a thread turning SIGINT/SIGTERM into a shutdown request
///
/// The reader may be blocked in `open()` waiting for a writer or in
/// `read()` waiting for the next line. The thread pokes the pipe so a
/// pending `open()` returns, and if the loop has not stopped within
/// `grace_seconds` it releases the PID lock and exits the process.
///
/// # Errors
/// If the signal handlers cannot be registered
pub fn install_signal_handler(
    pipe_path: PathBuf,
    pid_path: String,
    grace_seconds: u64,
) -> std::io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    thread::spawn(move || {
        let Some(sig) = signals.forever().next() else {
            return;
        };
        let signal_type = if sig == SIGTERM { 2 } else { 1 };
        request_shutdown_with_signal(signal_type);
        let _ = log(&format!(
            "Received {}, stopping (grace period {} seconds)",
            signal_name(signal_type),
            grace_seconds
        ));

        let deadline = Instant::now() + Duration::from_secs(grace_seconds);
        while Instant::now() < deadline {
            if is_stopped() {
                return;
            }
            crate::pipe::wake_reader(&pipe_path);
            thread::sleep(Duration::from_millis(100));
        }

        if !is_stopped() {
            let _ = warning("Pipe loop did not stop within the grace period, forcing exit");
            crate::instance::release_pid_lock(&pid_path);
            std::process::exit(0);
        }
    });

    Ok(())
}

/// Reset the shutdown flags (for testing purposes only)
#[cfg(test)]
pub fn reset_shutdown_for_tests() {
    SHUTDOWN_REQUESTED.store(false, Ordering::SeqCst);
    SIGNAL_TYPE.store(0, Ordering::SeqCst);
    STOPPED.store(false, Ordering::SeqCst);
}

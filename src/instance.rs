use crate::logging::log;

use fs2::FileExt;
use once_cell::sync::Lazy;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;

/// Global storage for the lock file handle (kept locked for program lifetime)
static LOCK_FILE_HANDLE: Lazy<Mutex<Option<std::fs::File>>> = Lazy::new(|| Mutex::new(None));

/// Returns the user-specific runtime directory for lock files
///
/// Priority order:
/// 1. $XDG_RUNTIME_DIR (if set, e.g., /run/user/1000/)
/// 2. /tmp (fallback, with UID suffix added to filename)
fn get_runtime_dir() -> String {
    std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string())
}

/// Returns the default PID file path for this user
///
/// - With XDG_RUNTIME_DIR: $XDG_RUNTIME_DIR/xfernotify.pid
/// - Without XDG_RUNTIME_DIR: /tmp/xfernotify_<uid>.pid
pub fn default_pid_path() -> String {
    let runtime_dir = get_runtime_dir();
    let program_name = crate::PROGRAM_NAME;

    if runtime_dir != "/tmp" {
        format!("{}/{}.pid", runtime_dir, program_name)
    } else {
        let uid = unsafe { libc::getuid() };
        format!("/tmp/{}_{}.pid", program_name, uid)
    }
}

/// Ensures only one reader consumes the pipe, using an exclusive lock on the PID file
///
/// The lock is held until `release_pid_lock` is called or the process exits.
///
/// # Errors
/// - If another instance holds the lock (`ErrorKind::AddrInUse`)
/// - If the PID file cannot be opened or written
pub fn acquire_pid_lock(pid_path: &str) -> io::Result<()> {
    // Open WITHOUT truncate; the file is truncated only once we hold the lock
    let mut lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(pid_path)
        .map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to open lock file {}: {}", pid_path, e),
            )
        })?;

    if lock_file.try_lock_exclusive().is_err() {
        let holder = std::fs::read_to_string(pid_path).unwrap_or_default();
        return Err(io::Error::new(
            io::ErrorKind::AddrInUse,
            format!(
                "Another instance is already running (PID file {} is locked by PID {})",
                pid_path,
                holder.trim()
            ),
        ));
    }

    lock_file.set_len(0).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to truncate lock file {}: {}", pid_path, e),
        )
    })?;
    lock_file
        .write_all(std::process::id().to_string().as_bytes())
        .map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to write PID to {}: {}", pid_path, e),
            )
        })?;
    let _ = log(&format!(
        "Acquired exclusive lock on {}, PID {}",
        pid_path,
        std::process::id()
    ));

    if let Ok(mut guard) = LOCK_FILE_HANDLE.lock() {
        *guard = Some(lock_file);
    }

    Ok(())
}

/// Releases the PID file lock and removes the file
///
/// Does nothing when this process does not hold the lock, so a second
/// instance that failed to start never deletes the running one's PID file.
pub fn release_pid_lock(pid_path: &str) {
    let held = match LOCK_FILE_HANDLE.lock() {
        Ok(mut guard) => guard.take().is_some(),
        Err(_) => false,
    };
    if !held {
        return;
    }

    let _ = log(&format!("Removing lock file {}", pid_path));
    if let Err(e) = std::fs::remove_file(pid_path) {
        if e.kind() != io::ErrorKind::NotFound {
            let _ = log(&format!("Failed to remove pid file {}: {}", pid_path, e));
        }
    }
}

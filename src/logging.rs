use chrono::Local;
use once_cell::sync::Lazy;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Global log file path protected by Mutex
///
/// Thread-safe storage for optional log file path.
/// When None, logs go to stdout.
pub static LOG_FILE: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));

/// Whether debug messages are written (set with `-V`)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Severity of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warning,
    Info,
    Debug,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        };
        f.write_str(tag)
    }
}

/// Logs an informational message with timestamp to configured output
///
/// # Arguments
/// * `message` - The message to log
///
/// # Returns
/// * `io::Result<()>` - Ok on success, Err if writing fails
///
/// # Example
/// ```text
/// // log("Opening pipe /run/xfernotify.fifo").unwrap();
/// ```
pub fn log(message: &str) -> io::Result<()> {
    log_level(Level::Info, message)
}

/// Logs a message with timestamp and severity tag
///
/// Debug messages are dropped unless verbose mode is enabled.
/// If a log file has been set (using set_log_file), the message is appended
/// to that file. Otherwise, the message is printed to stdout.
pub fn log_level(level: Level, message: &str) -> io::Result<()> {
    if level == Level::Debug && !is_verbose() {
        return Ok(());
    }

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let log_message = format!("{} [{}] {}\n", timestamp, level, message);

    let guard = LOG_FILE
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file mutex poisoned"))?;
    match &*guard {
        Some(log_file) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            file.write_all(log_message.as_bytes())?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(log_message.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

pub fn error(message: &str) -> io::Result<()> {
    log_level(Level::Error, message)
}

pub fn warning(message: &str) -> io::Result<()> {
    log_level(Level::Warning, message)
}

pub fn info(message: &str) -> io::Result<()> {
    log_level(Level::Info, message)
}

pub fn debug(message: &str) -> io::Result<()> {
    log_level(Level::Debug, message)
}

/// Sets the path for the log file
///
/// Subsequent calls to the log functions will append to this file.
///
/// # Arguments
///
/// * `path` - A path-like object representing the location of the log file
pub fn set_log_file<P: AsRef<Path>>(path: P) {
    let path_str = path.as_ref().to_string_lossy().into_owned();
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(path_str);
    }
}

/// Enables or disables debug output
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

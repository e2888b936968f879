//! FTP transfer log notifier library
//!
//! Reads xferlog lines from a named pipe, parses them into transfer
//! records and hands each record to the configured sinks: a plain file,
//! syslog and Pushbullet notifications. Also contains the command-line,
//! configuration, logging, shutdown signaling and single-instance
//! handling used by the daemon binary.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod instance;
pub mod logging;
pub mod pipe;
pub mod record;
pub mod shutdown;
pub mod sink;
pub mod template;

// Re-export key items for easy use by the binary (main.rs)
pub use cli::parse_args;
pub use config::{parse_config, Outputs};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::SinkError;
pub use filter::{decide, Decision, SkipReason};
pub use instance::{acquire_pid_lock, default_pid_path, release_pid_lock};
pub use logging::{log, set_log_file, set_verbose};
pub use record::{parse, ParseError, TransferRecord};
pub use shutdown::{is_shutdown_requested, request_shutdown};
pub use template::render;

/// Name of the program used for:
/// - Process identification and syslog ident
/// - PID file ($XDG_RUNTIME_DIR/{PROGRAM_NAME}.pid)
pub const PROGRAM_NAME: &str = "xfernotify";

/// Current version of the program (from Cargo.toml)
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

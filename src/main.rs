use std::path::PathBuf;
use std::process;

use scopeguard::defer;
use xfernotify::cli::Args;
use xfernotify::logging::{error, warning};
use xfernotify::{
    acquire_pid_lock, default_pid_path, log, parse_args, parse_config, pipe, release_pid_lock,
    set_log_file, set_verbose, shutdown, Dispatcher, PROGRAM_NAME, PROGRAM_VERSION,
};

fn main() {
    let args = parse_args();
    process::exit(run_daemon(args));
}

/// Runs the daemon and returns the process exit code
fn run_daemon(args: Args) -> i32 {
    if let Some(log_file) = &args.log_file {
        set_log_file(log_file);
    }
    set_verbose(args.verbose);

    let outputs = match parse_config(&args.config_file) {
        Ok(outputs) => outputs,
        Err(e) => {
            eprintln!("Error loading config file {}: {}", args.config_file, e);
            let _ = error(&format!("Error loading config file {}: {}", args.config_file, e));
            return 1;
        }
    };
    if outputs.is_empty() {
        let _ = warning("No outputs configured, lines will only be validated");
    }

    let pipe_path = PathBuf::from(&args.pipe_path);
    if let Err(e) = pipe::ensure_fifo(&pipe_path) {
        eprintln!("{}", e);
        let _ = error(&e.to_string());
        return 1;
    }

    if !args.foreground {
        if args.log_file.is_none() {
            eprintln!("Warning: running detached without -l, log output is discarded");
        }
        // Keep the working directory so relative paths stay valid
        if let Err(e) = nix::unistd::daemon(true, false) {
            eprintln!("Failed to daemonize: {}", e);
            return 1;
        }
    }

    let pid_path = args.pid_file.clone().unwrap_or_else(default_pid_path);
    if let Err(e) = acquire_pid_lock(&pid_path) {
        eprintln!("{}", e);
        let _ = error(&e.to_string());
        return 1;
    }
    defer! {
        release_pid_lock(&pid_path);
    }

    if let Err(e) = shutdown::install_signal_handler(
        pipe_path.clone(),
        pid_path.clone(),
        args.grace_seconds,
    ) {
        let _ = error(&format!("Error setting signal handler: {}", e));
        return 1;
    }

    let dispatcher = Dispatcher::new(&outputs);
    let _ = log(&format!(
        "{} {} started on {} with {} sink instance(s)",
        PROGRAM_NAME,
        PROGRAM_VERSION,
        pipe_path.display(),
        dispatcher.len()
    ));
    for label in dispatcher.labels() {
        let _ = log(&format!("Enabled output {}", label));
    }

    let result = pipe::run(&pipe_path, &dispatcher);
    shutdown::mark_stopped();

    match result {
        Ok(lines) => {
            let reason = shutdown::get_signal_type()
                .map(shutdown::signal_name)
                .unwrap_or("shutdown request");
            let _ = log(&format!("Stopped by {} after {} line(s)", reason, lines));
            0
        }
        Err(e) => {
            let _ = error(&e.to_string());
            1
        }
    }
}

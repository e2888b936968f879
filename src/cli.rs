use std::env;
use std::process;

/// Default location of the named pipe the FTP server writes to
pub const DEFAULT_PIPE_PATH: &str = "/run/xfernotify.fifo";

/// Default seconds to wait for the pipe loop after SIGINT/SIGTERM
pub const DEFAULT_GRACE_SECONDS: u64 = 5;

/// Options for a daemon run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Path to the JSONL outputs file
    pub config_file: String,
    /// Log file (None for stdout)
    pub log_file: Option<String>,
    /// Named pipe to read
    pub pipe_path: String,
    /// PID file (None for the per-user default)
    pub pid_file: Option<String>,
    /// Log debug messages, including filter decisions
    pub verbose: bool,
    /// Do not detach from the terminal
    pub foreground: bool,
    pub grace_seconds: u64,
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Args),
    Help,
    Version,
}

/// Prints usage instructions for the program.
pub fn print_usage() {
    println!(
        "Usage: {} [-h] [-v] [-V] [-f] [-l logfile] [-p pipe] [-P pidfile] [-g grace_seconds] config_file",
        crate::PROGRAM_NAME
    );
}

/// Parses an argument list (without the program name)
///
/// # Errors
/// A message describing the first invalid or missing argument
pub fn parse_args_from<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config_file = None;
    let mut log_file = None;
    let mut pipe_path = DEFAULT_PIPE_PATH.to_string();
    let mut pid_file = None;
    let mut verbose = false;
    let mut foreground = false;
    let mut grace_seconds = DEFAULT_GRACE_SECONDS;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" => return Ok(Command::Help),
            "-v" => return Ok(Command::Version),
            "-V" => verbose = true,
            "-f" => foreground = true,
            "-l" => {
                log_file = Some(args.next().ok_or("Missing log file argument")?);
            }
            "-p" => {
                pipe_path = args.next().ok_or("Missing pipe path argument")?;
            }
            "-P" => {
                pid_file = Some(args.next().ok_or("Missing pid file argument")?);
            }
            "-g" => {
                let value = args.next().ok_or("Missing grace seconds argument")?;
                grace_seconds = value
                    .parse()
                    .map_err(|_| "Grace seconds must be a positive number".to_string())?;
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config_file.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config_file = Some(arg);
            }
        }
    }

    let config_file = config_file.ok_or("Missing config file argument")?;

    Ok(Command::Run(Args {
        config_file,
        log_file,
        pipe_path,
        pid_file,
        verbose,
        foreground,
        grace_seconds,
    }))
}

/// Parses the process command line
///
/// Prints usage and exits for `-h`, `-v` and invalid arguments.
pub fn parse_args() -> Args {
    match parse_args_from(env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_usage();
            process::exit(0);
        }
        Ok(Command::Version) => {
            println!("{} version {}", crate::PROGRAM_NAME, crate::PROGRAM_VERSION);
            process::exit(0);
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(1);
        }
    }
}

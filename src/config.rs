use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Error, ErrorKind};

use crate::sink::syslog::{parse_facility, parse_level};

/// Default target of the file sink
pub const DEFAULT_FILE_PATH: &str = "/var/log/ftp-transfers.log";
/// Default Pushbullet push endpoint
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://api.pushbullet.com/v2/pushes";
pub const DEFAULT_TITLE: &str = "%u %A file %f";
pub const DEFAULT_BODY: &str = "User %u (%c) %A file %F (%S) in %D seconds at %b MB/s";
/// Timeout of one outbound push request (seconds)
pub const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 10;

/// File sink options (JSON type: file)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileConfig {
    /// Path the raw log lines are appended to (JSON field: path)
    #[serde(default = "default_file_path")]
    pub path: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            path: default_file_path(),
        }
    }
}

/// Syslog sink options (JSON type: syslog)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyslogConfig {
    /// Facility name such as daemon, ftp, local0 (JSON field: facility)
    #[serde(default = "default_facility")]
    pub facility: String,
    /// Priority name such as info, notice, warning (JSON field: level)
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        SyslogConfig {
            facility: default_facility(),
            level: default_level(),
        }
    }
}

/// Pushbullet sink options (JSON type: pushbullet)
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Access token; checked on every dispatch, not at load time (JSON field: token)
    #[serde(default)]
    pub token: Option<SecretString>,
    /// Title template (JSON field: title)
    #[serde(default = "default_title")]
    pub title: String,
    /// Body template (JSON field: body)
    #[serde(default = "default_body")]
    pub body: String,
    /// Notify about uploads (JSON field: alert_upload)
    #[serde(default = "default_true")]
    pub alert_upload: bool,
    /// Notify about downloads (JSON field: alert_download)
    #[serde(default = "default_true")]
    pub alert_download: bool,
    /// Ignore transfers marked incomplete (JSON field: skip_incomplete)
    #[serde(default = "default_true")]
    pub skip_incomplete: bool,
    /// Regular expression the file path must match (JSON field: filename_filter)
    #[serde(default)]
    pub filename_filter: FilenameFilter,
    /// Minimum transfer size in MB (JSON field: filesize_min_mb)
    #[serde(default = "default_filesize_min_mb")]
    pub filesize_min_mb: f64,
    /// Push API URL (JSON field: endpoint)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds (JSON field: timeout_secs)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            token: None,
            title: default_title(),
            body: default_body(),
            alert_upload: true,
            alert_download: true,
            skip_incomplete: true,
            filename_filter: FilenameFilter::default(),
            filesize_min_mb: default_filesize_min_mb(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Compiled filename regular expression
#[derive(Clone)]
pub struct FilenameFilter(Regex);

impl FilenameFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(FilenameFilter)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.0.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for FilenameFilter {
    fn default() -> Self {
        FilenameFilter(Regex::new(".*").expect("match-all pattern is valid"))
    }
}

impl fmt::Debug for FilenameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilenameFilter").field(&self.as_str()).finish()
    }
}

impl PartialEq for FilenameFilter {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<'de> Deserialize<'de> for FilenameFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        FilenameFilter::new(&pattern).map_err(|e| {
            serde::de::Error::custom(format!("invalid filename_filter pattern: {}", e))
        })
    }
}

/// One configuration line, tagged by its sink type
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OutputLine {
    File(FileConfig),
    Syslog(SyslogConfig),
    #[serde(alias = "push")]
    Pushbullet(PushConfig),
}

/// Enabled sink instances, grouped by type in configuration order
///
/// Built once at startup and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    pub file: Vec<FileConfig>,
    pub syslog: Vec<SyslogConfig>,
    pub push: Vec<PushConfig>,
}

impl Outputs {
    /// Total number of configured instances
    pub fn len(&self) -> usize {
        self.file.len() + self.syslog.len() + self.push.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parses configuration file into grouped sink instance configurations
///
/// # Arguments
/// * `filename` - Path to configuration file
///
/// # Returns
/// * `Result<Outputs, Error>` - Sink configurations or error
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON format or unknown sink type
/// - Invalid filename_filter regex
/// - Unknown syslog facility or level
///
/// # File Format
/// JSONL format - one JSON object per line with a `type` field
/// (`file`, `syslog` or `pushbullet`) plus the options of that sink.
/// Unknown options are ignored.
///
/// # Example
/// ```text
/// // {"type":"file","path":"/var/log/ftp-transfers.log"}
/// // {"type":"pushbullet","token":"o.abc","filesize_min_mb":5}
/// ```
pub fn parse_config(filename: &str) -> Result<Outputs, Error> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);

    let mut outputs = Outputs::default();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let output: OutputLine = serde_json::from_str(line).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("invalid JSON on line {}: {}", line_num + 1, e),
            )
        })?;

        match output {
            OutputLine::File(config) => outputs.file.push(config),
            OutputLine::Syslog(config) => {
                parse_facility(&config.facility).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!(
                            "unknown syslog facility '{}' on line {}",
                            config.facility,
                            line_num + 1
                        ),
                    )
                })?;
                parse_level(&config.level).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!(
                            "unknown syslog level '{}' on line {}",
                            config.level,
                            line_num + 1
                        ),
                    )
                })?;
                outputs.syslog.push(config);
            }
            OutputLine::Pushbullet(config) => outputs.push.push(config),
        }
    }

    Ok(outputs)
}

fn default_file_path() -> String {
    DEFAULT_FILE_PATH.to_string()
}

fn default_facility() -> String {
    "daemon".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_body() -> String {
    DEFAULT_BODY.to_string()
}

fn default_true() -> bool {
    true
}

fn default_filesize_min_mb() -> f64 {
    1.0
}

fn default_endpoint() -> String {
    DEFAULT_PUSH_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_PUSH_TIMEOUT_SECS
}

//! Transfer log record parsing
//!
//! Turns one xferlog line, as written by the FTP server into the pipe,
//! into a typed [`TransferRecord`]. Lines that do not match the grammar
//! produce a [`ParseError`] and never a partially filled record.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

/// xferlog line grammar, case-insensitive, single-space separated.
///
/// `<weekday> <month> <day> <time> <year> <duration> <client> <size> <filepath>
/// <type> <flag> <direction> <mode> <user> <service> <auth_method> <auth_userid> [<status>]`
static LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([a-z]{3}) ([a-z]{3}) (\d{1,2}) (\d{2}:\d{2}:\d{2}) (\d{4}) (\d+) (\S+) (\d+) (\S+) ([ab]) (\S+) ([io]) ([agr]) (\S+) (ftps?) (\S+) (\S+)(?: ([ci]))?$",
    )
    .expect("xferlog grammar is a valid regex")
});

/// Error returned when a line does not follow the xferlog grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid transfer log line: {line:?}")]
    InvalidLine { line: String },
    #[error("numeric field {field} out of range in line: {line:?}")]
    NumberOutOfRange { field: &'static str, line: String },
}

/// ASCII or binary transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Binary,
}

/// Incoming is an upload to the server, outgoing a download from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// "upload" or "download"
    pub fn verb(&self) -> &'static str {
        match self {
            Direction::Incoming => "upload",
            Direction::Outgoing => "download",
        }
    }
}

/// How the user logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Anonymous,
    Guest,
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Ftp,
    Ftps,
}

/// Completion status of a transfer
///
/// `Unspecified` is used when the optional trailing status field is absent
/// from the line. The grammar never yields `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Complete,
    Incomplete,
    Aborted,
    Unspecified,
}

/// One parsed transfer log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Original line, without the trailing newline
    pub raw_line: String,
    /// Event time in the log's own format, e.g. `Sun Jun 17 14:33:58 2018`
    pub timestamp: String,
    pub duration_seconds: u64,
    pub client: String,
    pub size_bytes: u64,
    pub file_path: String,
    pub transfer_type: TransferType,
    /// Special action flag, `_` when none was taken
    pub special_action: String,
    pub direction: Direction,
    pub access_mode: AccessMode,
    pub user: String,
    pub service: Service,
    pub auth_method: String,
    pub auth_user_id: String,
    pub completion_status: CompletionStatus,
}

impl TransferRecord {
    /// Last path component of `file_path`
    pub fn basename(&self) -> &str {
        self.file_path
            .rsplit('/')
            .next()
            .unwrap_or(self.file_path.as_str())
    }
}

/// Parses a newline-stripped xferlog line
///
/// # Errors
/// - `ParseError::InvalidLine` if the line does not match the grammar
/// - `ParseError::NumberOutOfRange` if duration or size do not fit in 64 bits
///
/// # Example
/// ```text
/// // let record = parse("Sun Jun 17 14:33:58 2018 0 host 5 /srv/ftp/foo a _ o r myuser ftp 0 * c")?;
/// ```
pub fn parse(line: &str) -> Result<TransferRecord, ParseError> {
    let caps = LINE_REGEX.captures(line).ok_or_else(|| ParseError::InvalidLine {
        line: line.to_string(),
    })?;

    let text = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    let timestamp = format!(
        "{} {} {} {} {}",
        text(1),
        text(2),
        text(3),
        text(4),
        text(5)
    );

    Ok(TransferRecord {
        raw_line: line.to_string(),
        timestamp,
        duration_seconds: number(&caps, 6, "duration", line)?,
        client: text(7).to_string(),
        size_bytes: number(&caps, 8, "size", line)?,
        file_path: text(9).to_string(),
        transfer_type: if text(10).eq_ignore_ascii_case("a") {
            TransferType::Ascii
        } else {
            TransferType::Binary
        },
        special_action: text(11).to_string(),
        direction: if text(12).eq_ignore_ascii_case("i") {
            Direction::Incoming
        } else {
            Direction::Outgoing
        },
        access_mode: match text(13).to_ascii_lowercase().as_str() {
            "a" => AccessMode::Anonymous,
            "g" => AccessMode::Guest,
            _ => AccessMode::Real,
        },
        user: text(14).to_string(),
        service: if text(15).eq_ignore_ascii_case("ftps") {
            Service::Ftps
        } else {
            Service::Ftp
        },
        auth_method: text(16).to_string(),
        auth_user_id: text(17).to_string(),
        completion_status: match caps.get(18).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(s) if s == "c" => CompletionStatus::Complete,
            Some(_) => CompletionStatus::Incomplete,
            None => CompletionStatus::Unspecified,
        },
    })
}

fn number(caps: &Captures<'_>, index: usize, field: &'static str, line: &str) -> Result<u64, ParseError> {
    caps.get(index)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .ok_or_else(|| ParseError::NumberOutOfRange {
            field,
            line: line.to_string(),
        })
}

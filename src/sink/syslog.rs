//! Forwards raw transfer lines to the system logger.

use std::ffi::CString;
use std::sync::Once;

use libc::c_int;

use crate::config::SyslogConfig;
use crate::error::SinkError;
use crate::record::TransferRecord;
use crate::sink::{Outcome, Sink};

static OPENLOG: Once = Once::new();

/// NUL-terminated ident passed to openlog(3); must outlive the process
const IDENT: &[u8] = b"xfernotify\0";

/// Maps a facility name to its syslog(3) constant
pub fn parse_facility(name: &str) -> Option<c_int> {
    let facility = match name.to_ascii_lowercase().as_str() {
        "kern" => libc::LOG_KERN,
        "user" => libc::LOG_USER,
        "mail" => libc::LOG_MAIL,
        "daemon" => libc::LOG_DAEMON,
        "auth" => libc::LOG_AUTH,
        "syslog" => libc::LOG_SYSLOG,
        "lpr" => libc::LOG_LPR,
        "news" => libc::LOG_NEWS,
        "uucp" => libc::LOG_UUCP,
        "cron" => libc::LOG_CRON,
        "authpriv" => libc::LOG_AUTHPRIV,
        "ftp" => libc::LOG_FTP,
        "local0" => libc::LOG_LOCAL0,
        "local1" => libc::LOG_LOCAL1,
        "local2" => libc::LOG_LOCAL2,
        "local3" => libc::LOG_LOCAL3,
        "local4" => libc::LOG_LOCAL4,
        "local5" => libc::LOG_LOCAL5,
        "local6" => libc::LOG_LOCAL6,
        "local7" => libc::LOG_LOCAL7,
        _ => return None,
    };
    Some(facility)
}

/// Maps a level name to its syslog(3) priority constant
pub fn parse_level(name: &str) -> Option<c_int> {
    let level = match name.to_ascii_lowercase().as_str() {
        "emerg" | "panic" => libc::LOG_EMERG,
        "alert" => libc::LOG_ALERT,
        "crit" => libc::LOG_CRIT,
        "err" | "error" => libc::LOG_ERR,
        "warning" | "warn" => libc::LOG_WARNING,
        "notice" => libc::LOG_NOTICE,
        "info" => libc::LOG_INFO,
        "debug" => libc::LOG_DEBUG,
        _ => return None,
    };
    Some(level)
}

pub struct SyslogSink<'a> {
    config: &'a SyslogConfig,
}

impl<'a> SyslogSink<'a> {
    pub fn new(config: &'a SyslogConfig) -> Self {
        SyslogSink { config }
    }

    /// Combined facility and level value for syslog(3)
    pub fn priority(&self) -> Result<c_int, SinkError> {
        let facility =
            parse_facility(&self.config.facility).ok_or_else(|| SinkError::InvalidOption {
                option: "facility",
                value: self.config.facility.clone(),
            })?;
        let level = parse_level(&self.config.level).ok_or_else(|| SinkError::InvalidOption {
            option: "level",
            value: self.config.level.clone(),
        })?;
        Ok(facility | level)
    }
}

impl Sink for SyslogSink<'_> {
    fn apply(&self, record: &TransferRecord) -> Result<Outcome, SinkError> {
        let priority = self.priority()?;
        let message = CString::new(record.raw_line.as_str())
            .map_err(|e| SinkError::InvalidMessage(e.to_string()))?;

        OPENLOG.call_once(|| unsafe {
            libc::openlog(IDENT.as_ptr().cast(), libc::LOG_PID, libc::LOG_DAEMON);
        });
        // The line goes through "%s" so '%' in file names is not a format directive
        unsafe {
            libc::syslog(priority, b"%s\0".as_ptr().cast(), message.as_ptr());
        }
        Ok(Outcome::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse;

    #[test]
    fn test_parse_facility_and_level() {
        assert_eq!(parse_facility("daemon"), Some(libc::LOG_DAEMON));
        assert_eq!(parse_facility("LOCAL7"), Some(libc::LOG_LOCAL7));
        assert_eq!(parse_facility("ftp"), Some(libc::LOG_FTP));
        assert_eq!(parse_facility("bogus"), None);

        assert_eq!(parse_level("info"), Some(libc::LOG_INFO));
        assert_eq!(parse_level("warn"), Some(libc::LOG_WARNING));
        assert_eq!(parse_level("Err"), Some(libc::LOG_ERR));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_priority_defaults() {
        let config = SyslogConfig::default();
        let sink = SyslogSink::new(&config);
        assert_eq!(sink.priority().unwrap(), libc::LOG_DAEMON | libc::LOG_INFO);
    }

    #[test]
    fn test_invalid_level_is_reported_per_instance() {
        let config = SyslogConfig {
            facility: "daemon".to_string(),
            level: "shout".to_string(),
        };
        let record =
            parse("Sun Jun 17 14:33:58 2018 0 host 5 /srv/ftp/foo a _ o r myuser ftp 0 * c").unwrap();
        match SyslogSink::new(&config).apply(&record) {
            Err(SinkError::InvalidOption { option, value }) => {
                assert_eq!(option, "level");
                assert_eq!(value, "shout");
            }
            other => panic!("expected InvalidOption, got {:?}", other),
        }
    }

    #[test]
    fn test_emits_line() {
        let config = SyslogConfig::default();
        let record = parse(
            "Sun Jun 17 14:33:58 2018 0 host 5 /srv/ftp/100%_done a _ o r myuser ftp 0 * c",
        )
        .unwrap();
        assert_eq!(
            SyslogSink::new(&config).apply(&record).unwrap(),
            Outcome::Delivered
        );
    }
}

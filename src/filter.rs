//! Notification filter rules for push sinks

use std::fmt;

use crate::config::PushConfig;
use crate::record::{CompletionStatus, Direction, TransferRecord};

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Why a transfer was not notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UploadAlertsDisabled,
    DownloadAlertsDisabled,
    FileTooSmall,
    FilenameMismatch,
    IncompleteTransfer,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::UploadAlertsDisabled => "upload alerts disabled",
            SkipReason::DownloadAlertsDisabled => "download alerts disabled",
            SkipReason::FileTooSmall => "file too small",
            SkipReason::FilenameMismatch => "filename does not match",
            SkipReason::IncompleteTransfer => "incomplete transfer",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Skip(SkipReason),
}

/// Decides whether `record` is worth a notification for this push target
///
/// Rules are checked in a fixed order and the first one that fails gives
/// the skip reason:
/// 1. uploads disabled
/// 2. downloads disabled
/// 3. size below `filesize_min_mb`
/// 4. path not matching `filename_filter`
/// 5. incomplete transfer while `skip_incomplete` is set
pub fn decide(config: &PushConfig, record: &TransferRecord) -> Decision {
    match record.direction {
        Direction::Incoming if !config.alert_upload => {
            return Decision::Skip(SkipReason::UploadAlertsDisabled)
        }
        Direction::Outgoing if !config.alert_download => {
            return Decision::Skip(SkipReason::DownloadAlertsDisabled)
        }
        _ => {}
    }

    if (record.size_bytes as f64 / BYTES_PER_MB) < config.filesize_min_mb {
        return Decision::Skip(SkipReason::FileTooSmall);
    }

    if !config.filename_filter.is_match(&record.file_path) {
        return Decision::Skip(SkipReason::FilenameMismatch);
    }

    if record.completion_status == CompletionStatus::Incomplete && config.skip_incomplete {
        return Decision::Skip(SkipReason::IncompleteTransfer);
    }

    Decision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilenameFilter;
    use crate::record::parse;

    fn record(size: u64, direction: char, path: &str, status: &str) -> TransferRecord {
        parse(&format!(
            "Sun Jun 17 14:33:58 2018 2 client {} {} b _ {} r alice ftp 0 *{}",
            size, path, direction, status
        ))
        .unwrap()
    }

    fn permissive() -> PushConfig {
        PushConfig {
            filesize_min_mb: 0.0,
            ..PushConfig::default()
        }
    }

    #[test]
    fn test_default_config_allows_large_complete_transfer() {
        let r = record(5 * 1_048_576, 'i', "/srv/ftp/a.bin", " c");
        assert_eq!(decide(&PushConfig::default(), &r), Decision::Allow);
    }

    #[test]
    fn test_upload_alerts_disabled_wins_over_everything() {
        let config = PushConfig {
            alert_upload: false,
            filename_filter: FilenameFilter::new("^nomatch$").unwrap(),
            ..PushConfig::default()
        };
        // Too small, wrong name and incomplete as well
        let r = record(10, 'i', "/srv/ftp/a.bin", " i");
        assert_eq!(
            decide(&config, &r),
            Decision::Skip(SkipReason::UploadAlertsDisabled)
        );
        // Downloads are unaffected
        let r = record(10 * 1_048_576, 'o', "/srv/ftp/a.bin", " c");
        let config = PushConfig {
            alert_upload: false,
            ..PushConfig::default()
        };
        assert_eq!(decide(&config, &r), Decision::Allow);
    }

    #[test]
    fn test_download_alerts_disabled() {
        let config = PushConfig {
            alert_download: false,
            ..permissive()
        };
        let r = record(10, 'o', "/srv/ftp/a.bin", " c");
        assert_eq!(
            decide(&config, &r),
            Decision::Skip(SkipReason::DownloadAlertsDisabled)
        );
    }

    #[test]
    fn test_file_too_small() {
        let r = record(500_000, 'o', "/srv/ftp/a.bin", " c");
        assert_eq!(
            decide(&PushConfig::default(), &r),
            Decision::Skip(SkipReason::FileTooSmall)
        );
        let exactly_one = record(1_048_576, 'o', "/srv/ftp/a.bin", " c");
        assert_eq!(decide(&PushConfig::default(), &exactly_one), Decision::Allow);
    }

    #[test]
    fn test_filename_filter() {
        let config = PushConfig {
            filename_filter: FilenameFilter::new(r"\.iso$").unwrap(),
            ..permissive()
        };
        let iso = record(10, 'i', "/srv/ftp/debian.iso", " c");
        let txt = record(10, 'i', "/srv/ftp/readme.txt", " c");
        assert_eq!(decide(&config, &iso), Decision::Allow);
        assert_eq!(
            decide(&config, &txt),
            Decision::Skip(SkipReason::FilenameMismatch)
        );
    }

    #[test]
    fn test_incomplete_transfer() {
        let r = record(10, 'i', "/srv/ftp/a.bin", " i");
        assert_eq!(
            decide(&permissive(), &r),
            Decision::Skip(SkipReason::IncompleteTransfer)
        );
        let config = PushConfig {
            skip_incomplete: false,
            ..permissive()
        };
        assert_eq!(decide(&config, &r), Decision::Allow);
    }

    #[test]
    fn test_unspecified_status_is_not_incomplete() {
        let r = record(10, 'i', "/srv/ftp/a.bin", "");
        assert_eq!(decide(&permissive(), &r), Decision::Allow);
    }

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(SkipReason::UploadAlertsDisabled.to_string(), "upload alerts disabled");
        assert_eq!(SkipReason::DownloadAlertsDisabled.to_string(), "download alerts disabled");
        assert_eq!(SkipReason::FileTooSmall.to_string(), "file too small");
        assert_eq!(SkipReason::FilenameMismatch.to_string(), "filename does not match");
        assert_eq!(SkipReason::IncompleteTransfer.to_string(), "incomplete transfer");
    }
}

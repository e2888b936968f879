//! Message templates
//!
//! Renders notification titles and bodies from a [`TransferRecord`].
//!
//! | Placeholder | Value |
//! |---|---|
//! | `%u` | user |
//! | `%c` | client host |
//! | `%F` | full file path |
//! | `%f` | file name |
//! | `%d` | timestamp |
//! | `%D` | duration in seconds |
//! | `%s` | size in bytes |
//! | `%S` | size in binary units, e.g. `1.0 MiB` |
//! | `%a` | `upload` or `download` |
//! | `%A` | `uploaded` or `downloaded` |
//! | `%b` | bandwidth in MB/s, two decimals |

use crate::record::TransferRecord;

const MIB: f64 = 1_048_576.0;

/// Substitutes placeholders in `template` with fields of `record`
///
/// The template is scanned once from left to right, so text produced by
/// one substitution is never matched again. Unknown sequences such as `%x`
/// and a trailing `%` are kept as they are.
pub fn render(template: &str, record: &TransferRecord) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&key) = chars.peek() else {
            out.push('%');
            break;
        };
        match expand(key, record) {
            Some(value) => {
                out.push_str(&value);
                chars.next();
            }
            None => out.push('%'),
        }
    }

    out
}

fn expand(key: char, record: &TransferRecord) -> Option<String> {
    let value = match key {
        'u' => record.user.clone(),
        'c' => record.client.clone(),
        'F' => record.file_path.clone(),
        'f' => record.basename().to_string(),
        'd' => record.timestamp.clone(),
        'D' => record.duration_seconds.to_string(),
        's' => record.size_bytes.to_string(),
        'S' => human_size(record.size_bytes),
        'a' => record.direction.verb().to_string(),
        'A' => format!("{}ed", record.direction.verb()),
        'b' => format!("{:.2}", bandwidth(record.size_bytes, record.duration_seconds)),
        _ => return None,
    };
    Some(value)
}

/// Transfer rate in MB/s
///
/// One second is added to the duration so zero-length transfers do not
/// divide by zero.
pub fn bandwidth(size_bytes: u64, duration_seconds: u64) -> f64 {
    size_bytes as f64 / (MIB * (duration_seconds as f64 + 1.0))
}

/// Formats a byte count with binary unit suffixes
///
/// Values below one KiB are printed as whole bytes (`5 Bytes`), larger
/// values with one decimal (`1.0 MiB`).
pub fn human_size(size_bytes: u64) -> String {
    const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    if size_bytes == 1 {
        return "1 Byte".to_string();
    }
    if size_bytes < 1024 {
        return format!("{} Bytes", size_bytes);
    }

    let mut value = size_bytes as f64;
    let mut unit = UNITS[0];
    for candidate in UNITS {
        value /= 1024.0;
        unit = candidate;
        if value < 1024.0 {
            break;
        }
    }
    format!("{:.1} {}", value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse;

    fn record(size: u64, duration: u64, direction: char) -> TransferRecord {
        parse(&format!(
            "Sun Jun 17 14:33:58 2018 {} client.example.org {} /srv/ftp/pub/report.pdf b _ {} r alice ftp 0 * c",
            duration, size, direction
        ))
        .unwrap()
    }

    #[test]
    fn test_render_without_placeholders_is_unchanged() {
        let r = record(5, 0, 'o');
        let template = "nothing to see here, 100 percent plain";
        assert_eq!(render(template, &r), template);
        assert_eq!(render("", &r), "");
    }

    #[test]
    fn test_render_default_title_and_body() {
        let r = record(1_048_576, 0, 'i');
        assert_eq!(render("%u %A file %f", &r), "alice uploaded file report.pdf");
        assert_eq!(
            render(
                "User %u (%c) %A file %F (%S) in %D seconds at %b MB/s",
                &r
            ),
            "User alice (client.example.org) uploaded file /srv/ftp/pub/report.pdf (1.0 MiB) in 0 seconds at 1.00 MB/s"
        );
    }

    #[test]
    fn test_render_all_fields() {
        let r = record(2048, 3, 'o');
        assert_eq!(render("%d", &r), "Sun Jun 17 14:33:58 2018");
        assert_eq!(render("%s|%D|%a|%A", &r), "2048|3|download|downloaded");
        assert_eq!(render("%c", &r), "client.example.org");
    }

    #[test]
    fn test_render_does_not_rescan_substituted_text() {
        let r = parse(
            "Sun Jun 17 14:33:58 2018 0 host 5 /srv/ftp/foo a _ o r %c ftp 0 * c",
        )
        .unwrap();
        assert_eq!(render("%u", &r), "%c");
        assert_eq!(render("%u-%c", &r), "%c-host");
    }

    #[test]
    fn test_render_keeps_unknown_and_trailing_percent() {
        let r = record(5, 0, 'o');
        assert_eq!(render("100% %x %", &r), "100% %x %");
        assert_eq!(render("%%u", &r), "%alice");
    }

    #[test]
    fn test_bandwidth_zero_duration() {
        assert_eq!(format!("{:.2}", bandwidth(1_048_576, 0)), "1.00");
        assert_eq!(format!("{:.2}", bandwidth(10 * 1_048_576, 4)), "2.00");
        assert_eq!(format!("{:.2}", bandwidth(0, 0)), "0.00");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 Bytes");
        assert_eq!(human_size(1), "1 Byte");
        assert_eq!(human_size(1023), "1023 Bytes");
        assert_eq!(human_size(1024), "1.0 KiB");
        assert_eq!(human_size(1_048_576), "1.0 MiB");
        assert_eq!(human_size(1_258_291), "1.2 MiB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }
}

//! Fan-out of parsed records to every configured sink instance

use crate::config::Outputs;
use crate::error::SinkError;
use crate::logging::{debug, error, warning};
use crate::record::{parse, TransferRecord};
use crate::sink::{FileSink, Outcome, PushSink, Sink, SinkInstance, SyslogSink};

/// Per-record summary of what the sink instances did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Holds the enabled sink instances in dispatch order
///
/// Instances are grouped by type (file, syslog, pushbullet) and keep their
/// configuration order within a type. The dispatcher borrows the
/// configuration and never changes it.
pub struct Dispatcher<'a> {
    sinks: Vec<(String, SinkInstance<'a>)>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(outputs: &'a Outputs) -> Self {
        let mut sinks = Vec::with_capacity(outputs.len());

        for (i, config) in outputs.file.iter().enumerate() {
            let sink = FileSink::new(config);
            let label = format!("file#{} ({})", i + 1, sink.path());
            sinks.push((label, SinkInstance::File(sink)));
        }
        for (i, config) in outputs.syslog.iter().enumerate() {
            let label = format!("syslog#{} ({}.{})", i + 1, config.facility, config.level);
            sinks.push((label, SinkInstance::Syslog(SyslogSink::new(config))));
        }
        for (i, config) in outputs.push.iter().enumerate() {
            let sink = PushSink::new(config);
            let label = format!("pushbullet#{} ({})", i + 1, sink.endpoint());
            sinks.push((label, SinkInstance::Push(sink)));
        }

        Dispatcher { sinks }
    }

    /// Number of sink instances
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Instance labels in dispatch order, e.g. `file#1 (/var/log/x.log)`
    pub fn labels(&self) -> Vec<&str> {
        self.sinks.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Runs every sink instance on `record`, in order
    ///
    /// A failing instance is logged and counted; the remaining instances
    /// still run.
    pub fn dispatch(&self, record: &TransferRecord) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (label, sink) in &self.sinks {
            match sink.apply(record) {
                Ok(Outcome::Delivered) => {
                    let _ = debug(&format!("{}: handled transfer of {}", label, record.file_path));
                    report.delivered += 1;
                }
                Ok(Outcome::Skipped(reason)) => {
                    let _ = debug(&format!(
                        "{}: skipping notification for {}: {}",
                        label, record.file_path, reason
                    ));
                    report.skipped += 1;
                }
                Err(e @ SinkError::MissingOption(_)) | Err(e @ SinkError::InvalidOption { .. }) => {
                    let _ = warning(&format!("{}: configuration error, instance skipped: {}", label, e));
                    report.failed += 1;
                }
                Err(e) => {
                    let _ = error(&format!("{}: failed for {}: {}", label, record.file_path, e));
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Parses one pipe line and dispatches it
    ///
    /// Returns `None` for lines that do not parse; those are logged and
    /// reach no sink.
    pub fn process_line(&self, line: &str) -> Option<DispatchReport> {
        match parse(line) {
            Ok(record) => Some(self.dispatch(&record)),
            Err(e) => {
                let _ = warning(&e.to_string());
                None
            }
        }
    }
}

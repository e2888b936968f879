//! Output sinks for parsed transfer records
//!
//! Each sink type implements the `Sink` trait. The set of types is closed,
//! so `SinkInstance` wraps them in an enum the dispatcher can hold in one
//! ordered list.

pub mod file;
pub mod push;
pub mod syslog;

pub use file::FileSink;
pub use push::PushSink;
pub use syslog::SyslogSink;

use crate::error::SinkError;
use crate::filter::SkipReason;
use crate::record::TransferRecord;

/// Result of a sink invocation that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The external side effect was performed
    Delivered,
    /// The sink's filter rejected the record; nothing was done
    Skipped(SkipReason),
}

/// A configured output destination
pub trait Sink {
    /// Handles one record
    fn apply(&self, record: &TransferRecord) -> Result<Outcome, SinkError>;
}

/// Sink type of an instance, in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SinkKind {
    File,
    Syslog,
    Push,
}

impl SinkKind {
    pub fn name(&self) -> &'static str {
        match self {
            SinkKind::File => "file",
            SinkKind::Syslog => "syslog",
            SinkKind::Push => "pushbullet",
        }
    }
}

/// One configured sink of any type
pub enum SinkInstance<'a> {
    File(FileSink<'a>),
    Syslog(SyslogSink<'a>),
    Push(PushSink<'a>),
}

impl SinkInstance<'_> {
    pub fn kind(&self) -> SinkKind {
        match self {
            SinkInstance::File(_) => SinkKind::File,
            SinkInstance::Syslog(_) => SinkKind::Syslog,
            SinkInstance::Push(_) => SinkKind::Push,
        }
    }
}

impl Sink for SinkInstance<'_> {
    fn apply(&self, record: &TransferRecord) -> Result<Outcome, SinkError> {
        match self {
            SinkInstance::File(sink) => sink.apply(record),
            SinkInstance::Syslog(sink) => sink.apply(record),
            SinkInstance::Push(sink) => sink.apply(record),
        }
    }
}

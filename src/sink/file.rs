//! Appends raw transfer lines to a local file.

use std::fs::OpenOptions;
use std::io::Write;

use crate::config::FileConfig;
use crate::error::SinkError;
use crate::record::TransferRecord;
use crate::sink::{Outcome, Sink};

pub struct FileSink<'a> {
    config: &'a FileConfig,
}

impl<'a> FileSink<'a> {
    pub fn new(config: &'a FileConfig) -> Self {
        FileSink { config }
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }
}

impl Sink for FileSink<'_> {
    fn apply(&self, record: &TransferRecord) -> Result<Outcome, SinkError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)?;
        // Single write so concurrent appenders never interleave within a line
        file.write_all(format!("{}\n", record.raw_line).as_bytes())?;
        Ok(Outcome::Delivered)
    }
}

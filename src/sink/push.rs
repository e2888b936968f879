//! Pushbullet notifications
//!
//! The only sink that filters and templates: the record is first checked
//! against the instance's filter rules, then a title and body are rendered
//! and posted as a `note` push.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::PushConfig;
use crate::error::SinkError;
use crate::filter::{decide, Decision};
use crate::record::TransferRecord;
use crate::sink::{Outcome, Sink};
use crate::template::render;

/// Header carrying the Pushbullet access token
const ACCESS_TOKEN_HEADER: &str = "Access-Token";

/// JSON body of a push request
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

pub struct PushSink<'a> {
    config: &'a PushConfig,
    client: Client,
}

impl<'a> PushSink<'a> {
    pub fn new(config: &'a PushConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        PushSink { config, client }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Renders the title and body templates for `record`
    pub fn payload(&self, record: &TransferRecord) -> PushPayload {
        PushPayload {
            title: render(&self.config.title, record),
            body: render(&self.config.body, record),
            kind: "note",
        }
    }
}

impl Sink for PushSink<'_> {
    fn apply(&self, record: &TransferRecord) -> Result<Outcome, SinkError> {
        // Re-checked for every record; a missing token never disables the instance
        let token = self
            .config
            .token
            .as_ref()
            .map(|t| t.expose_secret().trim())
            .filter(|t| !t.is_empty())
            .ok_or(SinkError::MissingOption("token"))?;

        if let Decision::Skip(reason) = decide(self.config, record) {
            return Ok(Outcome::Skipped(reason));
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(ACCESS_TOKEN_HEADER, token)
            .header(CONTENT_TYPE, "application/json")
            .json(&self.payload(record))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Outcome::Delivered)
    }
}

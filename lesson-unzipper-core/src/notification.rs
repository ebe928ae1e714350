//! Turns the inbound object-created event into the locations a run works on.
//!
//! Only the first record of a batch is processed; the rest are ignored.

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::PipelineError;

/// Suffix that marks the author-facing bucket; removing it names the learner-facing one.
pub const ZIPPED_BUCKET_SUFFIX: &str = "-zipped";

const STAGING_MARKERS: [&str; 2] = ["stageapp", "staging"];

/// Deployment environment a run is attributed to in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    pub fn from_bucket_name(bucket: &str) -> Self {
        if STAGING_MARKERS.iter().any(|marker| bucket.contains(marker)) {
            Environment::Staging
        } else {
            Environment::Production
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locations and environment for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotification {
    pub source_bucket: String,
    pub source_key: String,
    pub destination_bucket: String,
    pub environment: Environment,
}

#[derive(Debug, Deserialize)]
struct ObjectCreatedEvent {
    #[serde(rename = "Records", default)]
    records: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

impl TransferNotification {
    /// Build a notification from a raw S3 event payload.
    pub fn from_event(event: serde_json::Value) -> Result<Self, PipelineError> {
        let event: ObjectCreatedEvent = serde_json::from_value(event).map_err(|e| {
            warn!(error = %e, "Event does not look like an S3 notification");
            PipelineError::InvalidNotification(e.to_string())
        })?;

        let total = event.records.len();
        let record = event
            .records
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::InvalidNotification("event has no records".into()))?;
        if total > 1 {
            debug!(ignored = total - 1, "Ignoring additional records in event");
        }

        Self::from_parts(&record.s3.bucket.name, &record.s3.object.key)
    }

    /// Build a notification from a bucket name and a raw (still encoded) object key.
    pub fn from_parts(bucket: &str, raw_key: &str) -> Result<Self, PipelineError> {
        if bucket.is_empty() {
            return Err(PipelineError::InvalidNotification(
                "bucket name is empty".into(),
            ));
        }
        let source_key = decode_object_key(raw_key)?;
        if source_key.is_empty() {
            return Err(PipelineError::InvalidNotification(
                "object key is empty".into(),
            ));
        }

        Ok(TransferNotification {
            source_bucket: bucket.to_string(),
            source_key,
            destination_bucket: destination_bucket_for(bucket),
            environment: Environment::from_bucket_name(bucket),
        })
    }
}

/// Decode an event object key: `+` stands for a space, the rest is percent-encoded UTF-8.
/// A `%` not followed by two hex digits is rejected rather than kept literally.
pub fn decode_object_key(raw: &str) -> Result<String, PipelineError> {
    if let Some(at) = malformed_escape(raw) {
        return Err(PipelineError::InvalidNotification(format!(
            "object key {raw:?}: malformed percent escape at byte {at}"
        )));
    }
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|e| PipelineError::InvalidNotification(format!("object key {raw:?}: {e}")))
}

fn malformed_escape(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .map(|(at, _)| at)
        .find(|&at| {
            !matches!(
                bytes.get(at + 1..at + 3),
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
        })
}

/// Strip the first `-zipped` from the source bucket name.
pub fn destination_bucket_for(source_bucket: &str) -> String {
    source_bucket.replacen(ZIPPED_BUCKET_SUFFIX, "", 1)
}

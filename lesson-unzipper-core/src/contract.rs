//! # contract: collaborator interfaces for the lesson pipeline
//!
//! The pipeline talks to three external collaborators: an object store it
//! fetches the zipped lesson from, an object store it publishes the unpacked
//! files to, and an error-tracking service. Each is a trait here so the
//! deployment crate can plug in real clients (S3, Rollbar) and tests can plug
//! in `mockall` mocks.
//!
//! ## Mocking & Testing
//! - All traits are annotated with `automock`; the generated `Mock*` types are
//!   exported behind the default `test-export-mocks` feature.
//!
//! ## Errors
//! - Store and reporter failures are boxed trait objects. The orchestrator wraps
//!   them into stage-tagged [`crate::error::PipelineError`] values.

use async_trait::async_trait;
use std::fmt;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::notification::Environment;

/// Error returned by an object store implementation.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by an error-reporting implementation.
pub type ReportError = Box<dyn std::error::Error + Send + Sync>;

/// Canned access policy applied to a published object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Private,
}

/// Content-Disposition hint applied to a published object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentDisposition {
    Inline,
}

impl ContentDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDisposition::Inline => "inline",
        }
    }
}

/// Everything needed to write one object to the destination bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    /// `None` when no MIME type is known for the key's extension.
    pub content_type: Option<String>,
    pub access_policy: AccessPolicy,
    pub content_disposition: ContentDisposition,
}

/// Severity of a report sent to the error tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLevel::Info => f.write_str("info"),
            ReportLevel::Error => f.write_str("error"),
        }
    }
}

/// Context attached to every report of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub environment: Environment,
    pub run_id: uuid::Uuid,
}

impl ReportContext {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            run_id: uuid::Uuid::new_v4(),
        }
    }
}

/// Reads objects from a bucket.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Fetch the full body of `bucket/key`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// Writes objects to a bucket, overwriting whatever is already stored at the key.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectPublisher: Send + Sync {
    async fn put_object(&self, req: PutObjectRequest) -> Result<(), StoreError>;
}

/// Sends free-text messages to an error-tracking service.
///
/// Reporting is never on the critical path: callers log a failed report and
/// carry on.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(
        &self,
        level: ReportLevel,
        message: &str,
        context: &ReportContext,
    ) -> Result<(), ReportError>;
}

/// Reporter that only writes to the local `tracing` log.
///
/// Used when no error-tracking credential is configured.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

#[async_trait]
impl ErrorReporter for TracingReporter {
    async fn report(
        &self,
        level: ReportLevel,
        message: &str,
        context: &ReportContext,
    ) -> Result<(), ReportError> {
        match level {
            ReportLevel::Info => tracing::info!(
                environment = %context.environment,
                run_id = %context.run_id,
                body = message,
                "report"
            ),
            ReportLevel::Error => tracing::error!(
                environment = %context.environment,
                run_id = %context.run_id,
                body = message,
                "report"
            ),
        }
        Ok(())
    }
}

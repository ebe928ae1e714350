//! High-level pipeline: orchestrates fetch → extract → patch → publish for one
//! zipped lesson.
//!
//! # Responsibilities
//! - Strictly sequential, fail-fast orchestration: each step is awaited before
//!   the next, and the first error ends the run
//! - Files published before a failure stay published; nothing is rolled back
//! - Reports progress and failures to the [`ErrorReporter`] with a per-run
//!   [`ReportContext`], and logs them via `tracing`
//!
//! # Navigation
//! - Event boundary: [`handle_notification`], which never fails
//! - Fallible core: [`process_lesson`]
//! - Supporting types: [`PublishReport`], [`RunOutcome`]

use tracing::{error, info, warn, Instrument};

use crate::archive;
use crate::contract::{ErrorReporter, ObjectFetcher, ObjectPublisher, ReportContext, ReportLevel};
use crate::error::{PipelineError, Stage};
use crate::notification::{Environment, TransferNotification};
use crate::patch;
use crate::publish;

/// Keys written by a successful run, in publish order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub destination_bucket: String,
    pub keys: Vec<String>,
}

/// Terminal state of a run as seen by the event boundary.
#[derive(Debug)]
pub enum RunOutcome {
    Succeeded(PublishReport),
    Failed { stage: Stage, message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded(_))
    }
}

/// Fetch the archive named by `notification`, patch it and publish every file.
pub async fn process_lesson<F, P>(
    fetcher: &F,
    publisher: &P,
    notification: &TransferNotification,
) -> Result<PublishReport, PipelineError>
where
    F: ObjectFetcher + ?Sized,
    P: ObjectPublisher + ?Sized,
{
    let src_bucket = notification.source_bucket.as_str();
    let src_key = notification.source_key.as_str();

    // --- Fetching ---
    let archive_bytes = match fetcher.get_object(src_bucket, src_key).await {
        Ok(bytes) => {
            info!(
                bucket = src_bucket,
                key = src_key,
                size = bytes.len(),
                "Zipped lesson downloaded"
            );
            bytes
        }
        Err(e) => {
            error!(bucket = src_bucket, key = src_key, error = %e, "Fetch failed");
            return Err(PipelineError::Fetch {
                bucket: src_bucket.to_string(),
                key: src_key.to_string(),
                source: e,
            });
        }
    };

    // --- Extracting ---
    let entries = archive::extract(&archive_bytes)?;
    drop(archive_bytes);

    // --- Patching ---
    let files = patch::patch(entries)?;

    // --- Publishing, one file at a time ---
    let mut keys = Vec::with_capacity(files.len());
    for file in files {
        let key = publish::publish(
            publisher,
            file,
            &notification.destination_bucket,
            src_key,
        )
        .await?;
        keys.push(key);
    }

    Ok(PublishReport {
        destination_bucket: notification.destination_bucket.clone(),
        keys,
    })
}

/// Handle one inbound event end to end.
///
/// Errors never escape: a failed run is reported to `reporter`, logged, and
/// returned as [`RunOutcome::Failed`]. `default_environment` attributes reports
/// for events too malformed to name a bucket.
pub async fn handle_notification<F, P, R>(
    fetcher: &F,
    publisher: &P,
    reporter: &R,
    event: serde_json::Value,
    default_environment: Environment,
) -> RunOutcome
where
    F: ObjectFetcher + ?Sized,
    P: ObjectPublisher + ?Sized,
    R: ErrorReporter + ?Sized,
{
    let notification = match TransferNotification::from_event(event) {
        Ok(n) => n,
        Err(e) => {
            let context = ReportContext::new(default_environment);
            let message = format!("Error processing lesson: {e}");
            error!(
                run_id = %context.run_id,
                stage = %e.stage(),
                error = %e,
                "Could not read transfer notification"
            );
            send_report(reporter, ReportLevel::Error, &message, &context).await;
            return RunOutcome::Failed {
                stage: e.stage(),
                message,
            };
        }
    };

    let context = ReportContext::new(notification.environment);
    let span = tracing::info_span!(
        "process_lesson",
        run_id = %context.run_id,
        environment = %context.environment,
        bucket = %notification.source_bucket,
        key = %notification.source_key,
    );

    async {
        let attempt = format!(
            "Attempting to process lesson: {} from {}",
            notification.source_key, notification.source_bucket
        );
        info!("{attempt}");
        send_report(reporter, ReportLevel::Info, &attempt, &context).await;

        match process_lesson(fetcher, publisher, &notification).await {
            Ok(report) => {
                info!(
                    destination_bucket = %report.destination_bucket,
                    count = report.keys.len(),
                    "Lesson successfully unzipped and uploaded"
                );
                RunOutcome::Succeeded(report)
            }
            Err(e) => {
                let message = format!(
                    "Error processing lesson: {} - {e}",
                    notification.source_key
                );
                error!(stage = %e.stage(), error = %e, "Could not finish lesson processing");
                send_report(reporter, ReportLevel::Error, &message, &context).await;
                RunOutcome::Failed {
                    stage: e.stage(),
                    message,
                }
            }
        }
    }
    .instrument(span)
    .await
}

async fn send_report<R>(reporter: &R, level: ReportLevel, message: &str, context: &ReportContext)
where
    R: ErrorReporter + ?Sized,
{
    if let Err(e) = reporter.report(level, message, context).await {
        warn!(level = %level, error = %e, "Failed to send report to error tracker");
    }
}

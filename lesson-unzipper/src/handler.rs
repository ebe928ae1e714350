/// Lambda glue for lesson-unzipper: builds the process-wide collaborators once
/// and hands every invocation to the core pipeline.
///
/// All business logic lives in `lesson-unzipper-core`. This module only wires
/// real clients (S3, Rollbar) to it and adapts the runtime's event type.
///
/// The handler always returns `Ok(())` to the runtime: a failed run has
/// already been reported and logged by the core, and redelivery is left to
/// the trigger's own retry policy.
use crate::load_config::AppConfig;
use crate::rollbar::RollbarReporter;
use crate::s3::S3Store;
use lambda_runtime::{Error, LambdaEvent};
use lesson_unzipper_core::contract::{
    ErrorReporter, ObjectFetcher, ObjectPublisher, TracingReporter,
};
use lesson_unzipper_core::notification::Environment;
use lesson_unzipper_core::pipeline::{handle_notification, RunOutcome};
use serde_json::Value;

/// Collaborators shared by every invocation of a warm Lambda instance.
pub struct AppState {
    pub store: S3Store,
    pub reporter: Box<dyn ErrorReporter>,
    pub default_environment: Environment,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let reporter: Box<dyn ErrorReporter> = match &config.rollbar_token {
            Some(token) => Box::new(
                RollbarReporter::new(token.clone())
                    .map_err(|e| anyhow::anyhow!("Failed to set up Rollbar reporter: {e}"))?,
            ),
            None => Box::new(TracingReporter),
        };
        Ok(Self {
            store: S3Store::from_env().await,
            reporter,
            default_environment: config.default_environment,
        })
    }
}

/// Entry point registered with the Lambda runtime.
pub async fn run(state: &AppState, event: LambdaEvent<Value>) -> Result<(), Error> {
    handle_event(
        &state.store,
        &state.store,
        state.reporter.as_ref(),
        state.default_environment,
        event,
    )
    .await
}

/// Runs one invocation against arbitrary collaborators.
pub async fn handle_event<F, P, R>(
    fetcher: &F,
    publisher: &P,
    reporter: &R,
    default_environment: Environment,
    event: LambdaEvent<Value>,
) -> Result<(), Error>
where
    F: ObjectFetcher + ?Sized,
    P: ObjectPublisher + ?Sized,
    R: ErrorReporter + ?Sized,
{
    let (payload, context) = event.into_parts();
    tracing::info!(request_id = %context.request_id, "Received S3 notification");

    let outcome =
        handle_notification(fetcher, publisher, reporter, payload, default_environment).await;
    match &outcome {
        RunOutcome::Succeeded(report) => tracing::info!(
            request_id = %context.request_id,
            count = report.keys.len(),
            "Invocation complete"
        ),
        RunOutcome::Failed { stage, .. } => tracing::warn!(
            request_id = %context.request_id,
            stage = %stage,
            "Invocation finished with a failed run"
        ),
    }
    Ok(())
}

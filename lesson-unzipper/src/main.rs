use anyhow::Result;
use lambda_runtime::{service_fn, LambdaEvent};
use lesson_unzipper::handler::{run, AppState};
use lesson_unzipper::load_config::load_config;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // CloudWatch stamps every line, so no timestamps of our own.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .without_time()
        .init();
    tracing::info!("Lambda startup: tracing initialised");

    let config = load_config()?;
    let state = AppState::from_config(&config).await?;
    let state = &state;
    tracing::info!("Collaborators ready, starting runtime");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        run(state, event).await
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime exited with error: {e}"))
}

/// `load_config` module: reads the process-wide settings from the environment
/// once, at cold start.
///
/// The only settings are for the error tracker: its access token and the
/// environment label to use before a run can derive one from its bucket.
///
/// # Errors
/// All errors use `anyhow::Error` and surface at startup, before the runtime
/// starts accepting events.
use anyhow::Result;
use lesson_unzipper_core::notification::Environment;
use std::env;
use tracing::{info, warn};

pub const ROLLBAR_TOKEN_VAR: &str = "ROLLBAR_TOKEN";
pub const ROLLBAR_ENV_VAR: &str = "ROLLBAR_ENV";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Rollbar server token; `None` means reports only go to the local log.
    pub rollbar_token: Option<String>,
    /// Environment used for reports that happen before a bucket is known.
    pub default_environment: Environment,
}

/// Parses a `ROLLBAR_ENV` label. Unset or blank means production; any label
/// other than `staging` or `production` is rejected.
fn parse_environment(label: Option<&str>) -> Result<Environment> {
    match label.map(str::trim) {
        None | Some("") => Ok(Environment::Production),
        Some(label) if label.eq_ignore_ascii_case("staging") => Ok(Environment::Staging),
        Some(label) if label.eq_ignore_ascii_case("production") => Ok(Environment::Production),
        Some(label) => Err(anyhow::anyhow!(
            "{ROLLBAR_ENV_VAR} must be `staging` or `production`, got {label:?}"
        )),
    }
}

/// Loads `.env` if present and reads the error-tracker settings.
pub fn load_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let rollbar_token = match env::var(ROLLBAR_TOKEN_VAR) {
        Ok(token) if token.trim().is_empty() => {
            return Err(anyhow::anyhow!("{ROLLBAR_TOKEN_VAR} is set but empty"));
        }
        Ok(token) => Some(token),
        Err(env::VarError::NotPresent) => {
            warn!("{ROLLBAR_TOKEN_VAR} not set; reports will only be logged");
            None
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to read {ROLLBAR_TOKEN_VAR}: {e}")),
    };

    let default_environment = match env::var(ROLLBAR_ENV_VAR) {
        Ok(label) => parse_environment(Some(&label))?,
        Err(env::VarError::NotPresent) => parse_environment(None)?,
        Err(e) => return Err(anyhow::anyhow!("Failed to read {ROLLBAR_ENV_VAR}: {e}")),
    };

    info!(
        rollbar_enabled = rollbar_token.is_some(),
        default_environment = %default_environment,
        "Loaded configuration from environment"
    );

    Ok(AppConfig {
        rollbar_token,
        default_environment,
    })
}

//! Rollbar client implementing the core [`ErrorReporter`] trait.
//!
//! Each report becomes one item POSTed to the Rollbar item API. The
//! environment comes from the run's [`ReportContext`], not from process-wide
//! state, so concurrent runs never see each other's context.

use std::time::Duration;

use async_trait::async_trait;
use lesson_unzipper_core::contract::{ErrorReporter, ReportContext, ReportError, ReportLevel};
use serde::Serialize;

pub const ROLLBAR_ITEM_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";

/// Upper bound on one report round trip. A stalled endpoint must not hold
/// the invocation open until the Lambda deadline.
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

pub struct RollbarReporter {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
struct ItemPayload<'a> {
    access_token: &'a str,
    data: ItemData<'a>,
}

#[derive(Debug, Serialize)]
struct ItemData<'a> {
    environment: &'a str,
    level: String,
    platform: &'static str,
    language: &'static str,
    body: ItemBody<'a>,
}

#[derive(Debug, Serialize)]
struct ItemBody<'a> {
    message: MessageBody<'a>,
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    body: &'a str,
    run_id: String,
}

impl RollbarReporter {
    pub fn new(access_token: String) -> Result<Self, ReportError> {
        Self::with_endpoint(
            access_token,
            ROLLBAR_ITEM_ENDPOINT.to_string(),
            REPORT_TIMEOUT,
        )
    }

    pub fn with_endpoint(
        access_token: String,
        endpoint: String,
        timeout: Duration,
    ) -> Result<Self, ReportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build Rollbar HTTP client: {e}"))?;
        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    fn payload<'a>(
        &'a self,
        level: ReportLevel,
        message: &'a str,
        context: &'a ReportContext,
    ) -> ItemPayload<'a> {
        ItemPayload {
            access_token: &self.access_token,
            data: ItemData {
                environment: context.environment.as_str(),
                level: level.to_string(),
                platform: "lambda",
                language: "rust",
                body: ItemBody {
                    message: MessageBody {
                        body: message,
                        run_id: context.run_id.to_string(),
                    },
                },
            },
        }
    }
}

#[async_trait]
impl ErrorReporter for RollbarReporter {
    async fn report(
        &self,
        level: ReportLevel,
        message: &str,
        context: &ReportContext,
    ) -> Result<(), ReportError> {
        let payload = self.payload(level, message, context);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "Rollbar rejected report");
            return Err(format!("Rollbar responded with {status}: {body}").into());
        }
        tracing::debug!(
            level = %level,
            run_id = %context.run_id,
            "Report sent to Rollbar"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_unzipper_core::notification::Environment;

    #[test]
    fn payload_carries_run_environment_and_message() {
        let reporter = RollbarReporter::new("post_server_item_token".into()).unwrap();
        let context = ReportContext::new(Environment::Staging);
        let payload = reporter.payload(
            ReportLevel::Error,
            "Error processing lesson: demo.zip - Unable to unzip lesson: invalid Zip archive",
            &context,
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["access_token"], "post_server_item_token");
        assert_eq!(json["data"]["environment"], "staging");
        assert_eq!(json["data"]["level"], "error");
        assert_eq!(
            json["data"]["body"]["message"]["body"],
            "Error processing lesson: demo.zip - Unable to unzip lesson: invalid Zip archive"
        );
        assert_eq!(
            json["data"]["body"]["message"]["run_id"],
            context.run_id.to_string()
        );
    }

    #[test]
    fn info_reports_use_info_level() {
        let reporter = RollbarReporter::new("token".into()).unwrap();
        let context = ReportContext::new(Environment::Production);
        let payload =
            reporter.payload(ReportLevel::Info, "Attempting to process lesson", &context);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["data"]["level"], "info");
        assert_eq!(json["data"]["environment"], "production");
    }

    #[tokio::test]
    async fn report_gives_up_on_a_stalled_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without ever answering.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let reporter = RollbarReporter::with_endpoint(
            "token".into(),
            format!("http://{addr}/api/1/item/"),
            Duration::from_millis(500),
        )
        .unwrap();
        let context = ReportContext::new(Environment::Production);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            reporter.report(ReportLevel::Info, "Attempting to process lesson", &context),
        )
        .await
        .expect("report should return before the outer bound");

        assert!(result.is_err(), "a silent endpoint must surface as a report error");
    }
}

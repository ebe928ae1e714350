use std::fmt;

use crate::contract::StoreError;

/// Pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Notification,
    Fetch,
    Extract,
    Patch,
    Publish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Notification => "notification",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Patch => "patch",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a lesson run can fail. The display text is the message sent to
/// the error tracker: a stage-specific prefix followed by the cause.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid transfer notification: {0}")]
    InvalidNotification(String),

    #[error("Unable to fetch {bucket}/{key} from s3: {source}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Unable to unzip lesson: {0}")]
    UnreadableArchive(#[from] zip::result::ZipError),

    #[error("Unable to fix lesson javascript: {name} is not valid UTF-8: {source}")]
    UnprocessableContent {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Unable to upload new lesson: {key}: {source}")]
    Publish {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidNotification(_) => Stage::Notification,
            PipelineError::Fetch { .. } => Stage::Fetch,
            PipelineError::UnreadableArchive(_) => Stage::Extract,
            PipelineError::UnprocessableContent { .. } => Stage::Patch,
            PipelineError::Publish { .. } => Stage::Publish,
        }
    }
}

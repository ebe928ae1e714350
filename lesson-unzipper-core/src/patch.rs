//! Rewrites the lesson runtime so completion is signalled to the embedding page
//! via `postMessage` instead of the authoring tool's parent hooks.

use tracing::{debug, error, info};

use crate::archive::ArchiveEntry;
use crate::error::PipelineError;

/// Any entry whose name contains this substring is patched.
pub const PATCH_TARGET: &str = "user.js";

pub const LESSON_COMPLETED_EVENT: &str = "window.parent.sendLessonCompletedEvent()";
pub const DLC_TRANSITION: &str = "getDLCTransition('lesson')";
pub const POST_MESSAGE_COMPLETED: &str = r#"window.parent.postMessage("lesson_completed", "*")"#;

/// A file ready for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Patch every qualifying entry and pass the rest through untouched.
///
/// The output always has the same length and order as `entries`.
pub fn patch(entries: Vec<ArchiveEntry>) -> Result<Vec<TransformedFile>, PipelineError> {
    let mut files = Vec::with_capacity(entries.len());
    let mut patched = 0usize;

    for entry in entries {
        if entry.name.contains(PATCH_TARGET) {
            let bytes = patch_lesson_script(&entry.name, entry.bytes)?;
            patched += 1;
            files.push(TransformedFile {
                name: entry.name,
                bytes,
            });
        } else {
            files.push(TransformedFile {
                name: entry.name,
                bytes: entry.bytes,
            });
        }
    }

    info!(files = files.len(), patched, "Lesson files patched");
    Ok(files)
}

fn patch_lesson_script(name: &str, bytes: Vec<u8>) -> Result<Vec<u8>, PipelineError> {
    let text = String::from_utf8(bytes).map_err(|e| {
        error!(name, error = %e, "Lesson script is not valid UTF-8");
        PipelineError::UnprocessableContent {
            name: name.to_string(),
            source: e,
        }
    })?;

    let text = text
        .replacen(LESSON_COMPLETED_EVENT, POST_MESSAGE_COMPLETED, 1)
        .replacen(DLC_TRANSITION, POST_MESSAGE_COMPLETED, 1);
    debug!(name, size = text.len(), "Patched lesson script");
    Ok(text.into_bytes())
}

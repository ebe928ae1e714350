//! Key derivation, content typing and the single-file write to the
//! destination bucket.

use tracing::{error, info};

use crate::contract::{AccessPolicy, ContentDisposition, ObjectPublisher, PutObjectRequest};
use crate::error::PipelineError;
use crate::patch::TransformedFile;

/// Build the destination key for `name` from the archive's key.
///
/// Only the first `.zip` is removed and it need not be a suffix:
/// `"archive.zip.zip"` becomes `"archive.zip"`.
pub fn destination_key(source_key: &str, name: &str) -> String {
    format!("{}/{}", source_key.replacen(".zip", "", 1), name)
}

/// Guess a MIME type from whatever follows the last `.` in `key`.
pub fn content_type_for(key: &str) -> Option<String> {
    let extension = key.rsplit('.').next().unwrap_or(key);
    mime_guess::from_ext(extension)
        .first_raw()
        .map(str::to_string)
}

/// Write one file to `destination_bucket`, returning the key written.
pub async fn publish<P>(
    publisher: &P,
    file: TransformedFile,
    destination_bucket: &str,
    source_key: &str,
) -> Result<String, PipelineError>
where
    P: ObjectPublisher + ?Sized,
{
    let key = destination_key(source_key, &file.name);
    let content_type = content_type_for(&key);
    let size = file.bytes.len();

    let req = PutObjectRequest {
        bucket: destination_bucket.to_string(),
        key: key.clone(),
        body: file.bytes,
        content_type,
        access_policy: AccessPolicy::Private,
        content_disposition: ContentDisposition::Inline,
    };

    match publisher.put_object(req).await {
        Ok(()) => {
            info!(bucket = destination_bucket, key = %key, size, "Published lesson file");
            Ok(key)
        }
        Err(e) => {
            error!(
                bucket = destination_bucket,
                key = %key,
                error = %e,
                "Failed to publish lesson file"
            );
            Err(PipelineError::Publish { key, source: e })
        }
    }
}

//! Reads a zipped lesson bundle into memory.

use std::io::{self, Cursor, Read};

use tracing::{debug, info, warn};

use crate::error::PipelineError;

/// One entry as stored in the archive. Directory entries keep their trailing
/// `/` and carry no bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Extract every entry of a zip archive, in storage order, with decompressed bytes.
pub fn extract(archive_bytes: &[u8]) -> Result<Vec<ArchiveEntry>, PipelineError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let name = file.name().to_string();
        let declared = file.size();
        // The declared size is untrusted header data; never preallocate from it.
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(zip::result::ZipError::Io)?;
        if bytes.len() as u64 != declared {
            return Err(size_mismatch(&name, declared, bytes.len()));
        }
        debug!(name = %name, size = bytes.len(), "Extracted archive entry");
        entries.push(ArchiveEntry { name, bytes });
    }

    info!(count = entries.len(), "Archive extracted");
    Ok(entries)
}

fn size_mismatch(name: &str, declared: u64, actual: usize) -> PipelineError {
    warn!(name, declared, actual, "Archive entry size does not match its header");
    PipelineError::UnreadableArchive(zip::result::ZipError::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("entry {name} declares {declared} bytes but holds {actual}"),
    )))
}

//! Saving downloaded files.
//!
//! Content is written to a temporary file inside the destination directory
//! and renamed into place once complete. The temporary file is removed on
//! every failure path, so repeated downloads never leave partial files
//! behind.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::api::{ApiError, Payload};

/// Prefix of in-flight download files.
const PARTIAL_PREFIX: &str = ".minidrive-";
const PARTIAL_SUFFIX: &str = ".part";

/// Local name for a remote file: its last path component, with anything
/// that could point outside the download directory rejected.
pub fn local_name(filename: &str) -> Result<String, ApiError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(ApiError::Validation(format!(
            "Cannot save a file named {:?}",
            filename
        )));
    }
    Ok(name.to_string())
}

/// Write `payload` to `dir/<local name of filename>` and return the final path.
pub async fn save(payload: Payload, dir: &Path, filename: &str) -> Result<PathBuf, ApiError> {
    let target = dir.join(local_name(filename)?);
    tokio::fs::create_dir_all(dir).await?;

    let partial = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .suffix(PARTIAL_SUFFIX)
        .tempfile_in(dir)?;
    // The TempPath deletes the file when dropped, which covers every early return below.
    let (file, partial_path) = partial.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut written: u64 = 0;
    match payload {
        Payload::Streamed(response) => {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
        }
        Payload::Buffered(bytes) => {
            file.write_all(&bytes).await?;
            written = bytes.len() as u64;
        }
    }
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    partial_path.persist(&target).map_err(|e| ApiError::Io(e.error))?;
    debug!(path = %target.display(), bytes = written, "Download saved");
    Ok(target)
}

//! Streamed saves to user-chosen destinations.
//!
//! Bridges a remote byte stream to a local file. Both ends are released on
//! every exit path: the destination handle closes on drop, and a mid-copy
//! failure surfaces the stage that failed instead of leaking a half-open
//! file. The destination path always comes from the caller; nothing here
//! prompts the user.

use std::io;
use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{RemoteError, ServiceError, TransferStage};

fn stage_err(stage: TransferStage, source: io::Error) -> ServiceError {
    ServiceError::Transfer { stage, source }
}

/// Copy a remote byte stream into `dest`, returning the destination path.
pub async fn save_stream<S>(dest: &Path, mut stream: S) -> Result<PathBuf, ServiceError>
where
    S: Stream<Item = Result<bytes::Bytes, RemoteError>> + Unpin,
{
    let mut out = File::create(dest)
        .await
        .map_err(|e| stage_err(TransferStage::Open, e))?;

    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| stage_err(TransferStage::Read, io::Error::other(e)))?;
        out.write_all(&chunk)
            .await
            .map_err(|e| stage_err(TransferStage::Write, e))?;
        written += chunk.len() as u64;
    }

    out.flush()
        .await
        .map_err(|e| stage_err(TransferStage::Flush, e))?;
    debug!(dest = %dest.display(), bytes = written, "stream saved");
    Ok(dest.to_path_buf())
}

/// Write an in-memory payload to `dest` (UI export helper).
pub async fn save_bytes(dest: &Path, content: &[u8]) -> Result<PathBuf, ServiceError> {
    tokio::fs::write(dest, content)
        .await
        .map_err(|e| stage_err(TransferStage::Write, e))?;
    Ok(dest.to_path_buf())
}

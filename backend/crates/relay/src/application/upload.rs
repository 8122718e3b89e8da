//! Upload Relay Use Case
//!
//! The request body is streamed into a staging file first, then handed to
//! the pinning service. `StagedUpload` owns the file and removes it on drop,
//! so the file is deleted whichever way the relay finishes.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::domain::entities::PinContent;
use crate::domain::repository::PinningService;
use crate::error::{UploadError, UploadResult};

/// One uploaded file, staged on local disk
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    writer: File,
    file_name: String,
    content_type: Option<String>,
    len: u64,
}

impl StagedUpload {
    /// Create an empty staging file under `dir`
    pub async fn create(
        dir: &Path,
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> UploadResult<Self> {
        fs::create_dir_all(dir).await?;
        let dir = dir.to_path_buf();
        let (file, handle) = tokio::task::spawn_blocking(move || -> io::Result<_> {
            let file = tempfile::Builder::new()
                .prefix("upload-")
                .tempfile_in(&dir)?;
            let handle = file.as_file().try_clone()?;
            Ok((file, handle))
        })
        .await
        .map_err(io::Error::other)??;

        Ok(Self {
            file,
            writer: File::from_std(handle),
            file_name: file_name
                .filter(|n| !n.is_empty())
                .unwrap_or("upload")
                .to_string(),
            content_type: content_type.map(str::to_owned),
            len: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> UploadResult<()> {
        self.writer.write_all(chunk).await?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read back everything written so far
    async fn read_content(&mut self) -> UploadResult<PinContent> {
        self.writer.flush().await?;
        let bytes = fs::read(self.file.path()).await?;
        Ok(PinContent {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes,
        })
    }

    /// Delete the staging file off the async workers
    async fn remove(self) {
        let Self { file, writer, .. } = self;
        drop(writer);
        match tokio::task::spawn_blocking(move || file.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to remove staging file"),
            Err(e) => tracing::warn!(error = %e, "Staging cleanup task failed"),
        }
    }
}

/// Upload use case
pub struct UploadUseCase<P>
where
    P: PinningService,
{
    pinning: Arc<P>,
}

impl<P> UploadUseCase<P>
where
    P: PinningService,
{
    pub fn new(pinning: Arc<P>) -> Self {
        Self { pinning }
    }

    /// Pin the staged file and return its content identifier
    ///
    /// Consumes the staging file; it is removed before this returns.
    pub async fn execute(&self, mut staged: StagedUpload) -> UploadResult<String> {
        let content = staged.read_content().await;
        staged.remove().await;
        let content = content?;

        let size = content.bytes.len();
        let file_name = content.file_name.clone();
        let cid = self.pinning.pin(content).await?;
        if cid.is_empty() {
            return Err(UploadError::Provider(
                "Pinning service returned no content identifier".to_string(),
            ));
        }

        tracing::info!(file_name = %file_name, size, cid = %cid, "File pinned");
        Ok(cid)
    }
}

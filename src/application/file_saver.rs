use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    api::ApiClient,
    domain::AppError,
    utils::{sanitize_filename, unique_path},
};

pub const SUGGESTED_FILE_NAME: &str = "zoom_recording.mp4";

/// Platform side of "save this URL as a file".
///
/// `trigger` hands the save off and returns; whether the bytes eventually
/// land on disk is not reported back.
pub trait FileSaver: Send + Sync {
    fn trigger(&self, download_url: &str, file_name: &str) -> Result<(), AppError>;
}

/// Streams downloads into a directory, the way a browser saves into the
/// user's Downloads folder.
///
/// Bytes go to a hidden `.part` file next to the target and are renamed into
/// place only once the body has been read in full. Nothing is left behind
/// when the request or the transfer fails.
#[derive(Clone)]
pub struct DownloadDirSaver {
    api_client: ApiClient,
    dir: PathBuf,
}

impl DownloadDirSaver {
    pub fn new(api_client: ApiClient, dir: PathBuf) -> Self {
        Self { api_client, dir }
    }

    /// Download `url` into the directory as `file_name`, calling `on_progress`
    /// with the fraction written so far (0.0 when the size is unknown).
    /// Returns the final path.
    pub async fn save(
        &self,
        url: &str,
        file_name: &str,
        mut on_progress: impl FnMut(f32) + Send,
    ) -> Result<PathBuf, AppError> {
        let (total, stream) = self
            .api_client
            .download_file_stream(url)
            .await
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Io(format!("Cannot create {}: {}", self.dir.display(), e))
        })?;

        let file_name = sanitize_filename(file_name);
        let part = self
            .dir
            .join(format!(".{}.{}.part", file_name, Uuid::new_v4().simple()));

        let result = match write_part(&part, stream, total, &mut on_progress).await {
            Ok(()) => self.publish(&part, &file_name).await,
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&part).await {
                debug!(path = %part.display(), error = %e, "no partial file to remove");
            }
        }
        result
    }

    /// Move a finished `.part` file to the first free name.
    async fn publish(&self, part: &Path, file_name: &str) -> Result<PathBuf, AppError> {
        let target = unique_path(&self.dir, file_name)
            .await
            .map_err(|e| AppError::Io(e.to_string()))?;
        tokio::fs::rename(part, &target)
            .await
            .map_err(|e| AppError::Io(format!("Failed to move file into place: {}", e)))?;
        Ok(target)
    }
}

async fn write_part(
    part: &Path,
    stream: impl Stream<Item = crate::api::Result<bytes::Bytes>>,
    total: Option<u64>,
    on_progress: &mut (impl FnMut(f32) + Send),
) -> Result<(), AppError> {
    let mut file = tokio::fs::File::create(part)
        .await
        .map_err(|e| AppError::Io(format!("Failed to create file: {}", e)))?;

    let mut stream = std::pin::pin!(stream);
    let mut written: u64 = 0;
    on_progress(0.0);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::ClientError(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Io(format!("Write error: {}", e)))?;

        written += chunk.len() as u64;
        on_progress(match total {
            Some(total) if total > 0 => written as f32 / total as f32,
            _ => 0.0,
        });
    }

    file.sync_all()
        .await
        .map_err(|e| AppError::Io(format!("Failed to sync file: {}", e)))
}

impl FileSaver for DownloadDirSaver {
    fn trigger(&self, download_url: &str, file_name: &str) -> Result<(), AppError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::ClientError(format!("No async runtime: {}", e)))?;

        let saver = self.clone();
        let url = download_url.to_string();
        let file_name = file_name.to_string();
        info!(dir = %self.dir.display(), %file_name, "saving recording");

        runtime.spawn(async move {
            let progress = |fraction: f32| debug!("saved {:.1}%", fraction * 100.0);
            match saver.save(&url, &file_name, progress).await {
                Ok(path) => info!(path = %path.display(), "recording saved"),
                Err(e) => warn!(error = %e, "saving recording failed"),
            }
        });

        Ok(())
    }
}

//! Getting the input video onto local disk.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{NarraiError, Result};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A video on local disk. Downloaded copies are deleted on drop.
#[derive(Debug)]
pub struct VideoFile {
    path: PathBuf,
    size_bytes: u64,
    temporary: bool,
}

impl VideoFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

impl Drop for VideoFile {
    fn drop(&mut self) {
        if !self.temporary {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Cleaned up temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to clean up temp file"),
        }
    }
}

fn too_large(size_bytes: u64, limit_bytes: u64) -> NarraiError {
    NarraiError::VideoTooLarge {
        size_mb: size_bytes as f64 / BYTES_PER_MB,
        limit_mb: limit_bytes / (1024 * 1024),
    }
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Resolves `source` (a path or an http(s) URL) to a local file no larger than `limit_bytes`.
pub async fn open(source: &str, limit_bytes: u64, temp_dir: &Path) -> Result<VideoFile> {
    if is_url(source) {
        download(source, limit_bytes, temp_dir).await
    } else {
        open_local(Path::new(source), limit_bytes)
    }
}

pub fn open_local(path: &Path, limit_bytes: u64) -> Result<VideoFile> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(NarraiError::VideoMissing(path.to_path_buf())),
    };
    if metadata.len() > limit_bytes {
        return Err(too_large(metadata.len(), limit_bytes));
    }
    info!(path = %path.display(), bytes = metadata.len(), "Video accepted");
    Ok(VideoFile {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        temporary: false,
    })
}

/// Streams `url` into `temp_dir`, aborting as soon as the body passes `limit_bytes`.
pub async fn download(url: &str, limit_bytes: u64, temp_dir: &Path) -> Result<VideoFile> {
    let mut response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| NarraiError::Download(e.to_string()))?;

    if let Some(length) = response.content_length() {
        if length > limit_bytes {
            return Err(too_large(length, limit_bytes));
        }
    }

    tokio::fs::create_dir_all(temp_dir).await?;
    let mut video = VideoFile {
        path: temp_dir.join(format!("video_{}.mp4", uuid::Uuid::new_v4())),
        size_bytes: 0,
        temporary: true,
    };
    info!(url, path = %video.path.display(), "Downloading video");

    let mut file = tokio::fs::File::create(&video.path).await?;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| NarraiError::Download(e.to_string()))?
    {
        video.size_bytes += chunk.len() as u64;
        if video.size_bytes > limit_bytes {
            return Err(too_large(video.size_bytes, limit_bytes));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    info!(bytes = video.size_bytes, "Video downloaded");
    Ok(video)
}

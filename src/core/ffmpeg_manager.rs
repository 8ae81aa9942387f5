// FFmpegManager - locates ffmpeg and runs stream copies through it
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::transcode::{Artifact, MediaRef, Transcoder};
use crate::error::{LivegrabError, Result};

/// Resolve the ffmpeg binary.
///
/// Priority:
/// 1. Explicit path from the config (must exist)
/// 2. `ffmpeg` on the system PATH
pub fn locate_ffmpeg(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = configured {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(path);
        }
        return Err(LivegrabError::config(format!(
            "configured ffmpeg not found: {}",
            path.display()
        )));
    }

    which::which("ffmpeg")
        .map_err(|e| LivegrabError::config(format!("ffmpeg not found in PATH: {}", e)))
}

/// Transcoder backed by the ffmpeg command line tool
pub struct FFmpegManager {
    binary: PathBuf,
}

impl FFmpegManager {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    /// Arguments for a passthrough copy from `source` to `dest`
    pub fn copy_args(source: &MediaRef, dest: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            source.as_input(),
            "-c".to_string(),
            "copy".to_string(),
            dest.to_string_lossy().to_string(),
        ]
    }

    /// Run `ffmpeg -version` and return the first line
    pub async fn verify(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(LivegrabError::transcode(format!(
                "ffmpeg -version failed with status: {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl Transcoder for FFmpegManager {
    async fn transcode(&self, source: &MediaRef, dest: &Path) -> Result<Artifact> {
        log::debug!("ffmpeg {} -> {}", source, dest.display());

        let output = Command::new(&self.binary)
            .args(Self::copy_args(source, dest))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| LivegrabError::transcode(format!("failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LivegrabError::transcode(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let metadata = tokio::fs::metadata(dest).await.map_err(|e| {
            LivegrabError::transcode(format!("ffmpeg produced no file at {}: {}", dest.display(), e))
        })?;

        Ok(Artifact {
            path: dest.to_path_buf(),
            size: metadata.len(),
        })
    }
}

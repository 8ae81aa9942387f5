//! Capture pipeline for a single live source.
//!
//! notify → capture to a temp file → finalize (remux into the output folder,
//! or discard in check-only mode) → report. Nothing here retries; the outcome
//! is returned so the scheduler can release the source and move on.

use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::notifier::Notifier;
use crate::core::sources::CandidateSource;
use crate::core::transcode::{MediaRef, Transcoder};

pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H.%M.%S";
pub const WORKING_EXTENSION: &str = "flv";
pub const FINAL_EXTENSION: &str = "mp4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    NotLive,
    TransportFailure(String),
    EmptyStream,
    /// Remux failed, or the temp file could not be removed afterwards
    FinalizeFailure(String),
    /// `output` is `None` for check-only runs
    Success { output: Option<PathBuf> },
}

impl CaptureOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureOutcome::Success { .. })
    }
}

impl fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureOutcome::NotLive => f.write_str("not live"),
            CaptureOutcome::TransportFailure(e) => write!(f, "capture failed: {}", e),
            CaptureOutcome::EmptyStream => f.write_str("capture produced no data"),
            CaptureOutcome::FinalizeFailure(e) => write!(f, "finalize failed: {}", e),
            CaptureOutcome::Success { output: Some(path) } => {
                write!(f, "saved {}", path.display())
            }
            CaptureOutcome::Success { output: None } => f.write_str("validated (check only)"),
        }
    }
}

/// File stem shared by the temp and final artifacts
pub fn capture_stem(source: &CandidateSource, timestamp: &str) -> String {
    format!("{}{}.{}", source.prefix, timestamp, source.variant)
}

pub struct CapturePipeline {
    transcoder: Arc<dyn Transcoder>,
    notifier: Arc<dyn Notifier>,
    temp_dir: PathBuf,
}

impl CapturePipeline {
    pub fn new(
        transcoder: Arc<dyn Transcoder>,
        notifier: Arc<dyn Notifier>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transcoder,
            notifier,
            temp_dir: temp_dir.into(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Capture a source that was just probed live
    pub async fn run(&self, source: &CandidateSource) -> CaptureOutcome {
        if source.notify {
            self.alert(source);
        }
        log::info!("stream start {} ({})", source.name, source.url);

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let stem = capture_stem(source, &timestamp);
        let temp_path = self.temp_dir.join(format!("{}.{}", stem, WORKING_EXTENSION));

        let outcome = match self.capture(source, &temp_path).await {
            Some(failure) => failure,
            None => self.finalize(source, &stem, &temp_path).await,
        };

        if outcome.is_success() {
            log::info!("download completed, name = {}: {}", source.name, outcome);
        } else {
            log::warn!("download failed, name = {}: {}", source.name, outcome);
        }
        outcome
    }

    /// Fire the start alert on its own task; capture never waits for it
    fn alert(&self, source: &CandidateSource) {
        let notifier = Arc::clone(&self.notifier);
        let name = source.name.clone();
        let icon = source.icon.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&name, icon.as_deref()).await {
                log::warn!("Alert for {} failed: {}", name, e);
            }
        });
    }

    /// Pull the stream into `temp_path`; returns the failure outcome, if any
    async fn capture(&self, source: &CandidateSource, temp_path: &Path) -> Option<CaptureOutcome> {
        let input = MediaRef::Url(source.url.clone());

        match self.transcoder.transcode(&input, temp_path).await {
            Ok(artifact) if artifact.is_empty() => {
                discard(temp_path).await;
                Some(CaptureOutcome::EmptyStream)
            }
            Ok(artifact) => {
                log::debug!("Captured {} bytes to {}", artifact.size, artifact.path.display());
                None
            }
            Err(e) => {
                discard(temp_path).await;
                Some(CaptureOutcome::TransportFailure(e.to_string()))
            }
        }
    }

    async fn finalize(&self, source: &CandidateSource, stem: &str, temp_path: &Path) -> CaptureOutcome {
        if source.check_only {
            return match tokio::fs::remove_file(temp_path).await {
                Ok(()) => CaptureOutcome::Success { output: None },
                Err(e) => CaptureOutcome::FinalizeFailure(format!(
                    "remove {} failed: {}",
                    temp_path.display(),
                    e
                )),
            };
        }

        if let Err(e) = tokio::fs::create_dir_all(&source.folder).await {
            return CaptureOutcome::FinalizeFailure(format!(
                "create folder {} failed: {}; temp kept at {}",
                source.folder.display(),
                e,
                temp_path.display()
            ));
        }

        let output = source.folder.join(format!("{}.{}", stem, FINAL_EXTENSION));
        let input = MediaRef::File(temp_path.to_path_buf());

        if let Err(e) = self.transcoder.transcode(&input, &output).await {
            return CaptureOutcome::FinalizeFailure(format!(
                "{}; temp kept at {}",
                e,
                temp_path.display()
            ));
        }

        match tokio::fs::remove_file(temp_path).await {
            Ok(()) => CaptureOutcome::Success { output: Some(output) },
            Err(e) => CaptureOutcome::FinalizeFailure(format!(
                "remuxed to {} but remove {} failed: {}",
                output.display(),
                temp_path.display(),
                e
            )),
        }
    }
}

/// Remove a failed capture's temp artifact if one was written
async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("remove file failed, path = {}, err = {}", path.display(), e),
    }
}

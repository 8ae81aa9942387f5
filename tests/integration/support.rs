// Test doubles for the prober, transcoder and notifier capabilities

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use livegrab::core::{Artifact, Liveness, LivenessProbe, MediaRef, Notifier, Transcoder};
use livegrab::{LivegrabError, Result};

/// Prober with a fixed answer per URL; anything unlisted is offline
#[derive(Default)]
pub struct FakeProber {
    answers: Mutex<HashMap<String, Liveness>>,
    panics_on: Mutex<Option<String>>,
    probes: Mutex<HashMap<String, usize>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &str, liveness: Liveness) {
        self.answers.lock().unwrap().insert(url.to_string(), liveness);
    }

    pub fn panic_on(&self, url: &str) {
        *self.panics_on.lock().unwrap() = Some(url.to_string());
    }

    pub fn probe_count(&self, url: &str) -> usize {
        self.probes.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_probes(&self) -> usize {
        self.probes.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl LivenessProbe for FakeProber {
    async fn probe(&self, url: &str) -> Liveness {
        *self.probes.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        if self.panics_on.lock().unwrap().as_deref() == Some(url) {
            panic!("probe exploded for {}", url);
        }
        self.answers
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Liveness::Offline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    #[default]
    Ok,
    Fail,
    /// Writes some bytes, then fails
    FailAfterPartial,
    Empty,
    /// Reports success but leaves a directory at the temp path
    Undeletable,
}

/// Transcoder that writes small files instead of running ffmpeg.
///
/// Captures optionally wait on a gate so tests can hold them open.
#[derive(Default)]
pub struct FakeTranscoder {
    capture_mode: CaptureMode,
    fail_remux: bool,
    pin_temp: bool,
    gate: Option<Arc<Semaphore>>,
    active: Mutex<HashMap<String, usize>>,
    max_active: Mutex<HashMap<String, usize>>,
    captures: AtomicUsize,
    remuxes: AtomicUsize,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(capture_mode: CaptureMode) -> Self {
        Self {
            capture_mode,
            ..Self::default()
        }
    }

    pub fn failing_remux() -> Self {
        Self {
            fail_remux: true,
            ..Self::default()
        }
    }

    /// Remux succeeds, then swaps the temp file for a directory so it cannot be removed
    pub fn pinning_temp() -> Self {
        Self {
            pin_temp: true,
            ..Self::default()
        }
    }

    /// Captures block until the returned semaphore gets permits
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let transcoder = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (transcoder, gate)
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn remuxes(&self) -> usize {
        self.remuxes.load(Ordering::SeqCst)
    }

    pub fn active(&self, url: &str) -> usize {
        self.active.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn max_active(&self, url: &str) -> usize {
        self.max_active.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn max_active_any(&self) -> usize {
        self.max_active.lock().unwrap().values().copied().max().unwrap_or(0)
    }

    fn enter(&self, url: &str) {
        let mut active = self.active.lock().unwrap();
        let count = active.entry(url.to_string()).or_insert(0);
        *count += 1;
        let mut max = self.max_active.lock().unwrap();
        let peak = max.entry(url.to_string()).or_insert(0);
        *peak = (*peak).max(*count);
    }

    fn leave(&self, url: &str) {
        if let Some(count) = self.active.lock().unwrap().get_mut(url) {
            *count -= 1;
        }
    }

    async fn capture(&self, url: &str, dest: &Path) -> Result<Artifact> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        self.enter(url);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.leave(url);

        match self.capture_mode {
            CaptureMode::Ok => {
                tokio::fs::write(dest, b"FLV\x01fake stream").await?;
                Ok(Artifact {
                    path: dest.to_path_buf(),
                    size: 15,
                })
            }
            CaptureMode::Fail => Err(LivegrabError::transcode("connection reset")),
            CaptureMode::FailAfterPartial => {
                tokio::fs::write(dest, b"FLV").await?;
                Err(LivegrabError::transcode("stream dropped"))
            }
            CaptureMode::Empty => {
                tokio::fs::write(dest, b"").await?;
                Ok(Artifact {
                    path: dest.to_path_buf(),
                    size: 0,
                })
            }
            CaptureMode::Undeletable => {
                tokio::fs::create_dir_all(dest).await?;
                Ok(Artifact {
                    path: dest.to_path_buf(),
                    size: 15,
                })
            }
        }
    }

    async fn remux(&self, src: &Path, dest: &Path) -> Result<Artifact> {
        self.remuxes.fetch_add(1, Ordering::SeqCst);
        if self.fail_remux {
            return Err(LivegrabError::transcode(
                "invalid data found when processing input",
            ));
        }
        let size = tokio::fs::copy(src, dest).await?;
        if self.pin_temp {
            tokio::fs::remove_file(src).await?;
            tokio::fs::create_dir(src).await?;
        }
        Ok(Artifact {
            path: dest.to_path_buf(),
            size,
        })
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, source: &MediaRef, dest: &Path) -> Result<Artifact> {
        match source {
            MediaRef::Url(url) => self.capture(url, dest).await,
            MediaRef::File(path) => self.remux(path, dest).await,
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    hang: bool,
    names: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Records the alert, then never returns
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, name: &str, _icon: Option<&str>) -> Result<()> {
        self.names.lock().unwrap().push(name.to_string());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(LivegrabError::notify("no notification daemon"));
        }
        Ok(())
    }
}

/// Poll `condition` until it holds, panicking after two seconds
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Number of entries of any kind directly inside `dir`
pub fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|e| e.count()).unwrap_or(0)
}

/// Names of the files directly inside `dir`
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

//! Capability interface over the external media tool.
//!
//! The pipeline only ever asks for "copy this source into that destination".
//! Whether the source is a network stream or a file on disk is carried by
//! [`MediaRef`]; what tool does the work is hidden behind [`Transcoder`].

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Url(String),
    File(PathBuf),
}

impl MediaRef {
    /// Input argument as the media tool expects it
    pub fn as_input(&self) -> String {
        match self {
            MediaRef::Url(url) => url.clone(),
            MediaRef::File(path) => path.to_string_lossy().to_string(),
        }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRef::Url(url) => f.write_str(url),
            MediaRef::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// File produced by a successful transcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: u64,
}

impl Artifact {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Copy `source` into `dest` without re-encoding
    async fn transcode(&self, source: &MediaRef, dest: &Path) -> Result<Artifact>;
}

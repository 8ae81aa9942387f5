// Liveness probing of candidate endpoints over HTTP

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::Result;

/// Classification of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Live,
    /// 404: the broadcaster is simply offline on this endpoint
    Offline,
    /// Any other non-success status
    Unexpected(u16),
    /// Transport error or timeout
    Unreachable(String),
}

impl Liveness {
    pub fn is_live(&self) -> bool {
        matches!(self, Liveness::Live)
    }

    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            Liveness::Live
        } else if status == StatusCode::NOT_FOUND {
            Liveness::Offline
        } else {
            Liveness::Unexpected(status.as_u16())
        }
    }
}

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Liveness;
}

/// Probe that issues a GET and looks only at the status line
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("livegrab/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LivenessProbe for HttpProber {
    async fn probe(&self, url: &str) -> Liveness {
        match self.client.get(url).send().await {
            // The response is dropped unread; live streams never end on their own
            Ok(response) => {
                let liveness = Liveness::from_status(response.status());
                if let Liveness::Unexpected(code) = liveness {
                    log::info!("Probe {} returned status {}", url, code);
                }
                liveness
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "timed out".to_string()
                } else {
                    e.to_string()
                };
                log::debug!("Probe {} failed: {}", url, reason);
                Liveness::Unreachable(reason)
            }
        }
    }
}

// Best-effort desktop alerts when a capture starts

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{LivegrabError, Result};

pub const ALERT_TITLE: &str = "stream start";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, name: &str, icon: Option<&str>) -> Result<()>;
}

/// Notifier that does nothing, used when alerts are unwanted
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _name: &str, _icon: Option<&str>) -> Result<()> {
        Ok(())
    }
}

/// Sends alerts through the platform's notification command
pub struct DesktopNotifier;

impl DesktopNotifier {
    #[cfg(target_os = "macos")]
    fn command(name: &str, _icon: Option<&str>) -> Result<Command> {
        let script = format!(
            "display notification {:?} with title {:?}",
            name, ALERT_TITLE
        );
        let mut cmd = Command::new("osascript");
        cmd.arg("-e").arg(script);
        Ok(cmd)
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn command(name: &str, icon: Option<&str>) -> Result<Command> {
        let mut cmd = Command::new("notify-send");
        if let Some(icon) = icon {
            cmd.arg("-i").arg(icon);
        }
        cmd.arg(ALERT_TITLE).arg(name);
        Ok(cmd)
    }

    #[cfg(not(unix))]
    fn command(_name: &str, _icon: Option<&str>) -> Result<Command> {
        Err(LivegrabError::notify(
            "desktop notifications are not supported on this platform",
        ))
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, name: &str, icon: Option<&str>) -> Result<()> {
        let status = Self::command(name, icon)?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| LivegrabError::notify(format!("failed to run notifier: {}", e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(LivegrabError::notify(format!("notifier exited with {}", status)))
        }
    }
}

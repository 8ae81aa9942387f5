// Command handlers module
pub mod probe;
pub mod run;
pub mod sources;
pub mod version;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::core::Settings;

// Re-exports for cleaner imports
pub use probe::execute as probe;
pub use run::execute as run;
pub use sources::execute as sources;
pub use version::execute as version;

/// Load settings and apply command line overrides
pub fn load_settings(matches: &clap::ArgMatches) -> Result<Settings> {
    let config = matches.get_one::<PathBuf>("config");
    let mut settings = Settings::load(config.map(|p| p.as_path()))
        .context("Failed to load configuration")?;

    if matches.get_flag("check-only") {
        settings.defaults.check_only = true;
    }
    if let Some(secs) = matches.get_one::<u64>("interval") {
        settings.defaults.poll_interval_secs = Some(*secs);
    }

    Ok(settings)
}

/// Multi-thread runtime for probes and capture tasks
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("capture-worker")
        .build()
        .context("Failed to start async runtime")
}

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::core::ffmpeg_manager::locate_ffmpeg;
use crate::core::{
    expand, CapturePipeline, DesktopNotifier, FFmpegManager, HttpProber, Scheduler,
};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    // 1. Config and folders; any failure here is fatal
    let settings = super::load_settings(matches)?;
    settings
        .create_folders()
        .context("Failed to prepare output folders")?;

    // 2. Candidate sources, fixed for the process lifetime
    let sources = expand(&settings.broadcasters, &settings.defaults)
        .context("Invalid source configuration")?;
    if sources.is_empty() {
        log::warn!("No broadcasters configured; nothing will be captured");
    }

    // 3. ffmpeg
    let ffmpeg_path = locate_ffmpeg(settings.defaults.ffmpeg.as_deref())?;
    let ffmpeg = Arc::new(FFmpegManager::new(ffmpeg_path));

    if settings.defaults.check_only {
        log::info!("Check-only mode: captures are validated and discarded");
    }

    ctrlc::set_handler(|| {
        log::warn!("Interrupted; running captures are abandoned");
        std::process::exit(130);
    })
    .context("Failed to install Ctrl-C handler")?;

    let runtime = super::build_runtime()?;
    runtime.block_on(async move {
        match ffmpeg.verify().await {
            Ok(version) => log::info!("Using {} ({})", version, ffmpeg.binary_path().display()),
            Err(e) => log::warn!("Could not verify ffmpeg: {}", e),
        }

        let prober = Arc::new(HttpProber::new(settings.defaults.probe_timeout())?);
        let pipeline = Arc::new(CapturePipeline::new(
            ffmpeg,
            Arc::new(DesktopNotifier),
            settings.defaults.temp_folder(),
        ));

        let scheduler = Scheduler::new(
            sources,
            prober,
            pipeline,
            settings.defaults.poll_interval(),
        );
        scheduler.run().await;

        Ok::<(), anyhow::Error>(())
    })
}

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::core::{expand, HttpProber, Liveness, LivenessProbe};

/// Probe every candidate once and print which ones are live
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let settings = super::load_settings(matches)?;
    let sources = expand(&settings.broadcasters, &settings.defaults)
        .context("Invalid source configuration")?;

    let runtime = super::build_runtime()?;
    let results = runtime.block_on(async {
        let prober = Arc::new(HttpProber::new(settings.defaults.probe_timeout())?);

        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let prober = Arc::clone(&prober);
                let url = source.url.clone();
                tokio::spawn(async move { prober.probe(&url).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.context("Probe task failed")?);
        }
        Ok::<_, anyhow::Error>(results)
    })?;

    let mut live = 0;
    for (source, liveness) in sources.iter().zip(&results) {
        let status = match liveness {
            Liveness::Live => {
                live += 1;
                "LIVE".green().bold()
            }
            Liveness::Offline => "offline".dimmed(),
            Liveness::Unexpected(code) => format!("HTTP {}", code).yellow(),
            Liveness::Unreachable(reason) => format!("error: {}", reason).red(),
        };
        println!("{:<10} {:<16} {}", source.name, status, source.url);
    }

    println!();
    println!(
        "{} {}/{} sources live",
        "Done:".cyan().bold(),
        live,
        sources.len()
    );

    Ok(())
}

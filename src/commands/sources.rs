use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::expand;

/// Print the expanded candidate list without touching the network
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let settings = super::load_settings(matches)?;
    let sources = expand(&settings.broadcasters, &settings.defaults)
        .context("Invalid source configuration")?;

    println!(
        "{} {} broadcasters, {} candidate sources",
        "Sources:".cyan().bold(),
        settings.broadcasters.len(),
        sources.len()
    );
    if settings.defaults.check_only {
        println!("{}", "check-only mode".yellow());
    }
    println!();

    let mut current: Option<&str> = None;
    for source in &sources {
        if current != Some(source.name.as_str()) {
            current = Some(source.name.as_str());
            let notify = if source.notify { " 🔔" } else { "" };
            println!(
                "{}{}  {} {}  {} {}",
                source.name.green().bold(),
                notify,
                "folder:".dimmed(),
                source.folder.display(),
                "prefix:".dimmed(),
                source.prefix
            );
        }
        println!("  {:<14} {}", source.variant.dimmed(), source.url);
    }

    Ok(())
}

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use livegrab::commands;

fn cli() -> Command {
    Command::new("livegrab")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watches broadcasters' live endpoints and records them with ffmpeg")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Config file (defaults to config.json, then default_config.json)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("check-only")
                .long("check-only")
                .help("Validate captures without keeping any output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("SECS")
                .help("Seconds between polling passes")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .subcommand(Command::new("run").about("Poll all sources and record any that go live (default)"))
        .subcommand(Command::new("sources").about("List the candidate sources expanded from the config"))
        .subcommand(Command::new("probe").about("Probe every candidate source once and report liveness"))
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    livegrab::init_logging();

    let matches = cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("sources", _)) => commands::sources(&matches),
        Some(("probe", _)) => commands::probe(&matches),
        Some(("version", _)) => commands::version(),
        _ => commands::run(&matches),
    }
}

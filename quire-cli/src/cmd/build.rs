use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use quire_core::build_site;
use quire_core::config::{DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR};

use crate::config::BuildArgs;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("src")
                .short('s')
                .long("src")
                .value_name("DIR")
                .help("Source directory containing the posts/ folder")
                .default_value(DEFAULT_SOURCE_DIR),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("DIR")
                .help("Output directory for the generated site (wiped on every build)")
                .default_value(DEFAULT_OUTPUT_DIR),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("YAML configuration file")
                .default_value(DEFAULT_CONFIG_FILE),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let build_args = BuildArgs::from_matches(args);
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let paths = build_args.resolve(&cwd);

    let report = build_site(&paths)
        .with_context(|| format!("Failed to build site from {}", paths.root.display()))?;

    println!("Site built successfully in {}", report.output_dir.display());

    Ok(())
}

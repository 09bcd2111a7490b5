mod cmd;
mod config;

use anyhow::Result;
use clap::{Command, crate_version};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG wins; otherwise report build milestones
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    cmd::build::execute(&matches)
}

fn cli() -> Command {
    cmd::build::add_build_args(
        Command::new("quire")
            .version(crate_version!())
            .about("Build a static blog from a folder of Markdown posts"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_rejects_subcommands_and_unknown_flags() {
        assert!(cli().try_get_matches_from(["quire", "serve"]).is_err());
        assert!(cli().try_get_matches_from(["quire", "--watch"]).is_err());
    }
}

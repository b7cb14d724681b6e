//! `shortcuts` command line entry point.
//!
//! # Responsibility
//! - Open the save file named by `--store` (or the configured default).
//! - Dispatch one subcommand against `ShortcutStore` and print plain lines.

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use shortcuts_core::{default_log_level, default_store_path, init_logging, StoreConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "shortcuts", version, about = "Manage launcher shortcut groups")]
struct Cli {
    /// Save file to operate on [default: $SHORTCUTS_STORE_PATH or ./save.json]
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Do not check URLs over the network; only add the scheme prefix.
    #[arg(long, global = true)]
    offline: bool,

    /// Write rotated log files into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level used with --log-dir (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        start_logging(log_dir, cli.log_level.as_deref())?;
    }

    let mut config = StoreConfig::new(cli.store.unwrap_or_else(default_store_path));
    config.offline = cli.offline;
    commands::run(cli.command, &config)
}

fn start_logging(log_dir: &Path, level: Option<&str>) -> anyhow::Result<()> {
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("failed to resolve the working directory")?
            .join(log_dir)
    };
    let level = match level {
        Some(text) => text
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| anyhow::anyhow!("unknown log level `{text}`"))?,
        None => default_log_level(),
    };
    init_logging(level, &log_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::commands::{Command, StoreCommand};
    use super::Cli;
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from(["shortcuts", "groups", "--offline", "--store", "x.json"])
            .unwrap();
        assert!(cli.offline);
        assert_eq!(cli.store.unwrap().to_str(), Some("x.json"));
    }

    #[test]
    fn store_and_folder_subcommands_are_split() {
        let cli = Cli::try_parse_from(["shortcuts", "rename-group", "G_1", "Office"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Store(StoreCommand::RenameGroup { ref group_id, .. }) if group_id == "G_1"
        ));

        let cli = Cli::try_parse_from(["shortcuts", "addon-order", "addons"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::AddonOrder { ref extension, .. } if extension == "py"
        ));
    }
}

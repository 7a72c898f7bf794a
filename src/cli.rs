use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::Overrides;

/// Task list manager.
/// Tasks live in ~/.todo/storage.json, or on a remote endpoint via --remote.
#[derive(Parser)]
#[command(name = "todo", version, about = "Simple to-do list with local or remote storage")]
pub struct Cli {
    /// Path to a TOML config file (default: <data dir>/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding local storage and logs.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Use the remote CRUD endpoint at this URL.
    #[arg(long, global = true, value_name = "URL")]
    pub remote: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            data_dir: self.data_dir.clone(),
            remote: self.remote.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["todo", "add", "Buy", "milk", "--remote", "http://h/tasks"]).unwrap();
        assert_eq!(cli.remote.as_deref(), Some("http://h/tasks"));
        assert!(matches!(cli.command, Some(Commands::Add { ref text }) if text.join(" ") == "Buy milk"));
    }

    #[test]
    fn test_no_subcommand_means_ui() {
        let cli = Cli::try_parse_from(["todo", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }
}

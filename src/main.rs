//! # todo - task list CLI and terminal UI
//!
//! A small to-do list manager. Tasks can be added, edited, completed,
//! deleted, and filtered (all / pending / completed), either from the command
//! line or from an interactive terminal UI.
//!
//! ## Storage
//!
//! - **Local** (default): tasks and the theme preference are kept in
//!   `~/.todo/storage.json`, rewritten after every change.
//! - **Remote**: tasks live behind an HTTP CRUD endpoint (`--remote <URL>`,
//!   `TODO_ENDPOINT`, or `backend = "remote"` in `config.toml`). Every change
//!   round-trips to the server; completing a task is shown immediately and
//!   undone if the server rejects it.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the UI
//! todo
//!
//! # Add and list from the shell
//! todo add Buy milk
//! todo list --filter pending
//!
//! # Against a server
//! todo --remote http://localhost:5000/tasks list
//! ```

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::info;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod remote;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use controller::Controller;
use db::{LocalStore, Storage};
use fields::Backend;
use remote::RemoteStore;
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    // Commands that don't need a store
    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd_completions(*shell);
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.overrides())?;
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data directory {}", config.data_dir.display()))?;

    let command = cli.command.unwrap_or(Commands::Ui);
    if matches!(command, Commands::Ui) {
        logging::init_file(&config.data_dir, cli.verbose)?;
    } else {
        logging::init_stderr(cli.verbose)?;
    }

    let storage = Storage::in_dir(&config.data_dir);
    let store: Box<dyn TaskStore> = match config.backend {
        Backend::Local => Box::new(LocalStore::open(storage.clone())),
        Backend::Remote => {
            let url = config
                .endpoint
                .as_deref()
                .context("remote backend selected but no endpoint configured")?;
            Box::new(RemoteStore::new(url)?)
        }
    };
    info!(backend = store.backend_name(), "store ready");
    let mut controller = Controller::new(store, storage);

    if matches!(command, Commands::Ui) {
        cmd_ui(controller);
        return Ok(());
    }

    load_or_exit(&mut controller);
    match command {
        Commands::Add { text } => cmd_add(&mut controller, text),
        Commands::List { filter } => cmd_list(&mut controller, filter),
        Commands::Edit { id, text } => cmd_edit(&mut controller, id, text),
        Commands::Toggle { id } => cmd_toggle(&mut controller, id),
        Commands::Delete { id } => cmd_delete(&mut controller, id),
        Commands::Theme { theme } => cmd_theme(&mut controller, theme),
        Commands::Ui | Commands::Completions { .. } => {}
    }
    Ok(())
}

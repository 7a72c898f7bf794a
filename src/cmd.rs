//! Command implementations for the CLI interface.
//!
//! Every command goes through the [`Controller`], the same way the terminal UI
//! does. Failures are printed to stderr and exit with status 1.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::controller::Controller;
use crate::fields::{format_filter, Filter, Theme};
use crate::task::{Task, TaskId};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (default).
    Ui,

    /// Add a new task.
    Add {
        /// Task text. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks.
    List {
        /// Which tasks to show.
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
    },

    /// Replace the text of a task.
    Edit {
        /// Task ID.
        id: TaskId,
        /// New text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip a task between pending and completed.
    Toggle {
        /// Task ID.
        id: TaskId,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: TaskId,
    },

    /// Show or set the colour theme.
    Theme {
        #[arg(value_enum)]
        theme: Option<Theme>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Print the controller's error and exit.
fn exit_with_error(c: &Controller) -> ! {
    eprintln!("{}", c.error().unwrap_or("Operation failed."));
    std::process::exit(1);
}

/// Load the current list before running a command.
pub fn load_or_exit(c: &mut Controller) {
    if !c.refresh() {
        exit_with_error(c);
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(c: Controller) {
    if let Err(e) = run_tui(c) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

pub fn cmd_add(c: &mut Controller, text: Vec<String>) {
    c.set_compose(text.join(" "));
    if !c.can_submit() {
        eprintln!("Task text cannot be empty.");
        std::process::exit(1);
    }
    if !c.submit_new_task() {
        exit_with_error(c);
    }
    println!("Added. {} tasks remaining", c.remaining_count());
}

pub fn cmd_list(c: &mut Controller, filter: Filter) {
    c.set_filter(filter);
    let visible: Vec<&Task> = c.visible().collect();
    if visible.is_empty() {
        println!("{}", filter.empty_message());
    } else {
        print_table(&visible, c.editing_id());
    }
    println!();
    println!("{} tasks remaining ({} shown: {})", c.remaining_count(), visible.len(), format_filter(filter));
}

pub fn cmd_edit(c: &mut Controller, id: TaskId, text: Vec<String>) {
    if !c.begin_edit(id) {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    }
    c.set_draft(text.join(" "));
    if !c.submit_edit() {
        if c.error().is_none() {
            eprintln!("Task text cannot be empty.");
            std::process::exit(1);
        }
        exit_with_error(c);
    }
    println!("Updated {id}");
}

pub fn cmd_toggle(c: &mut Controller, id: TaskId) {
    if !c.toggle(id) {
        exit_with_error(c);
    }
    let done = c.tasks().iter().find(|t| t.id == id).is_some_and(|t| t.completed);
    if done {
        println!("Marked {id} done.");
    } else {
        println!("Reopened {id}");
    }
}

pub fn cmd_delete(c: &mut Controller, id: TaskId) {
    if !c.remove(id) {
        exit_with_error(c);
    }
    println!("Deleted {id}");
}

pub fn cmd_theme(c: &mut Controller, theme: Option<Theme>) {
    match theme {
        None => println!("{}", c.theme()),
        Some(theme) => {
            if !c.set_theme(theme) {
                exit_with_error(c);
            }
            println!("Theme set to {theme}");
        }
    }
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Print tasks as a table, marking the task being edited.
pub fn print_table(tasks: &[&Task], editing: Option<TaskId>) {
    println!("{:<15} {:<4} {}", "ID", "Done", "Text");
    for t in tasks {
        let mark = if t.completed { "[x]" } else { "[ ]" };
        let edit = if editing == Some(t.id) { " (editing)" } else { "" };
        println!("{:<15} {:<4} {}{}", t.id, mark, t.text, edit);
    }
}

//! Enumerations used to select views and presentation.
//!
//! The filter is transient view state; the theme is persisted as the plain
//! strings `"dark"` / `"light"`.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Which tasks the list view shows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Pending, Filter::Completed];

    /// Whether `task` is visible under this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    /// Cycle to the next filter tab.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Pending,
            Filter::Pending => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    /// Message shown when nothing matches.
    pub fn empty_message(self) -> &'static str {
        match self {
            Filter::All => "No tasks yet. Add your first task!",
            Filter::Pending => "No pending tasks!",
            Filter::Completed => "No completed tasks!",
        }
    }
}

/// Format a filter for display.
pub fn format_filter(f: Filter) -> &'static str {
    match f {
        Filter::All => "All",
        Filter::Pending => "Pending",
        Filter::Completed => "Completed",
    }
}

/// Display theme preference.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Value written to storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored value. Anything other than `"dark"` is light.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    fn task(completed: bool) -> Task {
        Task {
            id: TaskId(1),
            text: "X".into(),
            completed,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_filter_predicates() {
        assert!(Filter::All.matches(&task(true)));
        assert!(Filter::All.matches(&task(false)));
        assert!(Filter::Pending.matches(&task(false)));
        assert!(!Filter::Pending.matches(&task(true)));
        assert!(Filter::Completed.matches(&task(true)));
        assert!(!Filter::Completed.matches(&task(false)));
    }

    #[test]
    fn test_filter_cycle_visits_every_tab() {
        let mut f = Filter::All;
        for expected in [Filter::Pending, Filter::Completed, Filter::All] {
            f = f.next();
            assert_eq!(f, expected);
        }
    }

    #[test]
    fn test_theme_stored_values() {
        assert_eq!(Theme::from_stored("dark"), Theme::Dark);
        assert_eq!(Theme::from_stored("light"), Theme::Light);
        assert_eq!(Theme::from_stored("sepia"), Theme::Light);
        assert_eq!(Theme::Dark.as_str(), "dark");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}

//! Enumerations for TUI state management.

use crate::task::TaskId;

/// Which part of the screen receives key presses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    TaskList,
    Compose,
    Edit,
    Help,
}

/// A store-touching action queued by a key press.
///
/// The run loop draws a busy frame before applying it, since remote calls
/// block until the server answers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Submit,
    SaveEdit,
    Toggle(TaskId),
    Remove(TaskId),
    Refresh,
}

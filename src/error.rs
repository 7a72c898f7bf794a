//! Error types for task storage.

use crate::task::TaskId;

/// Errors raised by a [`TaskStore`](crate::store::TaskStore) operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Task text was empty after trimming.
    #[error("task text cannot be empty")]
    Validation,

    /// No task with the given id exists in the list.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// Transport failure talking to the remote endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The remote endpoint answered with a non-success status.
    #[error("server responded with status {0}")]
    Status(u16),

    /// Local storage could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the failure came from the remote endpoint.
    pub fn is_network(&self) -> bool {
        matches!(self, StoreError::Network(_) | StoreError::Status(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => StoreError::Status(status.as_u16()),
            None => StoreError::Network(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        assert_eq!(StoreError::NotFound(TaskId(7)).to_string(), "task 7 not found");
    }

    #[test]
    fn status_is_network() {
        assert!(StoreError::Status(500).is_network());
        assert!(StoreError::Network("refused".into()).is_network());
        assert!(!StoreError::Validation.is_network());
    }
}

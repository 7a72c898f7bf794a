//! The task store interface shared by the local and remote backends.

use crate::error::StoreError;
use crate::task::{Task, TaskId};

/// Owner of the authoritative task list.
///
/// Implementations mediate persistence: [`LocalStore`](crate::db::LocalStore)
/// writes through to key-value storage on every mutation, while
/// [`RemoteStore`](crate::remote::RemoteStore) round-trips each mutation
/// through an HTTP CRUD endpoint. Mutations return the updated list.
pub trait TaskStore {
    /// Current tasks in display order.
    fn list(&self) -> &[Task];

    /// Re-read the list from the backing store.
    fn refresh(&mut self) -> Result<&[Task], StoreError>;

    /// Append a task with the given text (trimmed).
    fn create(&mut self, text: &str) -> Result<&[Task], StoreError>;

    /// Replace the text of an existing task.
    fn update(&mut self, id: TaskId, text: &str) -> Result<&[Task], StoreError>;

    /// Remove a task.
    fn remove(&mut self, id: TaskId) -> Result<&[Task], StoreError>;

    /// Flip the completion flag of a task.
    fn toggle(&mut self, id: TaskId) -> Result<&[Task], StoreError>;

    /// Short name used in logs and the UI header.
    fn backend_name(&self) -> &'static str;

    /// Look up a task by id.
    fn get(&self, id: TaskId) -> Option<&Task> {
        self.list().iter().find(|t| t.id == id)
    }
}

/// Apply a mutation ahead of confirmation, undoing it if confirmation fails.
///
/// The prior value of `target` is snapshotted, `apply` runs against it, then
/// `confirm` sees the new value. On error the snapshot is restored and the
/// error returned.
pub fn optimistic<T, E>(
    target: &mut T,
    apply: impl FnOnce(&mut T),
    confirm: impl FnOnce(&T) -> Result<(), E>,
) -> Result<(), E>
where
    T: Clone,
{
    let snapshot = target.clone();
    apply(target);
    if let Err(e) = confirm(target) {
        *target = snapshot;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimistic_keeps_confirmed_value() {
        let mut value = false;
        let seen = std::cell::Cell::new(None);
        let result: Result<(), ()> = optimistic(
            &mut value,
            |v| *v = !*v,
            |v| {
                seen.set(Some(*v));
                Ok(())
            },
        );
        assert!(result.is_ok());
        assert!(value);
        assert_eq!(seen.get(), Some(true));
    }

    #[test]
    fn test_optimistic_rolls_back_on_failure() {
        let mut value = vec![1, 2];
        let result = optimistic(&mut value, |v| v.push(3), |_| Err("nope"));
        assert_eq!(result, Err("nope"));
        assert_eq!(value, vec![1, 2]);
    }
}

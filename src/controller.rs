//! View controller: transient view state plus intent dispatch into the store.
//!
//! The controller exclusively owns its [`TaskStore`] and holds everything the
//! screen needs besides the tasks themselves: the active filter, the compose
//! text, the per-task edit state machine, the loading flag and the last error.
//! Store failures never escape an intent; they become a single dismissible
//! message and the store's last consistent list stays on screen.

use tracing::{debug, warn};

use crate::db::Storage;
use crate::error::StoreError;
use crate::fields::{Filter, Theme};
use crate::store::TaskStore;
use crate::task::{normalise_text, Task, TaskId};

/// Inline edit state of the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing { id: TaskId, draft: String },
}

pub struct Controller {
    store: Box<dyn TaskStore>,
    prefs: Storage,
    filter: Filter,
    edit: EditState,
    compose: String,
    loading: bool,
    error: Option<String>,
    theme: Theme,
}

impl Controller {
    /// Wrap a store; the theme is read from `prefs`.
    pub fn new(store: Box<dyn TaskStore>, prefs: Storage) -> Self {
        let theme = prefs.theme();
        Controller {
            store,
            prefs,
            filter: Filter::default(),
            edit: EditState::Idle,
            compose: String::new(),
            loading: false,
            error: None,
            theme,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.list()
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn compose(&self) -> &str {
        &self.compose
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    /// Whether the add action should be enabled.
    pub fn can_submit(&self) -> bool {
        normalise_text(&self.compose).is_some()
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Id of the task being edited, if any.
    pub fn editing_id(&self) -> Option<TaskId> {
        match &self.edit {
            EditState::Editing { id, .. } => Some(*id),
            EditState::Idle => None,
        }
    }

    /// Tasks passing the current filter, in store order.
    pub fn visible(&self) -> impl Iterator<Item = &Task> + Clone + '_ {
        let filter = self.filter;
        self.store.list().iter().filter(move |t| filter.matches(t))
    }

    /// Number of tasks not yet completed.
    pub fn remaining_count(&self) -> usize {
        self.store.list().iter().filter(|t| !t.completed).count()
    }

    /// Run a store operation under the loading flag, capturing any failure.
    fn dispatch(
        &mut self,
        intent: &'static str,
        op: impl FnOnce(&mut dyn TaskStore) -> Result<(), StoreError>,
    ) -> bool {
        if self.loading {
            debug!(intent, "request in flight, ignoring intent");
            return false;
        }
        self.loading = true;
        let result = op(self.store.as_mut());
        self.loading = false;

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(intent, error = %e, "intent failed");
                self.error = Some(format!("Failed to {intent}: {e}"));
                false
            }
        }
    }

    /// Re-read the list from the store.
    pub fn refresh(&mut self) -> bool {
        self.dispatch("load tasks", |store| store.refresh().map(|_| ()))
    }

    /// Add the compose text as a new task, clearing it on success.
    pub fn submit_new_task(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        let text = self.compose.clone();
        let added = self.dispatch("add task", |store| store.create(&text).map(|_| ()));
        if added {
            self.compose.clear();
        }
        added
    }

    /// Enter edit mode for `id`, seeding the draft with its text.
    ///
    /// Any draft for another task is discarded.
    pub fn begin_edit(&mut self, id: TaskId) -> bool {
        let Some(task) = self.store.get(id) else {
            return false;
        };
        self.edit = EditState::Editing {
            id,
            draft: task.text.clone(),
        };
        true
    }

    /// Replace the draft text while editing.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let EditState::Editing { draft, .. } = &mut self.edit {
            *draft = text.into();
        }
    }

    /// Save the draft. Blank drafts are ignored and editing continues.
    pub fn submit_edit(&mut self) -> bool {
        let EditState::Editing { id, draft } = &self.edit else {
            return false;
        };
        if normalise_text(draft).is_none() {
            return false;
        }
        let (id, draft) = (*id, draft.clone());
        let saved = self.dispatch("save task", |store| store.update(id, &draft).map(|_| ()));
        if saved {
            self.edit = EditState::Idle;
        }
        saved
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Idle;
    }

    pub fn toggle(&mut self, id: TaskId) -> bool {
        self.dispatch("update task", |store| store.toggle(id).map(|_| ()))
    }

    pub fn remove(&mut self, id: TaskId) -> bool {
        let removed = self.dispatch("delete task", |store| store.remove(id).map(|_| ()));
        if removed && self.editing_id() == Some(id) {
            self.edit = EditState::Idle;
        }
        removed
    }

    /// Switch and persist the theme.
    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.theme = theme;
        match self.prefs.set_theme(theme) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to save theme");
                self.error = Some(format!("Failed to save theme: {e}"));
                false
            }
        }
    }

    pub fn toggle_theme(&mut self) -> bool {
        self.set_theme(self.theme.toggled())
    }
}

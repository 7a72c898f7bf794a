//! Durable key-value storage and the local task store built on it.
//!
//! `Storage` keeps string values under string keys in a single JSON file,
//! mirroring browser local storage: the task list lives under `tasks` as a
//! serialized JSON array and the theme under `theme`. Each key is written
//! independently, so the task list and the theme never clobber each other.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::fields::Theme;
use crate::store::{optimistic, TaskStore};
use crate::task::{normalise_text, Task, TaskId};

pub const STORAGE_FILE: &str = "storage.json";
pub const TASKS_KEY: &str = "tasks";
pub const THEME_KEY: &str = "theme";

/// String-keyed persisted values backed by one JSON file.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Storage file inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Storage {
            path: dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry. A missing or unreadable file is treated as empty.
    fn entries(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            return BTreeMap::new();
        }
        match fs::read_to_string(&self.path) {
            Ok(buf) => match serde_json::from_str(&buf) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "error parsing storage, starting fresh");
                    BTreeMap::new()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "error reading storage, starting fresh");
                BTreeMap::new()
            }
        }
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().remove(key)
    }

    /// Store `value` under `key`, leaving other keys untouched.
    pub fn set(&self, key: &str, value: String) -> io::Result<()> {
        let mut entries = self.entries();
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }

    /// Atomic write via temp file + rename.
    fn save(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }

    /// Stored theme preference, light when unset.
    pub fn theme(&self) -> Theme {
        self.get(THEME_KEY)
            .map(|v| Theme::from_stored(&v))
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> io::Result<()> {
        debug!(theme = %theme, "saving theme");
        self.set(THEME_KEY, theme.as_str().to_string())
    }
}

/// Task store kept in memory and written through to [`Storage`].
#[derive(Debug)]
pub struct LocalStore {
    storage: Storage,
    tasks: Vec<Task>,
}

impl LocalStore {
    /// Load the task list from storage, starting empty if absent or corrupt.
    pub fn open(storage: Storage) -> Self {
        let tasks = load_tasks(&storage);
        debug!(count = tasks.len(), path = %storage.path().display(), "loaded local tasks");
        LocalStore { storage, tasks }
    }

    /// Generate an id from the current time, unique within the list.
    fn next_id(&self) -> TaskId {
        let candidate = TaskId(Utc::now().timestamp_millis().max(0) as u64);
        if self.tasks.iter().any(|t| t.id >= candidate) {
            let max = self.tasks.iter().map(|t| t.id.0).max().unwrap_or(0);
            TaskId(max + 1)
        } else {
            candidate
        }
    }

    fn position(&self, id: TaskId) -> Result<usize, StoreError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Apply `mutate` to the list and keep it only if the write succeeds.
    fn write_through(&mut self, mutate: impl FnOnce(&mut Vec<Task>)) -> Result<&[Task], StoreError> {
        let storage = &self.storage;
        optimistic(&mut self.tasks, mutate, |tasks| persist_tasks(storage, tasks))?;
        Ok(&self.tasks)
    }
}

fn load_tasks(storage: &Storage) -> Vec<Task> {
    let Some(raw) = storage.get(TASKS_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "stored task list is not valid JSON, starting fresh");
            Vec::new()
        }
    }
}

fn persist_tasks(storage: &Storage, tasks: &[Task]) -> Result<(), StoreError> {
    let data = serde_json::to_string(tasks)?;
    storage.set(TASKS_KEY, data)?;
    Ok(())
}

impl TaskStore for LocalStore {
    fn list(&self) -> &[Task] {
        &self.tasks
    }

    fn refresh(&mut self) -> Result<&[Task], StoreError> {
        Ok(&self.tasks)
    }

    fn create(&mut self, text: &str) -> Result<&[Task], StoreError> {
        let text = normalise_text(text).ok_or(StoreError::Validation)?;
        let task = Task::new(self.next_id(), text, Utc::now());
        debug!(id = %task.id, "creating local task");
        self.write_through(|tasks| tasks.push(task))
    }

    fn update(&mut self, id: TaskId, text: &str) -> Result<&[Task], StoreError> {
        let text = normalise_text(text).ok_or(StoreError::Validation)?;
        let idx = self.position(id)?;
        debug!(id = %id, "updating local task");
        self.write_through(|tasks| tasks[idx].text = text.to_string())
    }

    fn remove(&mut self, id: TaskId) -> Result<&[Task], StoreError> {
        let idx = self.position(id)?;
        debug!(id = %id, "removing local task");
        self.write_through(|tasks| {
            tasks.remove(idx);
        })
    }

    fn toggle(&mut self, id: TaskId) -> Result<&[Task], StoreError> {
        let idx = self.position(id)?;
        let now = Utc::now();
        self.write_through(|tasks| tasks[idx].toggle_at(now))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> LocalStore {
        LocalStore::open(Storage::in_dir(dir.path()))
    }

    #[test]
    fn test_create_appends_trimmed_task() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        let tasks = s.create("  Buy milk  ").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Buy milk");
        assert!(!tasks[0].completed);
        assert!(tasks[0].created_at.is_some());
        assert_eq!(tasks[0].completed_at, None);
    }

    #[test]
    fn test_create_rejects_blank_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        s.create("keep").unwrap();
        assert!(matches!(s.create(""), Err(StoreError::Validation)));
        assert!(matches!(s.create("   "), Err(StoreError::Validation)));
        assert_eq!(s.list().len(), 1);
    }

    #[test]
    fn test_ids_unique_for_rapid_creates() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        for i in 0..20 {
            s.create(&format!("task {i}")).unwrap();
        }
        let mut ids: Vec<_> = s.list().iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        s.create("first").unwrap();
        s.create("second").unwrap();
        s.create("third").unwrap();
        let texts: Vec<_> = s.list().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        let id = s.create("X").unwrap()[0].id;

        let t = &s.toggle(id).unwrap()[0];
        assert!(t.completed);
        assert!(t.completed_at.is_some());

        let t = &s.toggle(id).unwrap()[0];
        assert!(!t.completed);
        assert_eq!(t.completed_at, None);
    }

    #[test]
    fn test_update_replaces_text_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        s.create("a").unwrap();
        let id = s.create("b").unwrap()[1].id;
        s.create("c").unwrap();

        let tasks = s.update(id, " B ").unwrap();
        assert_eq!(tasks[1].text, "B");
        assert!(matches!(s.update(id, "  "), Err(StoreError::Validation)));
        assert!(matches!(s.update(TaskId(1), "z"), Err(StoreError::NotFound(_))));
        assert_eq!(s.list()[1].text, "B");
    }

    #[test]
    fn test_remove_and_remove_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        let id = s.create("gone").unwrap()[0].id;
        s.create("stays").unwrap();

        let tasks = s.remove(id).unwrap();
        assert!(tasks.iter().all(|t| t.id != id));
        assert!(matches!(s.remove(id), Err(StoreError::NotFound(missing)) if missing == id));
        assert_eq!(s.list().len(), 1);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = store(&dir);
        let id = s.create("Buy milk").unwrap()[0].id;
        s.create("Call Alice").unwrap();
        s.toggle(id).unwrap();

        let reopened = store(&dir);
        assert_eq!(reopened.list(), s.list());
        assert!(reopened.list()[0].completed);
    }

    #[test]
    fn test_theme_written_independently_of_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path());
        let mut s = LocalStore::open(storage.clone());
        s.create("X").unwrap();

        assert_eq!(storage.theme(), Theme::Light);
        storage.set_theme(Theme::Dark).unwrap();
        s.create("Y").unwrap();

        assert_eq!(storage.theme(), Theme::Dark);
        assert_eq!(store(&dir).list().len(), 2);
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILE), "not json").unwrap();
        assert!(store(&dir).list().is_empty());

        let storage = Storage::in_dir(dir.path());
        storage.set(TASKS_KEY, "[oops".into()).unwrap();
        assert!(store(&dir).list().is_empty());
    }

    #[test]
    fn test_reads_browser_storage_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path());
        storage
            .set(
                TASKS_KEY,
                r#"[{"id":1700000000000,"text":"Old","completed":true,"createdAt":"2024-01-01T00:00:00.000Z","completedAt":null}]"#.into(),
            )
            .unwrap();
        let s = store(&dir);
        assert_eq!(s.list()[0].id, TaskId(1700000000000));
        assert!(s.list()[0].completed);
    }
}

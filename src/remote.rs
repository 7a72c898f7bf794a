//! Task store mirrored to a remote HTTP CRUD endpoint.
//!
//! The endpoint is a single resource: `GET` lists, `POST` creates, `PUT`
//! updates text or status, `DELETE` removes. Request bodies carry the id.
//! The in-memory cache only changes after a round trip succeeds, except for
//! completion toggles, which are applied first and undone on failure.

use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::store::{optimistic, TaskStore};
use crate::task::{normalise_text, Task, TaskId};

/// Record as returned by the list call.
#[derive(Debug, Deserialize)]
struct WireTask {
    #[serde(deserialize_with = "de_task_id")]
    task_id: u64,
    task_item: String,
    #[serde(deserialize_with = "de_completed")]
    completed: bool,
}

impl From<WireTask> for Task {
    fn from(w: WireTask) -> Self {
        Task {
            id: TaskId(w.task_id),
            text: w.task_item,
            completed: w.completed,
            created_at: None,
            completed_at: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(u64),
    Str(String),
}

fn de_task_id<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match NumOrString::deserialize(d)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Num(i64),
    Str(String),
}

/// The endpoint reports completion as `"1"` / `"0"`.
fn de_completed<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Flag::deserialize(d)? {
        Flag::Bool(b) => b,
        Flag::Num(n) => n == 1,
        Flag::Str(s) => s.trim() == "1",
    })
}

#[derive(Serialize)]
struct CreateBody<'a> {
    item: &'a str,
}

#[derive(Serialize)]
struct UpdateTextBody<'a> {
    id: TaskId,
    selected_item: &'a str,
}

#[derive(Serialize)]
struct UpdateStatusBody {
    id: TaskId,
    completed: bool,
}

#[derive(Serialize)]
struct DeleteBody {
    id: TaskId,
}

/// Thin client for the CRUD resource.
#[derive(Debug)]
struct RemoteApi {
    client: Client,
    url: String,
}

impl RemoteApi {
    fn fetch_all(&self) -> Result<Vec<Task>, StoreError> {
        let wire: Vec<WireTask> = self.client.get(&self.url).send()?.error_for_status()?.json()?;
        Ok(wire.into_iter().map(Task::from).collect())
    }

    fn create(&self, text: &str) -> Result<(), StoreError> {
        self.client
            .post(&self.url)
            .json(&CreateBody { item: text })
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn update_text(&self, id: TaskId, text: &str) -> Result<(), StoreError> {
        self.client
            .put(&self.url)
            .json(&UpdateTextBody { id, selected_item: text })
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn update_status(&self, id: TaskId, completed: bool) -> Result<(), StoreError> {
        self.client
            .put(&self.url)
            .json(&UpdateStatusBody { id, completed })
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.client
            .delete(&self.url)
            .json(&DeleteBody { id })
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

/// Task store whose source of truth is the remote endpoint.
#[derive(Debug)]
pub struct RemoteStore {
    api: RemoteApi,
    cache: Vec<Task>,
}

impl RemoteStore {
    /// Create a store for the resource at `url`. The cache starts empty until
    /// [`TaskStore::refresh`] is called.
    pub fn new(url: &str) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;
        info!(url, "using remote task endpoint");
        Ok(RemoteStore {
            api: RemoteApi {
                client,
                url: url.to_string(),
            },
            cache: Vec::new(),
        })
    }

    fn ensure_exists(&self, id: TaskId) -> Result<(), StoreError> {
        if self.cache.iter().any(|t| t.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}

impl TaskStore for RemoteStore {
    fn list(&self) -> &[Task] {
        &self.cache
    }

    fn refresh(&mut self) -> Result<&[Task], StoreError> {
        self.cache = self.api.fetch_all()?;
        debug!(count = self.cache.len(), "fetched remote tasks");
        Ok(&self.cache)
    }

    fn create(&mut self, text: &str) -> Result<&[Task], StoreError> {
        let text = normalise_text(text).ok_or(StoreError::Validation)?;
        self.api.create(text)?;
        self.refresh()
    }

    fn update(&mut self, id: TaskId, text: &str) -> Result<&[Task], StoreError> {
        let text = normalise_text(text).ok_or(StoreError::Validation)?;
        self.ensure_exists(id)?;
        self.api.update_text(id, text)?;
        self.refresh()
    }

    fn remove(&mut self, id: TaskId) -> Result<&[Task], StoreError> {
        self.ensure_exists(id)?;
        self.api.delete(id)?;
        self.refresh()
    }

    // No re-fetch after a confirmed toggle; the optimistic value stands.
    fn toggle(&mut self, id: TaskId) -> Result<&[Task], StoreError> {
        let api = &self.api;
        let task = self
            .cache
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        optimistic(
            &mut task.completed,
            |completed| *completed = !*completed,
            |&completed| api.update_status(id, completed),
        )
        .inspect_err(|e| warn!(id = %id, error = %e, "toggle rejected, rolled back"))?;
        Ok(&self.cache)
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}

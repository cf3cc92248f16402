//! Canonical task list state and every mutation on it.
//!
//! A [`Store`] owns the task collection, the display settings and the
//! transient filter. Each accepted mutation is written through to its
//! [`Backend`] before returning; rejected input (blank text, unknown ids) is
//! a silent no-op reported through the return value rather than an error.

use crate::model::{normalize_text, Filter, Settings, StoreError, Task, TaskId};
use crate::projector::Projector;
use crate::storage::{Backend, BackendError, SETTINGS_KEY, TASKS_KEY};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::{debug, error, warn};

pub struct Store<B> {
    backend: B,
    tasks: Vec<Task>,
    settings: Settings,
    filter: Filter,
}

#[derive(thiserror::Error, Debug)]
enum LoadError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("parsing {key}")]
    Parse {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl<B: Backend> Store<B> {
    /// An empty store. Nothing is read until [`Store::load`].
    pub fn new(backend: B) -> Self {
        Store {
            backend,
            tasks: Vec::new(),
            settings: Settings::default(),
            filter: Filter::All,
        }
    }

    pub fn open(backend: B) -> Self {
        let mut store = Store::new(backend);
        store.load();
        store
    }

    /// Replaces in-memory state with what the backend holds.
    ///
    /// Never fails: unreadable or malformed blobs are logged and the store
    /// falls back to empty tasks and default settings. Tasks are read first;
    /// a failure there abandons the settings read as well. The filter always
    /// resets to [`Filter::All`].
    pub fn load(&mut self) {
        self.tasks.clear();
        self.settings = Settings::default();
        self.filter = Filter::All;

        match self.read_blob::<Vec<Task>>(TASKS_KEY) {
            Ok(Some(tasks)) => self.tasks = sanitize(tasks),
            Ok(None) => {}
            Err(err) => {
                let err = anyhow::Error::from(err);
                error!(error = %format!("{:#}", err), "failed to load tasks, starting empty");
                return;
            }
        }
        match self.read_blob::<Settings>(SETTINGS_KEY) {
            Ok(Some(settings)) => self.settings = settings,
            Ok(None) => {}
            Err(err) => {
                let err = anyhow::Error::from(err);
                error!(error = %format!("{:#}", err), "failed to load settings, using defaults");
            }
        }
        debug!(
            tasks = self.tasks.len(),
            dark = self.settings.dark,
            "loaded task list"
        );
    }

    /// Writes the whole task collection and settings object.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let tasks = serde_json::to_string(&self.tasks).map_err(|source| StoreError::Serialize {
            key: TASKS_KEY,
            source,
        })?;
        let settings =
            serde_json::to_string(&self.settings).map_err(|source| StoreError::Serialize {
                key: SETTINGS_KEY,
                source,
            })?;
        self.write_blob(TASKS_KEY, &tasks)?;
        self.write_blob(SETTINGS_KEY, &settings)?;
        Ok(())
    }

    /// Adds a task stamped with the current time. `Ok(None)` when the text
    /// is blank.
    pub fn add_task(&mut self, text: &str, category: &str) -> Result<Option<TaskId>, StoreError> {
        self.add_task_at(text, category, Utc::now().timestamp_millis())
    }

    pub fn add_task_at(
        &mut self,
        text: &str,
        category: &str,
        created_at: i64,
    ) -> Result<Option<TaskId>, StoreError> {
        if normalize_text(text).is_none() {
            debug!("ignoring task with blank text");
            return Ok(None);
        }
        let id = self.generate_id(created_at);
        let Some(task) = Task::new(id.clone(), text, category, created_at) else {
            return Ok(None);
        };
        debug!(id = %task.id, category = %task.category, "adding task");
        self.tasks.push(task);
        self.save()?;
        Ok(Some(id))
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle for unknown task");
            return Ok(false);
        };
        task.completed = !task.completed;
        debug!(id, completed = task.completed, "toggled task");
        self.save()?;
        Ok(true)
    }

    /// Replaces a task's text. Blank text discards the edit and keeps the
    /// previous text.
    pub fn edit_text(&mut self, id: &str, new_text: &str) -> Result<bool, StoreError> {
        let Some(text) = normalize_text(new_text) else {
            debug!(id, "discarding blank edit");
            return Ok(false);
        };
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "edit for unknown task");
            return Ok(false);
        };
        task.text = text;
        debug!(id, "edited task");
        self.save()?;
        Ok(true)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "delete for unknown task");
            return Ok(false);
        };
        self.tasks.remove(idx);
        debug!(id, "deleted task");
        self.save()?;
        Ok(true)
    }

    /// Removes every completed task and returns how many went.
    pub fn clear_completed(&mut self) -> Result<usize, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        debug!(removed, "cleared completed tasks");
        self.save()?;
        Ok(removed)
    }

    pub fn set_filter(&mut self, filter: impl Into<Filter>) {
        self.filter = filter.into();
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.settings.dark = enabled;
        debug!(dark = enabled, "updated settings");
        self.save()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn projector(&self) -> Projector<'_> {
        Projector::new(&self.tasks, &self.filter)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn read_blob<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, LoadError> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| LoadError::Parse { key, source })
    }

    fn write_blob(&mut self, key: &'static str, value: &str) -> Result<(), StoreError> {
        self.backend.write(key, value).map_err(|source| {
            warn!(key, error = %source, "write failed, in-memory state kept");
            StoreError::Persist { key, source }
        })
    }

    fn generate_id(&self, created_at: i64) -> TaskId {
        loop {
            let suffix: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(5)
                .map(|b| char::from(b).to_ascii_lowercase())
                .collect();
            let id = format!("{}{}", to_base36(created_at.max(0) as u64), suffix);
            if self.task(&id).is_none() {
                return id;
            }
        }
    }
}

/// Drops persisted entries that would break the collection's invariants:
/// blank text and repeated ids (the first occurrence wins).
fn sanitize(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter_map(|mut task| {
            if !seen.insert(task.id.clone()) {
                warn!(id = %task.id, "dropping task with duplicate id");
                return None;
            }
            match normalize_text(&task.text) {
                Some(text) => {
                    task.text = text;
                    Some(task)
                }
                None => {
                    warn!(id = %task.id, "dropping task with blank text");
                    None
                }
            }
        })
        .collect()
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_CATEGORY;
    use crate::storage::MemoryBackend;

    fn store() -> Store<MemoryBackend> {
        Store::new(MemoryBackend::new())
    }

    #[test]
    fn blank_adds_are_ignored() {
        let mut store = store();
        let inputs = ["Buy milk", "", "   ", "Write report", "\t", "Call mom"];
        for text in inputs {
            store.add_task(text, "Work").expect("add");
        }
        assert_eq!(store.tasks().len(), 3);
        assert!(store.backend().get(TASKS_KEY).is_some());
    }

    #[test]
    fn blank_add_does_not_persist() {
        let mut store = store();
        assert_eq!(store.add_task("  ", "Work").expect("add"), None);
        assert!(store.backend().get(TASKS_KEY).is_none());
    }

    #[test]
    fn add_defaults_category_and_trims_text() {
        let mut store = store();
        let id = store.add_task("  Walk dog ", "").expect("add").expect("id");
        let task = store.task(&id).expect("task");
        assert_eq!(task.text, "Walk dog");
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert!(!task.completed);
    }

    #[test]
    fn ids_are_unique_for_same_timestamp() {
        let mut store = store();
        let mut ids = HashSet::new();
        for i in 0..50 {
            let id = store
                .add_task_at(&format!("task {i}"), "Work", 1_000)
                .expect("add")
                .expect("id");
            assert!(id.starts_with(&to_base36(1_000)));
            ids.insert(id);
        }
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut store = store();
        let id = store.add_task("Buy milk", "Errands").expect("add").expect("id");
        assert!(store.toggle_complete(&id).expect("toggle"));
        assert!(store.task(&id).expect("task").completed);
        assert!(store.toggle_complete(&id).expect("toggle"));
        assert!(!store.task(&id).expect("task").completed);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut store = store();
        store.add_task("Buy milk", "Errands").expect("add");
        assert!(!store.toggle_complete("missing").expect("toggle"));
        assert!(store.tasks().iter().all(|t| !t.completed));
    }

    #[test]
    fn blank_edit_keeps_previous_text() {
        let mut store = store();
        let id = store.add_task("Buy milk", "Errands").expect("add").expect("id");
        assert!(!store.edit_text(&id, "").expect("edit"));
        assert!(!store.edit_text(&id, "   ").expect("edit"));
        assert_eq!(store.task(&id).expect("task").text, "Buy milk");

        assert!(store.edit_text(&id, "  Buy oat milk ").expect("edit"));
        assert_eq!(store.task(&id).expect("task").text, "Buy oat milk");
    }

    #[test]
    fn delete_unknown_id_keeps_order() {
        let mut store = store();
        for (i, text) in ["a", "b", "c"].iter().enumerate() {
            store.add_task_at(text, "Work", i as i64).expect("add");
        }
        let before = store.tasks().to_vec();
        assert!(!store.delete_task("nope").expect("delete"));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn clear_completed_is_idempotent() {
        let mut store = store();
        let a = store.add_task_at("a", "Work", 1).expect("add").expect("id");
        store.add_task_at("b", "Work", 2).expect("add");
        store.toggle_complete(&a).expect("toggle");

        assert_eq!(store.clear_completed().expect("clear"), 1);
        let once = store.tasks().to_vec();
        assert_eq!(store.clear_completed().expect("clear"), 0);
        assert_eq!(store.tasks(), once.as_slice());
    }

    #[test]
    fn filter_is_not_persisted() {
        let mut store = store();
        store.add_task("Buy milk", "Errands").expect("add");
        store.set_filter("Errands");
        assert_eq!(store.filter(), &Filter::Category("Errands".into()));

        let reloaded = Store::open(store.into_backend());
        assert_eq!(reloaded.filter(), &Filter::All);
        assert_eq!(reloaded.tasks().len(), 1);
    }

    #[test]
    fn corrupt_tasks_abandon_settings_too() {
        let backend = MemoryBackend::new()
            .with_blob(TASKS_KEY, "[{not json")
            .with_blob(SETTINGS_KEY, r#"{"dark":true}"#);
        let store = Store::open(backend);
        assert!(store.tasks().is_empty());
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn corrupt_settings_keep_loaded_tasks() {
        let backend = MemoryBackend::new()
            .with_blob(
                TASKS_KEY,
                r#"[{"id":"a","text":"Buy milk","completed":false,"category":"Errands","createdAt":1}]"#,
            )
            .with_blob(SETTINGS_KEY, "nope");
        let store = Store::open(backend);
        assert_eq!(store.tasks().len(), 1);
        assert!(!store.settings().dark);
    }

    #[test]
    fn load_drops_blank_and_duplicate_tasks() {
        let backend = MemoryBackend::new().with_blob(
            TASKS_KEY,
            r#"[
                {"id":"a","text":"first","completed":false,"category":"Work","createdAt":1},
                {"id":"a","text":"again","completed":true,"category":"Work","createdAt":2},
                {"id":"b","text":"   ","completed":false,"category":"Work","createdAt":3},
                {"id":"c","text":" padded ","completed":true,"category":"Home","createdAt":4}
            ]"#,
        );
        let store = Store::open(backend);
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(store.tasks()[0].text, "first");
        assert_eq!(store.tasks()[1].text, "padded");
    }

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }
}

use crate::storage::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = String;

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub category: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub dark: bool,
}

/// Which tasks the display currently shows. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Completed,
    Category(String),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("serializing {key}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("persisting {key}")]
    Persist {
        key: &'static str,
        #[source]
        source: BackendError,
    },
}

impl Task {
    /// Builds a task from raw user input. Returns `None` when the trimmed
    /// text is empty. An empty category falls back to [`DEFAULT_CATEGORY`].
    pub fn new(id: TaskId, text: &str, category: &str, created_at: i64) -> Option<Self> {
        let text = normalize_text(text)?;
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };
        Some(Task {
            id,
            text,
            completed: false,
            category,
            created_at,
        })
    }
}

impl Filter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "All" => Filter::All,
            "Completed" => Filter::Completed,
            other => Filter::Category(other.to_string()),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => task.completed,
            Filter::Category(c) => &task.category == c,
        }
    }
}

impl From<&str> for Filter {
    fn from(raw: &str) -> Self {
        Filter::parse(raw)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("All"),
            Filter::Completed => f.write_str("Completed"),
            Filter::Category(c) => f.write_str(c),
        }
    }
}

/// Trims task text, rejecting empty and whitespace-only input.
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

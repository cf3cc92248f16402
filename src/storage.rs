use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const TASKS_KEY: &str = "tasks";
pub const SETTINGS_KEY: &str = "settings";
const PROJECT_DIR_NAME: &str = ".taskpad";

/// Key-value blob store the task list persists into.
pub trait Backend {
    fn read(&self, key: &str) -> Result<Option<String>, BackendError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), BackendError>;
}

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("reading {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BackendError::Read { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| BackendError::Write {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| BackendError::Write { path, source })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blobs: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(mut self, key: &str, value: impl Into<String>) -> Self {
        self.blobs.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataScope {
    Project,
    Global,
    Explicit,
}

impl DataScope {
    pub fn label(&self) -> &'static str {
        match self {
            DataScope::Project => "project",
            DataScope::Global => "global",
            DataScope::Explicit => "custom",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataLocation {
    pub dir: PathBuf,
    pub scope: DataScope,
}

impl DataLocation {
    pub fn backend(&self) -> FileBackend {
        FileBackend::new(&self.dir)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.yml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join("taskpad.log")
    }
}

/// Creates the data directory: `explicit` when given, else `./.taskpad/`.
pub fn init_project_dir(explicit: Option<&Path>) -> Result<DataLocation> {
    let (dir, scope) = match explicit {
        Some(dir) => (dir.to_path_buf(), DataScope::Explicit),
        None => (env::current_dir()?.join(PROJECT_DIR_NAME), DataScope::Project),
    };
    fs::create_dir_all(&dir).with_context(|| format!("creating {:?}", dir))?;
    Ok(DataLocation { dir, scope })
}

/// Resolves the data directory: an explicit override, else the nearest
/// `.taskpad/` walking up from `start`, else the platform data directory.
pub fn locate_data_dir(explicit: Option<&Path>, start: &Path) -> Result<DataLocation> {
    if let Some(dir) = explicit {
        return Ok(DataLocation {
            dir: dir.to_path_buf(),
            scope: DataScope::Explicit,
        });
    }
    if let Some(dir) = find_project_dir(start) {
        return Ok(DataLocation {
            dir,
            scope: DataScope::Project,
        });
    }
    Ok(DataLocation {
        dir: global_data_dir()?,
        scope: DataScope::Global,
    })
}

fn find_project_dir(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "taskpad").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_missing_key_reads_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(temp.path().join("nested"));
        assert!(backend.read(TASKS_KEY).expect("read").is_none());
    }

    #[test]
    fn file_backend_creates_directory_on_write() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut backend = FileBackend::new(temp.path().join("nested"));
        backend.write(SETTINGS_KEY, "{\"dark\":true}").expect("write");
        assert!(backend.path_for(SETTINGS_KEY).exists());
        assert_eq!(
            backend.read(SETTINGS_KEY).expect("read").as_deref(),
            Some("{\"dark\":true}")
        );
    }

    #[test]
    fn project_dir_is_found_from_nested_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let project = temp.path().join(PROJECT_DIR_NAME);
        fs::create_dir_all(&project).expect("mkdir");
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).expect("mkdir");

        let location = locate_data_dir(None, &nested).expect("locate");
        assert_eq!(location.scope, DataScope::Project);
        assert_eq!(location.dir, project);
    }

    #[test]
    fn init_creates_explicit_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let custom = temp.path().join("custom/tasks");

        let location = init_project_dir(Some(&custom)).expect("init");
        assert_eq!(location.scope, DataScope::Explicit);
        assert_eq!(location.dir, custom);
        assert!(custom.is_dir());
        assert!(!temp.path().join(PROJECT_DIR_NAME).exists());
    }

    #[test]
    fn explicit_dir_wins_over_project_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join(PROJECT_DIR_NAME)).expect("mkdir");
        let custom = temp.path().join("custom");

        let location = locate_data_dir(Some(&custom), temp.path()).expect("locate");
        assert_eq!(location.scope, DataScope::Explicit);
        assert_eq!(location.dir, custom);
        assert_eq!(location.backend().path_for(TASKS_KEY), custom.join("tasks.json"));
    }
}

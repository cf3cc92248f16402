pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod model;
pub mod projector;
pub mod storage;
pub mod store;
pub mod ui;

pub use model::{Filter, Settings, StoreError, Task, TaskId};
pub use projector::{Projector, Stats};
pub use storage::{Backend, BackendError, FileBackend, MemoryBackend};
pub use store::Store;

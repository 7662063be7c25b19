//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `taskboard_core::api` instead of reaching into internal modules.

pub use crate::board::{Board, Column};
pub use crate::config::{
    load_default, AppConfig, ClientConfig, LoggingConfig, ServerConfig, DEFAULT_PORT,
};
pub use crate::error::{CliError, TaskError};
pub use crate::store::{StoreEvent, StoreState, TaskStore};
pub use crate::task::{
    validate_new_task, validate_patch, NewTask, Task, TaskApi, TaskId, TaskPatch, TaskPriority,
    TaskStatus,
};

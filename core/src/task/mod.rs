pub mod model;
pub mod r#trait;
pub mod validate;

pub use model::{NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStatus};
pub use r#trait::TaskApi;
pub use validate::{validate_new_task, validate_patch, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};

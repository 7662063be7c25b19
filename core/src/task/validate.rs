//! Attribute checks applied before a task leaves the process.

use crate::error::TaskError;
use crate::task::model::{NewTask, TaskPatch};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 10_000;

fn validate_title(title: &str) -> Result<(), TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation("Title cannot be empty".to_string()));
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(TaskError::Validation(format!(
            "Title too long ({len} chars, max {MAX_TITLE_CHARS})"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), TaskError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(TaskError::Validation(format!(
            "Description too long ({len} chars, max {MAX_DESCRIPTION_CHARS})"
        )));
    }
    Ok(())
}

pub fn validate_new_task(task: &NewTask) -> Result<(), TaskError> {
    validate_title(&task.title)?;
    validate_description(&task.description)
}

/// Only the fields a patch actually sets are checked.
pub fn validate_patch(patch: &TaskPatch) -> Result<(), TaskError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description)?;
    }
    Ok(())
}

//! Client-side partition of the task list into status columns.

use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn title(&self) -> &'static str {
        self.status.column_title()
    }

    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Header text, e.g. `In progress (2)`.
    pub fn heading(&self) -> String {
        format!("{} ({})", self.title(), self.count())
    }
}

/// Three columns in fixed order: todo, doing, done. Tasks keep list order
/// inside each column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: [Column; 3],
}

impl Board {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let columns = TaskStatus::ALL.map(|status| Column {
            status,
            tasks: tasks.iter().filter(|t| t.status == status).cloned().collect(),
        });
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, status: TaskStatus) -> &Column {
        match status {
            TaskStatus::Todo => &self.columns[0],
            TaskStatus::Doing => &self.columns[1],
            TaskStatus::Done => &self.columns[2],
        }
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(Column::count).sum()
    }
}

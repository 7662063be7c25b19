#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use taskboard_core::api::{NewTask, Task, TaskApi, TaskError, TaskId, TaskPatch};
use taskboard_core::task::{validate_new_task, validate_patch};

/// In-process stand-in for the record store. Assigns ids max+1 like the real server.
#[derive(Default)]
pub struct MemoryTaskApi {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: Vec<Task>,
    down: bool,
    calls: Vec<&'static str>,
}

impl MemoryTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Task>) -> Self {
        let api = Self::default();
        api.inner.lock().unwrap().records = records;
        api
    }

    /// Simulates the service being unreachable.
    pub fn set_down(&self, down: bool) {
        self.inner.lock().unwrap().down = down;
    }

    /// Adds a record directly on the "server", bypassing any client.
    pub fn insert_remote(&self, task: Task) {
        self.inner.lock().unwrap().records.push(task);
    }

    pub fn records(&self) -> Vec<Task> {
        self.inner.lock().unwrap().records.clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn enter(&self, op: &'static str) -> Result<std::sync::MutexGuard<'_, Inner>, TaskError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(op);
        if inner.down {
            return Err(TaskError::Transport {
                message: "connection refused".to_string(),
                status: None,
                url: Some("http://127.0.0.1:3000/tasks".to_string()),
            });
        }
        Ok(inner)
    }
}

#[async_trait]
impl TaskApi for MemoryTaskApi {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, TaskError> {
        let inner = self.enter("fetch")?;
        Ok(inner.records.clone())
    }

    async fn create_task(&self, attributes: NewTask) -> Result<Task, TaskError> {
        validate_new_task(&attributes)?;
        let mut inner = self.enter("create")?;
        let next = inner.records.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        let task = attributes.with_id(TaskId::new(next));
        inner.records.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        validate_patch(&patch)?;
        let mut inner = self.enter("update")?;
        let record = inner
            .records
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        patch.apply(record);
        Ok(record.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), TaskError> {
        let mut inner = self.enter("delete")?;
        let before = inner.records.len();
        inner.records.retain(|t| t.id != id);
        if inner.records.len() == before {
            return Err(TaskError::NotFound(id));
        }
        Ok(())
    }
}

//! 单写者 actor：持有任务列表并串行处理请求

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::types::{StoreEvent, StoreSnapshot, StoreState};
use crate::error::TaskError;
use crate::task::{NewTask, Task, TaskApi, TaskId, TaskPatch};

pub(crate) type Reply<T> = oneshot::Sender<Result<T, TaskError>>;

pub(crate) enum Request {
    Initialize { reply: Reply<usize> },
    Create { attributes: NewTask, reply: Reply<Task> },
    Update { id: TaskId, patch: TaskPatch, reply: Reply<Task> },
    Delete { id: TaskId, reply: Reply<()> },
    Shutdown,
}

pub(crate) struct StoreActor {
    api: Arc<dyn TaskApi>,
    state: StoreState,
    tasks: Vec<Task>,
    snapshot_tx: watch::Sender<StoreSnapshot>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl StoreActor {
    pub(crate) fn new(
        api: Arc<dyn TaskApi>,
        snapshot_tx: watch::Sender<StoreSnapshot>,
        event_tx: broadcast::Sender<StoreEvent>,
    ) -> Self {
        Self {
            api,
            state: StoreState::Uninitialized,
            tasks: Vec::new(),
            snapshot_tx,
            event_tx,
        }
    }

    pub(crate) async fn run(mut self, mut rx: mpsc::Receiver<Request>) {
        tracing::debug!(target: "taskboard.store", api = %self.api.name(), "store actor started");

        while let Some(req) = rx.recv().await {
            match req {
                Request::Initialize { reply } => {
                    let res = self.initialize().await;
                    let _ = reply.send(res);
                }
                Request::Create { attributes, reply } => {
                    let res = self.create(attributes).await;
                    let _ = reply.send(res);
                }
                Request::Update { id, patch, reply } => {
                    let res = self.update(id, patch).await;
                    let _ = reply.send(res);
                }
                Request::Delete { id, reply } => {
                    let res = self.delete(id).await;
                    let _ = reply.send(res);
                }
                Request::Shutdown => break,
            }
        }

        tracing::debug!(target: "taskboard.store", "store actor stopped");
    }

    fn ensure_ready(&self) -> Result<(), TaskError> {
        match self.state {
            StoreState::Ready => Ok(()),
            StoreState::Uninitialized => Err(TaskError::NotReady),
        }
    }

    fn publish(&self, event: StoreEvent) {
        self.snapshot_tx.send_replace(StoreSnapshot {
            state: self.state,
            tasks: self.tasks.clone(),
        });
        // 没有订阅者时 send 返回 Err，忽略即可
        let _ = self.event_tx.send(event);
    }

    async fn initialize(&mut self) -> Result<usize, TaskError> {
        let tasks = match self.api.fetch_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(
                    target: "taskboard.store",
                    state = ?self.state,
                    error = %e,
                    "initial fetch failed"
                );
                return Err(e);
            }
        };

        let count = tasks.len();
        self.tasks = tasks;
        self.state = StoreState::Ready;
        tracing::info!(target: "taskboard.store", count, "task list loaded");
        self.publish(StoreEvent::Loaded { count });
        Ok(count)
    }

    async fn create(&mut self, attributes: NewTask) -> Result<Task, TaskError> {
        self.ensure_ready()?;
        let task = self.api.create_task(attributes).await?;
        self.tasks.push(task.clone());
        tracing::debug!(target: "taskboard.store", id = %task.id, "task appended");
        self.publish(StoreEvent::Created { task: task.clone() });
        Ok(task)
    }

    async fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        self.ensure_ready()?;
        let updated = self.api.update_task(id, patch).await?;

        let applied = match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(slot) => {
                *slot = updated.clone();
                true
            }
            None => {
                tracing::warn!(
                    target: "taskboard.store",
                    id = %id,
                    "server accepted update for a task missing from the local list"
                );
                false
            }
        };

        self.publish(StoreEvent::Updated {
            task: updated.clone(),
            applied,
        });
        Ok(updated)
    }

    async fn delete(&mut self, id: TaskId) -> Result<(), TaskError> {
        self.ensure_ready()?;
        self.api.delete_task(id).await?;

        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = before - self.tasks.len();
        tracing::debug!(target: "taskboard.store", id = %id, removed, "task removed");
        self.publish(StoreEvent::Deleted { id, removed });
        Ok(())
    }
}

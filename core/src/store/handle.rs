//! 同步存储句柄

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::actor::{Request, StoreActor};
use super::types::{StoreEvent, StoreSnapshot, StoreState};
use crate::error::TaskError;
use crate::task::{NewTask, Task, TaskApi, TaskId, TaskPatch};

const REQUEST_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 任务同步存储句柄
///
/// 可以自由 clone 并注入到各个使用方。所有句柄共享同一个 actor；
/// 最后一个句柄被丢弃或调用 [`TaskStore::shutdown`] 后 actor 退出。
///
/// 请求按提交顺序处理：在 `initialize()` 之后提交的修改会排在首次拉取之后，
/// 而 actor 处理时若仍未初始化成功则以 [`TaskError::NotReady`] 拒绝，不会发出网络请求。
#[derive(Clone)]
pub struct TaskStore {
    tx: mpsc::Sender<Request>,
    snapshot_rx: watch::Receiver<StoreSnapshot>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl TaskStore {
    /// 启动 actor，初始状态为 Uninitialized。必须在 tokio 运行时内调用。
    pub fn spawn(api: Arc<dyn TaskApi>) -> Self {
        let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(StoreSnapshot::default());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let actor = StoreActor::new(api, snapshot_tx, event_tx.clone());
        tokio::spawn(actor.run(rx));

        Self {
            tx,
            snapshot_rx,
            event_tx,
        }
    }

    /// 拉取服务端完整列表并进入 Ready；返回任务数量。
    ///
    /// 失败时列表保持原样（首次失败即为空），错误原样返回，不重试。
    pub async fn initialize(&self) -> Result<usize, TaskError> {
        self.request(|reply| Request::Initialize { reply }).await
    }

    pub async fn create_task(&self, attributes: NewTask) -> Result<Task, TaskError> {
        self.request(|reply| Request::Create { attributes, reply })
            .await
    }

    /// 返回服务端的完整记录。本地没有该任务时列表不变。
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        self.request(|reply| Request::Update { id, patch, reply })
            .await
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<(), TaskError> {
        self.request(|reply| Request::Delete { id, reply }).await
    }

    /// 停止 actor；之后的请求返回 [`TaskError::StoreClosed`]。
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Request::Shutdown).await;
    }

    /// 当前列表快照
    pub fn tasks(&self) -> Vec<Task> {
        self.snapshot_rx.borrow().tasks.clone()
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.snapshot_rx
            .borrow()
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn state(&self) -> StoreState {
        self.snapshot_rx.borrow().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == StoreState::Ready
    }

    /// 监听快照变化（用于重新渲染）
    pub fn watch(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot_rx.clone()
    }

    /// 订阅变更事件
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, TaskError>>) -> Request,
    ) -> Result<T, TaskError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| TaskError::StoreClosed)?;
        reply_rx.await.map_err(|_| TaskError::StoreClosed)?
    }
}

//! 同步存储类型定义

use serde::Serialize;

use crate::task::{Task, TaskId};

/// 存储生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    /// 尚未成功完成首次拉取
    Uninitialized,
    /// 已加载服务端列表，可接受修改请求
    Ready,
}

/// 对外发布的只读快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub state: StoreState,
    pub tasks: Vec<Task>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            state: StoreState::Uninitialized,
            tasks: Vec::new(),
        }
    }
}

/// 已确认变更的事件通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    Loaded {
        count: usize,
    },
    Created {
        task: Task,
    },
    /// `applied` 为 false 表示服务端已更新，但本地列表中没有该任务
    Updated {
        task: Task,
        applied: bool,
    },
    Deleted {
        id: TaskId,
        removed: usize,
    },
}

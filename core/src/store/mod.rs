//! # 任务同步存储
//!
//! 会话内唯一的任务列表。列表只由一个 actor 任务持有和修改，
//! 所有请求经由 mpsc 通道按提交顺序串行处理；
//! 服务端确认之后才更新本地列表（confirmed-then-applied）。

mod actor;
pub mod handle;
pub mod types;

pub use handle::TaskStore;
pub use types::{StoreEvent, StoreSnapshot, StoreState};

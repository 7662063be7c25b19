use async_trait::async_trait;

use crate::error::TaskError;
use crate::task::model::{NewTask, Task, TaskId, TaskPatch};

/// Stateless translation between typed task operations and the record store.
///
/// Every call is a single round trip. Implementations never cache or retry.
#[async_trait]
pub trait TaskApi: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_tasks(&self) -> Result<Vec<Task>, TaskError>;
    async fn create_task(&self, attributes: NewTask) -> Result<Task, TaskError>;
    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskError>;
    async fn delete_task(&self, id: TaskId) -> Result<(), TaskError>;
}

//! 看板命令：list / add / edit / advance / delete
//!
//! 每个命令都先建立 `TaskStore` 并完成首次拉取，再通过 store 执行修改，
//! 与交互界面共享同一套确认后应用的语义。

use taskboard_core::api::{
    Board, CliError, ClientConfig, NewTask, Task, TaskError, TaskId, TaskPatch, TaskStore,
};
use taskboard_plugins::factory::build_task_api;

use super::cli::{AddArgs, EditArgs, ListArgs};

/// 构建 HTTP 客户端、启动 store 并完成首次加载
pub async fn connect(cfg: &ClientConfig) -> Result<TaskStore, CliError> {
    let api = build_task_api(cfg).map_err(|e| CliError::Config(format!("{e:#}")))?;
    let store = TaskStore::spawn(api);
    let count = store.initialize().await?;
    tracing::debug!(
        target: "taskboard.store",
        server_url = %cfg.server_url,
        count,
        "board loaded"
    );
    Ok(store)
}

pub fn handle_list(store: &TaskStore, args: &ListArgs) -> Result<String, CliError> {
    let tasks = store.tasks();
    if args.json {
        let out = serde_json::to_string_pretty(&tasks).map_err(anyhow::Error::from)?;
        return Ok(out);
    }
    Ok(render_board(&Board::from_tasks(&tasks)))
}

pub async fn handle_add(store: &TaskStore, args: AddArgs) -> Result<String, CliError> {
    let task = store
        .create_task(NewTask::new(
            args.title,
            args.description,
            args.status,
            args.priority,
        ))
        .await?;
    Ok(format!("Created {}", render_task(&task)))
}

pub async fn handle_edit(store: &TaskStore, args: EditArgs) -> Result<String, CliError> {
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        status: args.status,
        priority: args.priority,
    };
    if patch.is_empty() {
        return Err(TaskError::Validation("nothing to update".to_string()).into());
    }
    let task = store.update_task(args.id, patch).await?;
    Ok(format!("Updated {}", render_task(&task)))
}

/// 将任务推进到下一列（todo -> doing -> done）
pub async fn handle_advance(store: &TaskStore, id: TaskId) -> Result<String, CliError> {
    let current = store.get(id).ok_or(TaskError::NotFound(id))?;
    let Some(next) = current.status.next() else {
        return Ok(format!("Task {id} is already done"));
    };
    let task = store.update_task(id, TaskPatch::status(next)).await?;
    Ok(format!("Moved {}", render_task(&task)))
}

pub async fn handle_delete(store: &TaskStore, id: TaskId) -> Result<String, CliError> {
    store.delete_task(id).await?;
    Ok(format!("Deleted task {id}"))
}

/// 单行任务描述，例如 `#3 [high] Write docs -> Start`
pub fn render_task(task: &Task) -> String {
    let mut line = format!("#{} [{}] {}", task.id, task.priority, task.title);
    if let Some(label) = task.status.action_label() {
        line.push_str(" -> ");
        line.push_str(label);
    }
    line
}

/// 以三列顺序输出看板
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for (idx, column) in board.columns().iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&column.heading());
        out.push('\n');
        if column.tasks.is_empty() {
            out.push_str("  (empty)\n");
            continue;
        }
        for task in &column.tasks {
            out.push_str("  ");
            out.push_str(&render_task(task));
            out.push('\n');
            let description = task.description.trim();
            if !description.is_empty() {
                out.push_str("      ");
                out.push_str(description);
                out.push('\n');
            }
        }
    }
    out
}

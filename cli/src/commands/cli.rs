use clap::{Args as ClapArgs, Parser, Subcommand};
use taskboard_core::api::{TaskId, TaskPriority, TaskStatus};

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Three-column task board backed by a JSON record store")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the record store (overrides config and TASKBOARD_SERVER_URL).
    #[arg(long, global = true)]
    pub server_url: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// JSON database file.
    #[arg(long)]
    pub db: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Print the task list as JSON instead of the board.
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "todo")]
    pub status: TaskStatus,

    #[arg(long, default_value = "medium")]
    pub priority: TaskPriority,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EditArgs {
    pub id: TaskId,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[arg(long)]
    pub priority: Option<TaskPriority>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct IdArgs {
    pub id: TaskId,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the JSON record-store server.
    Serve(ServeArgs),
    /// Show the board.
    List(ListArgs),
    Add(AddArgs),
    Edit(EditArgs),
    /// Move a task to the next column.
    Advance(IdArgs),
    Delete(IdArgs),
}

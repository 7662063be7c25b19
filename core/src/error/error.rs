use thiserror::Error;

use crate::task::TaskId;

/// Failure of a task operation. The access layer and the store both
/// propagate these unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("transport error{}{}: {message}", fmt_status(.status), fmt_url(.url))]
    Transport {
        message: String,
        status: Option<u16>,
        url: Option<String>,
    },
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("invalid task attributes: {0}")]
    Validation(String),
    #[error("task store is not initialized")]
    NotReady,
    #[error("task store has shut down")]
    StoreClosed,
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" status={s}")).unwrap_or_default()
}

fn fmt_url(url: &Option<String>) -> String {
    url.as_ref().map(|u| format!(" url={u}")).unwrap_or_default()
}

impl TaskError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
            url: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Task(#[from] TaskError),
    #[error("config error: {0}")]
    Config(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

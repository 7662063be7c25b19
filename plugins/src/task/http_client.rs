use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use taskboard_core::api::{
    validate_new_task, validate_patch, NewTask, Task, TaskApi, TaskError, TaskId, TaskPatch,
};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskHttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl TaskHttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }

    fn of(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_request() {
            Self::Request
        } else if err.is_body() {
            Self::Body
        } else if err.is_decode() {
            Self::Decode
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for TaskHttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn transport_error(
    kind: TaskHttpErrorKind,
    status: Option<u16>,
    url: &str,
    message: impl fmt::Display,
) -> TaskError {
    TaskError::Transport {
        message: format!("kind={kind}: {message}"),
        status,
        url: Some(url.to_string()),
    }
}

fn from_reqwest(err: reqwest::Error, url: &str) -> TaskError {
    let kind = TaskHttpErrorKind::of(&err);
    let status = err.status().map(|s| s.as_u16());
    transport_error(kind, status, url, err)
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// Maps a non-success response to the task error taxonomy.
///
/// `target` is the id the request addressed; only then is a 404 a `NotFound`.
fn status_error(status: u16, url: &str, body: &str, target: Option<TaskId>) -> TaskError {
    let preview = preview_body(body);
    match (status, target) {
        (404, Some(id)) => TaskError::NotFound(id),
        (400 | 422, _) => TaskError::Validation(preview),
        _ => transport_error(TaskHttpErrorKind::Status, Some(status), url, preview),
    }
}

async fn read_body(
    resp: reqwest::Response,
    target: Option<TaskId>,
) -> Result<(u16, String), TaskError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp.text().await.map_err(|err| from_reqwest(err, &url))?;

    if !status.is_success() {
        return Err(status_error(status.as_u16(), &url, &body, target));
    }
    Ok((status.as_u16(), body))
}

async fn parse_json_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    target: Option<TaskId>,
) -> Result<T, TaskError> {
    let url = resp.url().to_string();
    let (status, body) = read_body(resp, target).await?;

    serde_json::from_str::<T>(&body).map_err(|err| {
        let message = format!(
            "failed to decode response body: {} | body={}",
            err,
            preview_body(&body)
        );
        transport_error(TaskHttpErrorKind::Decode, Some(status), &url, message)
    })
}

/// Task access layer over the record store's REST surface.
#[derive(Clone)]
pub struct HttpTaskClient {
    http: reqwest::Client,
    // Pre-built collection URL, e.g. http://127.0.0.1:3000/tasks
    url_collection: String,
}

impl HttpTaskClient {
    pub fn new(base_url: &str, collection: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/');
        let collection = collection.trim_matches('/');
        if collection.is_empty() {
            anyhow::bail!("collection name cannot be empty");
        }
        Ok(Self {
            http,
            url_collection: format!("{normalized}/{collection}"),
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.url_collection
    }

    fn item_url(&self, id: TaskId) -> String {
        format!("{}/{}", self.url_collection, id)
    }
}

#[async_trait]
impl TaskApi for HttpTaskClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, TaskError> {
        let url = &self.url_collection;
        tracing::debug!(target: "taskboard.api", stage = "tasks.fetch.in", url = %url);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| from_reqwest(err, url))?;
        let status = resp.status();
        let tasks: Vec<Task> = parse_json_response(resp, None).await?;
        tracing::debug!(
            target: "taskboard.api",
            stage = "tasks.fetch.out",
            status = %status,
            count = tasks.len()
        );
        Ok(tasks)
    }

    async fn create_task(&self, attributes: NewTask) -> Result<Task, TaskError> {
        validate_new_task(&attributes)?;
        let url = &self.url_collection;
        tracing::debug!(
            target: "taskboard.api",
            stage = "tasks.create.in",
            url = %url,
            status = %attributes.status,
            priority = %attributes.priority
        );
        let resp = self
            .http
            .post(url)
            .json(&attributes)
            .send()
            .await
            .map_err(|err| from_reqwest(err, url))?;
        let status = resp.status();
        let task: Task = parse_json_response(resp, None).await?;
        tracing::debug!(
            target: "taskboard.api",
            stage = "tasks.create.out",
            status = %status,
            id = %task.id
        );
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        validate_patch(&patch)?;
        let url = self.item_url(id);
        tracing::debug!(target: "taskboard.api", stage = "tasks.update.in", url = %url, patch = ?patch);
        let resp = self
            .http
            .patch(&url)
            .json(&patch)
            .send()
            .await
            .map_err(|err| from_reqwest(err, &url))?;
        let status = resp.status();
        let task: Task = parse_json_response(resp, Some(id)).await?;
        tracing::debug!(target: "taskboard.api", stage = "tasks.update.out", status = %status);
        Ok(task)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), TaskError> {
        let url = self.item_url(id);
        tracing::debug!(target: "taskboard.api", stage = "tasks.delete.in", url = %url);
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|err| from_reqwest(err, &url))?;
        let (status, _) = read_body(resp, Some(id)).await?;
        tracing::debug!(target: "taskboard.api", stage = "tasks.delete.out", status = status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use taskboard_core::api::{TaskPriority, TaskStatus};

    fn client(url: String) -> HttpTaskClient {
        HttpTaskClient::new(&url, "tasks", 1_000).unwrap()
    }

    fn new_task() -> NewTask {
        NewTask::new("A", "d", TaskStatus::Todo, TaskPriority::Low)
    }

    #[test]
    fn test_preview_body_empty() {
        assert_eq!(preview_body("   "), "<empty body>");
    }

    #[test]
    fn test_preview_body_truncates() {
        let body = "a".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert!(preview.len() <= BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn test_collection_url_normalized() {
        let c = HttpTaskClient::new("http://localhost:3000/", "/tasks/", 1_000).unwrap();
        assert_eq!(c.collection_url(), "http://localhost:3000/tasks");
        assert_eq!(c.item_url(TaskId::new(4)), "http://localhost:3000/tasks/4");
        assert!(HttpTaskClient::new("http://localhost:3000", "", 1_000).is_err());
    }

    #[test]
    fn test_status_error_mapping() {
        let url = "http://localhost:3000/tasks/1";
        assert_eq!(
            status_error(404, url, "{}", Some(TaskId::new(1))),
            TaskError::NotFound(TaskId::new(1))
        );
        assert!(status_error(404, url, "{}", None).is_transport());
        assert!(matches!(
            status_error(422, url, "title required", None),
            TaskError::Validation(msg) if msg == "title required"
        ));
        match status_error(502, url, "bad gateway", None) {
            TaskError::Transport {
                message,
                status,
                url,
            } => {
                assert_eq!(status, Some(502));
                assert_eq!(url.as_deref(), Some("http://localhost:3000/tasks/1"));
                assert!(message.contains("kind=status"));
                assert!(message.contains("bad gateway"));
            }
            other => panic!("Expected Transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_tasks_accepts_string_and_numeric_ids() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tasks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":1,"title":"A","description":"","status":"todo","priority":"low"},
                    {"id":"2","title":"B","description":"x","status":"done","priority":"high"}]"#,
            )
            .create_async()
            .await;

        let tasks = client(server.url()).fetch_tasks().await.unwrap();
        let ids: Vec<u64> = tasks.iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(tasks[1].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_fetch_tasks_status_error_is_transport() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tasks")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = client(server.url()).fetch_tasks().await.unwrap_err();
        match err {
            TaskError::Transport { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("Expected Transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_tasks_decode_error_is_transport() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tasks")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(server.url()).fetch_tasks().await.unwrap_err();
        match err {
            TaskError::Transport { message, .. } => {
                assert!(message.contains("kind=decode"));
                assert!(message.contains("failed to decode response body"));
            }
            other => panic!("Expected Transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport() {
        // nothing listens on port 9 (discard) in the test environment
        let c = HttpTaskClient::new("http://127.0.0.1:9", "tasks", 500).unwrap();
        assert!(c.fetch_tasks().await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn test_create_task_posts_attributes_without_id() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/tasks")
            .match_body(Matcher::Json(serde_json::json!({
                "title": "A",
                "description": "d",
                "status": "todo",
                "priority": "low"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1,"title":"A","description":"d","status":"todo","priority":"low"}"#)
            .create_async()
            .await;

        let task = client(server.url()).create_task(new_task()).await.unwrap();
        assert_eq!(task.id, TaskId::new(1));
        assert_eq!(task.title, "A");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_task_invalid_attributes_never_sent() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/tasks")
            .expect(0)
            .create_async()
            .await;

        let mut attrs = new_task();
        attrs.title = "   ".to_string();
        let err = client(server.url()).create_task(attrs).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_task_sends_partial_patch() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/tasks/1")
            .match_body(Matcher::Json(serde_json::json!({ "status": "doing" })))
            .with_status(200)
            .with_body(r#"{"id":1,"title":"A","description":"d","status":"doing","priority":"low"}"#)
            .create_async()
            .await;

        let task = client(server.url())
            .update_task(TaskId::new(1), TaskPatch::status(TaskStatus::Doing))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Doing);
        assert_eq!(task.title, "A");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_task_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("PATCH", "/tasks/9")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let err = client(server.url())
            .update_task(TaskId::new(9), TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap_err();
        assert_eq!(err, TaskError::NotFound(TaskId::new(9)));
    }

    #[tokio::test]
    async fn test_delete_task_accepts_empty_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/tasks/1")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let _m2 = server
            .mock("DELETE", "/tasks/2")
            .with_status(204)
            .create_async()
            .await;

        let c = client(server.url());
        c.delete_task(TaskId::new(1)).await.unwrap();
        c.delete_task(TaskId::new(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_task_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/tasks/3")
            .with_status(404)
            .create_async()
            .await;

        let err = client(server.url()).delete_task(TaskId::new(3)).await.unwrap_err();
        assert_eq!(err, TaskError::NotFound(TaskId::new(3)));
    }
}

use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use taskboard_cli::commands::board;
use taskboard_cli::commands::cli::{AddArgs, EditArgs, ListArgs};
use taskboard_cli::http::{db::RecordDb, serve_on, AppState};
use taskboard_core::api::{
    ClientConfig, CliError, TaskError, TaskId, TaskPriority, TaskStatus, TaskStore,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Harness {
    _dir: tempfile::TempDir,
    db_path: std::path::PathBuf,
    addr: SocketAddr,
    state: AppState,
    shutdown_tx: oneshot::Sender<()>,
    server: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("db.json");
        let db = RecordDb::open(&db_path, "tasks").await.unwrap();
        let state = AppState::new("e2e".into(), db);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_on(listener, state.clone(), async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            _dir: dir,
            db_path,
            addr,
            state,
            shutdown_tx,
            server,
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            server_url: format!("http://{}", self.addr),
            ..ClientConfig::default()
        }
    }

    fn requests_handled(&self) -> u64 {
        self.state.stats.read().unwrap().requests_total
    }

    fn on_disk(&self) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(&self.db_path).unwrap()).unwrap()
    }

    async fn stop(self) {
        self.shutdown_tx.send(()).unwrap();
        self.server.await.unwrap().unwrap();
    }
}

fn add_args(title: &str) -> AddArgs {
    AddArgs {
        title: title.to_string(),
        description: String::new(),
        status: TaskStatus::Todo,
        priority: TaskPriority::Low,
    }
}

#[tokio::test]
async fn test_board_commands_against_record_store() {
    let harness = Harness::start().await;
    let store: TaskStore = board::connect(&harness.client_config()).await.unwrap();
    assert!(store.tasks().is_empty());

    let out = board::handle_add(&store, add_args("Write docs")).await.unwrap();
    assert_eq!(out, "Created #1 [low] Write docs -> Start");

    let out = board::handle_advance(&store, TaskId::new(1)).await.unwrap();
    assert_eq!(out, "Moved #1 [low] Write docs -> Complete");

    let out = board::handle_edit(
        &store,
        EditArgs {
            id: TaskId::new(1),
            title: None,
            description: Some("api and cli".into()),
            status: None,
            priority: Some(TaskPriority::High),
        },
    )
    .await
    .unwrap();
    assert_eq!(out, "Updated #1 [high] Write docs -> Complete");

    let disk = harness.on_disk();
    let record = &disk["tasks"][0];
    assert_eq!(record["status"], "doing");
    assert_eq!(record["description"], "api and cli");
    assert_eq!(record["id"], 1);

    let board_text = board::handle_list(&store, &ListArgs { json: false }).unwrap();
    assert!(board_text.contains("In progress (1)"));

    // a second client sees the same list after its own initial fetch
    let other = board::connect(&harness.client_config()).await.unwrap();
    assert_eq!(other.tasks(), store.tasks());

    board::handle_delete(&store, TaskId::new(1)).await.unwrap();
    let err = board::handle_delete(&store, TaskId::new(1)).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Task(TaskError::NotFound(id)) if id == TaskId::new(1)
    ));
    assert!(store.tasks().is_empty());
    assert_eq!(harness.on_disk(), serde_json::json!({ "tasks": [] }));

    harness.stop().await;
}

#[tokio::test]
async fn test_advance_unknown_task_is_not_found_without_request() {
    let harness = Harness::start().await;
    let store = board::connect(&harness.client_config()).await.unwrap();

    let before = harness.requests_handled();

    let err = board::handle_advance(&store, TaskId::new(42)).await.unwrap_err();
    assert!(matches!(err, CliError::Task(TaskError::NotFound(_))));
    assert_eq!(harness.requests_handled(), before);

    harness.stop().await;
}

#[tokio::test]
async fn test_edit_without_fields_is_rejected() {
    let harness = Harness::start().await;
    let store = board::connect(&harness.client_config()).await.unwrap();
    board::handle_add(&store, add_args("A")).await.unwrap();

    let err = board::handle_edit(
        &store,
        EditArgs {
            id: TaskId::new(1),
            title: None,
            description: None,
            status: None,
            priority: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Task(TaskError::Validation(_))));

    harness.stop().await;
}

#[tokio::test]
async fn test_stop_right_after_start_shuts_down() {
    let harness = Harness::start().await;
    harness.stop().await;
}

#[tokio::test]
async fn test_connect_to_stopped_server_is_transport_error() {
    let harness = Harness::start().await;
    let cfg = harness.client_config();
    harness.stop().await;

    let err = board::connect(&cfg).await.err().unwrap();
    assert!(matches!(err, CliError::Task(TaskError::Transport { .. })));
}

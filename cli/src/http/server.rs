//! HTTP服务器生命周期管理

use super::{
    db::RecordDb,
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    AppState,
};
use crate::commands::cli::ServeArgs;
use axum::middleware;
use std::future::Future;
use std::net::SocketAddr;
use taskboard_core::api::{AppConfig, CliError};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use uuid::Uuid;

/// HTTP服务器配置（已合并 CLI 参数、环境变量与配置文件）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub collection: String,
}

impl ServeConfig {
    /// 合并配置：CLI 参数优先，配置文件（含环境变量覆盖）作为默认值
    pub fn resolve(args: &ServeArgs, cfg: &AppConfig) -> Self {
        let server = &cfg.server;
        Self {
            host: args.host.clone().unwrap_or_else(|| server.host.clone()),
            port: args.port.unwrap_or(server.port),
            db_path: args
                .db
                .clone()
                .unwrap_or_else(|| server.db_path.clone()),
            collection: server.collection.clone(),
        }
    }
}

/// 处理 serve 命令
pub async fn handle_serve(args: ServeArgs, cfg: &AppConfig) -> Result<(), CliError> {
    let config = ServeConfig::resolve(&args, cfg);
    let session_id = Uuid::new_v4().to_string();

    let db = RecordDb::open(&config.db_path, &config.collection)
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    let state = AppState::new(session_id, db);

    start_server_with_config(config, state, std::future::pending())
        .await
        .map_err(|e| CliError::Server(format!("{e:#}")))
}

/// 使用指定配置绑定端口并启动HTTP服务器
pub async fn start_server_with_config<F>(
    config: ServeConfig,
    state: AppState,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        target: "taskboard.server",
        "Starting HTTP server on {}:{} (session: {}, db: {})",
        config.host, config.port, state.session_id, config.db_path
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;

    serve_on(listener, state, shutdown).await
}

/// 在已绑定的 listener 上运行服务，直到 Ctrl+C、SIGTERM 或 `shutdown` 完成
pub async fn serve_on<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    // 构建路由并添加中间件
    let app = create_router(state)
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack());

    info!(
        target: "taskboard.server",
        "HTTP server listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!(target: "taskboard.server", "Received Ctrl+C signal");
                }
                _ = shutdown => {
                    info!(target: "taskboard.server", "Received shutdown signal");
                }
                _ = wait_for_sigterm() => {
                    info!(target: "taskboard.server", "Received SIGTERM signal");
                }
            }

            info!(target: "taskboard.server", "Starting graceful shutdown...");
        })
        .await?;

    info!(target: "taskboard.server", "Server shutdown complete");
    Ok(())
}

/// 等待 SIGTERM 信号（Unix系统）
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(target: "taskboard.server", error = %e, "Failed to setup SIGTERM handler");
            std::future::pending::<()>().await
        }
    }
}

/// Windows 系统不支持 SIGTERM，使用空操作
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

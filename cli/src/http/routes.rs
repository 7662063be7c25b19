//! HTTP路由handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Local;
use serde_json::{json, Value};

use crate::http::{
    models::*,
    state::AppState,
    validation::{validate_collection_name, validate_record_id},
};

/// 创建所有路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/db", get(db_handler))
        .route(
            "/:collection",
            get(list_handler).post(create_handler),
        )
        .route(
            "/:collection/:id",
            get(get_handler)
                .patch(patch_handler)
                .put(replace_handler)
                .delete(delete_handler),
        )
        .with_state(state)
}

/// 请求体解析失败统一映射为 400
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, HttpServerError> {
    body.map(|Json(v)| v)
        .map_err(|e| HttpServerError::InvalidRequest(e.body_text()))
}

/// 统计失败请求后原样返回错误
fn track<T>(state: &AppState, res: Result<T, HttpServerError>) -> Result<T, HttpServerError> {
    if res.is_err() {
        state.record_error();
    }
    res
}

/// GET /:collection - 列出集合内全部记录
async fn list_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<Value>>, HttpServerError> {
    state.record_request("GET /:collection");

    let res = async {
        validate_collection_name(&collection)?;
        Ok::<_, HttpServerError>(state.db.list(&collection).await?)
    }
    .await;
    track(&state, res).map(Json)
}

/// GET /:collection/:id - 获取单条记录
async fn get_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, HttpServerError> {
    state.record_request("GET /:collection/:id");

    let res = async {
        validate_collection_name(&collection)?;
        validate_record_id(&id)?;
        Ok::<_, HttpServerError>(state.db.get(&collection, &id).await?)
    }
    .await;
    track(&state, res).map(Json)
}

/// POST /:collection - 新建记录，返回 201
async fn create_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), HttpServerError> {
    state.record_request("POST /:collection");

    let res = async {
        validate_collection_name(&collection)?;
        let body = json_body(body)?;
        Ok::<_, HttpServerError>(state.db.insert(&collection, body).await?)
    }
    .await;

    let record = track(&state, res)?;
    let id = record.get("id").cloned().unwrap_or_default();
    tracing::debug!(
        target: "taskboard.server",
        collection = %collection,
        id = %id,
        "record created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /:collection/:id - 浅合并
async fn patch_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, HttpServerError> {
    state.record_request("PATCH /:collection/:id");

    let res = async {
        validate_collection_name(&collection)?;
        validate_record_id(&id)?;
        let body = json_body(body)?;
        Ok::<_, HttpServerError>(state.db.patch(&collection, &id, body).await?)
    }
    .await;
    track(&state, res).map(Json)
}

/// PUT /:collection/:id - 整体替换
async fn replace_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, HttpServerError> {
    state.record_request("PUT /:collection/:id");

    let res = async {
        validate_collection_name(&collection)?;
        validate_record_id(&id)?;
        let body = json_body(body)?;
        Ok::<_, HttpServerError>(state.db.replace(&collection, &id, body).await?)
    }
    .await;
    track(&state, res).map(Json)
}

/// DELETE /:collection/:id - 删除记录，返回空对象
async fn delete_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, HttpServerError> {
    state.record_request("DELETE /:collection/:id");

    let res = async {
        validate_collection_name(&collection)?;
        validate_record_id(&id)?;
        state.db.remove(&collection, &id).await?;
        Ok::<_, HttpServerError>(json!({}))
    }
    .await;
    track(&state, res).map(Json)
}

/// GET /db - 整个数据库
async fn db_handler(State(state): State<AppState>) -> Json<Value> {
    state.record_request("GET /db");
    Json(state.db.snapshot().await)
}

/// GET /health - 健康检查
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let collections = state.db.collections().await;
    let (uptime_seconds, requests_handled, requests_by_endpoint, errors_total) =
        match state.stats.read() {
            Ok(stats) => (
                stats.uptime_seconds(),
                stats.requests_total,
                stats
                    .requests_by_endpoint
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect(),
                stats.errors_total,
            ),
            Err(_) => (0.0, 0, Default::default(), 0),
        };

    Json(HealthResponse {
        status: "healthy".into(),
        session_id: state.session_id.clone(),
        uptime_seconds,
        requests_handled,
        requests_by_endpoint,
        errors_total,
        collections,
        timestamp: Local::now().to_rfc3339(),
    })
}

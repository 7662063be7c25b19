//! HTTP API数据模型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

use super::db::DbError;

// ============= Health =============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub requests_by_endpoint: BTreeMap<String, u64>,
    pub errors_total: u64,
    pub collections: Vec<String>,
    pub timestamp: String,
}

// ============= Error Handling =============

#[derive(Debug)]
pub enum HttpServerError {
    InvalidRequest(String),
    NotFound(String),
    Conflict(String),
    Storage(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            Self::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", msg),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
            "error_code": error_code,
        });

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for HttpServerError {
    fn from(err: DbError) -> Self {
        let msg = err.to_string();
        match err {
            DbError::UnknownCollection(_) | DbError::NotFound { .. } => Self::NotFound(msg),
            DbError::NotAnObject => Self::InvalidRequest(msg),
            DbError::DuplicateId(_) | DbError::IdsExhausted(_) => Self::Conflict(msg),
            DbError::InvalidDatabase { .. } | DbError::Io(_) | DbError::Json(_) => {
                Self::Storage(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_status_mapping() {
        let cases = [
            (DbError::UnknownCollection("users".into()), StatusCode::NOT_FOUND),
            (
                DbError::NotFound {
                    collection: "tasks".into(),
                    id: "1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (DbError::NotAnObject, StatusCode::BAD_REQUEST),
            (DbError::DuplicateId("1".into()), StatusCode::CONFLICT),
            (DbError::IdsExhausted("tasks".into()), StatusCode::CONFLICT),
            (
                DbError::Io(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let resp = HttpServerError::from(err).into_response();
            assert_eq!(resp.status(), expected);
        }
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse {
            status: "ok".into(),
            session_id: "s1".into(),
            uptime_seconds: 1.5,
            requests_handled: 3,
            requests_by_endpoint: BTreeMap::from([("GET /:collection".to_string(), 3)]),
            errors_total: 0,
            collections: vec!["tasks".into()],
            timestamp: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"requests_by_endpoint\":{\"GET /:collection\":3}"));
        assert!(json.contains("\"collections\":[\"tasks\"]"));
    }
}

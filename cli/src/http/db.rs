//! JSON 文件记录库
//!
//! 文件顶层是一个对象，每个值为数组的键就是一个集合（collection）。
//! 每次成功修改后整个库写回文件：先写临时文件再 rename。

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("collection '{0}' not found")]
    UnknownCollection(String),
    #[error("record '{id}' not found in '{collection}'")]
    NotFound { collection: String, id: String },
    #[error("record body must be a JSON object")]
    NotAnObject,
    #[error("insert failed, duplicate id '{0}'")]
    DuplicateId(String),
    #[error("insert failed, no numeric id left in '{0}'")]
    IdsExhausted(String),
    #[error("invalid database file {path}: {reason}")]
    InvalidDatabase { path: String, reason: String },
    #[error("database io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 记录 id 与路径参数比较：数字 `1` 与字符串 `"1"` 视为相同
fn id_matches(record: &Value, id: &str) -> bool {
    match record.get("id") {
        Some(Value::Number(n)) => n.to_string() == id,
        Some(Value::String(s)) => s == id,
        _ => false,
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// 下一个数字 id：现有数字 id 的最大值加一，空集合从 1 开始；最大值已是 u64::MAX 时返回 None
fn next_id(records: &[Value]) -> Option<u64> {
    records
        .iter()
        .filter_map(|r| match r.get("id") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse::<u64>().ok(),
            _ => None,
        })
        .max()
        .unwrap_or(0)
        .checked_add(1)
}

fn collection_mut<'a>(
    data: &'a mut Map<String, Value>,
    name: &str,
) -> Result<&'a mut Vec<Value>, DbError> {
    match data.get_mut(name) {
        Some(Value::Array(records)) => Ok(records),
        _ => Err(DbError::UnknownCollection(name.to_string())),
    }
}

fn not_found(collection: &str, id: &str) -> DbError {
    DbError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

pub struct RecordDb {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
}

impl RecordDb {
    /// 打开数据库文件；文件不存在时以 `{ "<collection>": [] }` 创建
    pub async fn open(path: impl AsRef<Path>, default_collection: &str) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let value: Value =
                    serde_json::from_str(&raw).map_err(|e| DbError::InvalidDatabase {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                match value {
                    Value::Object(map) => map,
                    _ => {
                        return Err(DbError::InvalidDatabase {
                            path: path.display().to_string(),
                            reason: "top-level value must be an object".to_string(),
                        })
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut map = Map::new();
                map.insert(default_collection.to_string(), Value::Array(Vec::new()));
                write_atomic(&path, &map).await?;
                tracing::info!(target: "taskboard.server", path = %path.display(), "created database file");
                map
            }
            Err(e) => return Err(e.into()),
        };

        let collections = data.values().filter(|v| v.is_array()).count();
        tracing::info!(
            target: "taskboard.server",
            path = %path.display(),
            collections,
            "database loaded"
        );

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> Value {
        Value::Object(self.data.read().await.clone())
    }

    pub async fn collections(&self) -> Vec<String> {
        self.data
            .read()
            .await
            .iter()
            .filter(|(_, v)| v.is_array())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub async fn list(&self, collection: &str) -> Result<Vec<Value>, DbError> {
        match self.data.read().await.get(collection) {
            Some(Value::Array(records)) => Ok(records.clone()),
            _ => Err(DbError::UnknownCollection(collection.to_string())),
        }
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Value, DbError> {
        self.list(collection)
            .await?
            .into_iter()
            .find(|r| id_matches(r, id))
            .ok_or_else(|| not_found(collection, id))
    }

    /// 插入记录。未带 id（或 id 为 null）时分配数字 id
    pub async fn insert(&self, collection: &str, body: Value) -> Result<Value, DbError> {
        let Value::Object(mut fields) = body else {
            return Err(DbError::NotAnObject);
        };

        self.mutate(|data| {
            let records = collection_mut(data, collection)?;
            match fields.get("id").and_then(id_text) {
                Some(id) => {
                    if records.iter().any(|r| id_matches(r, &id)) {
                        return Err(DbError::DuplicateId(id));
                    }
                }
                None => {
                    let id = next_id(records)
                        .ok_or_else(|| DbError::IdsExhausted(collection.to_string()))?;
                    fields.insert("id".to_string(), Value::from(id));
                }
            }
            let record = Value::Object(fields);
            records.push(record.clone());
            Ok(record)
        })
        .await
    }

    /// 浅合并；id 字段保持不变
    pub async fn patch(&self, collection: &str, id: &str, body: Value) -> Result<Value, DbError> {
        let Value::Object(fields) = body else {
            return Err(DbError::NotAnObject);
        };

        self.mutate(|data| {
            let records = collection_mut(data, collection)?;
            let record = records
                .iter_mut()
                .find(|r| id_matches(r, id))
                .ok_or_else(|| not_found(collection, id))?;
            if let Value::Object(existing) = record {
                for (k, v) in fields {
                    if k != "id" {
                        existing.insert(k, v);
                    }
                }
            }
            Ok(record.clone())
        })
        .await
    }

    /// 整体替换；保留原 id
    pub async fn replace(&self, collection: &str, id: &str, body: Value) -> Result<Value, DbError> {
        let Value::Object(mut fields) = body else {
            return Err(DbError::NotAnObject);
        };

        self.mutate(|data| {
            let records = collection_mut(data, collection)?;
            let record = records
                .iter_mut()
                .find(|r| id_matches(r, id))
                .ok_or_else(|| not_found(collection, id))?;
            let original_id = record.get("id").cloned().unwrap_or(Value::Null);
            fields.insert("id".to_string(), original_id);
            *record = Value::Object(fields);
            Ok(record.clone())
        })
        .await
    }

    pub async fn remove(&self, collection: &str, id: &str) -> Result<Value, DbError> {
        self.mutate(|data| {
            let records = collection_mut(data, collection)?;
            let idx = records
                .iter()
                .position(|r| id_matches(r, id))
                .ok_or_else(|| not_found(collection, id))?;
            Ok(records.remove(idx))
        })
        .await
    }

    /// 在写锁内应用修改并持久化；写文件失败时回滚内存状态
    async fn mutate<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<T, DbError>,
    {
        let mut data = self.data.write().await;
        let backup = data.clone();
        let out = f(&mut *data)?;

        if let Err(e) = write_atomic(&self.path, &data).await {
            tracing::error!(
                target: "taskboard.server",
                path = %self.path.display(),
                error = %e,
                "failed to persist database, rolling back"
            );
            *data = backup;
            return Err(e);
        }
        Ok(out)
    }
}

async fn write_atomic(path: &Path, data: &Map<String, Value>) -> Result<(), DbError> {
    let body = serde_json::to_string_pretty(data)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

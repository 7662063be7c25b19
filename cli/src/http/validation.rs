//! 基础请求验证逻辑

use super::models::HttpServerError;

/// 验证集合名格式（仅允许字母数字、下划线、连字符）
pub fn validate_collection_name(name: &str) -> Result<(), HttpServerError> {
    if name.is_empty() {
        return Err(HttpServerError::InvalidRequest(
            "Collection name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(HttpServerError::InvalidRequest(format!(
            "Collection name too long ({} chars, max 100)",
            name.len()
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(HttpServerError::InvalidRequest(
            "Collection name can only contain alphanumeric, underscore, and hyphen characters"
                .to_string(),
        ));
    }

    Ok(())
}

/// 验证路径中的记录 id
pub fn validate_record_id(id: &str) -> Result<(), HttpServerError> {
    if id.trim().is_empty() {
        return Err(HttpServerError::InvalidRequest(
            "Record id cannot be empty".to_string(),
        ));
    }
    // db 按原样比较 id，带空白的 id 永远匹配不到
    if id.trim() != id {
        return Err(HttpServerError::InvalidRequest(format!(
            "Record id {id:?} has surrounding whitespace"
        )));
    }
    if id.len() > 64 {
        return Err(HttpServerError::InvalidRequest(format!(
            "Record id too long ({} chars, max 64)",
            id.len()
        )));
    }
    Ok(())
}

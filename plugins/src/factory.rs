use anyhow::Result;
use std::sync::Arc;

use taskboard_core::api::{ClientConfig, TaskApi};

use crate::task::HttpTaskClient;

pub fn build_task_api(cfg: &ClientConfig) -> Result<Arc<dyn TaskApi>> {
    let client = HttpTaskClient::new(&cfg.server_url, &cfg.collection, cfg.timeout_ms)?;
    Ok(Arc::new(client))
}

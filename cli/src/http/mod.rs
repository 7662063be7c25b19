//! HTTP服务器模块 - 基于 JSON 文件的记录存储服务（json-server 语义）

pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;

pub use models::*;
pub use server::*;
pub use state::*;

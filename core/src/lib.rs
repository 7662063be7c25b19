pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod store;
pub mod task;

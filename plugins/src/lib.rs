pub mod factory;
pub mod task;

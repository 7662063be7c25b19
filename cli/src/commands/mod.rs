pub mod board;
pub mod cli;

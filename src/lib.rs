pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod logging;
pub mod report;
pub mod session;
pub mod storage;
pub mod todos;
pub mod ui;

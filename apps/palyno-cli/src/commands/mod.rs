//! Command handlers. Each returns what it prints so tests can inspect it.

pub mod config;
pub mod report;
pub mod validate;

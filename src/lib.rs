// src/lib.rs
pub mod config;
pub mod dashboard;
pub mod endpoint;
pub mod metrics;
pub mod probe;
pub mod render;
pub mod server;

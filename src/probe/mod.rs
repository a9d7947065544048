// src/probe/mod.rs
mod client;
mod error;

pub use client::{HttpServiceClient, ServiceClient};
pub use error::ProbeError;

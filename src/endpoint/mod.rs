// src/endpoint/mod.rs
mod resolver;

pub use resolver::{EndpointResolver, ServiceEndpoint};

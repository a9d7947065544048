// src/dashboard/mod.rs
mod aggregator;
mod model;
mod trigger;

pub use aggregator::Aggregator;
pub use model::{DashboardViewState, ServiceResult, ServiceSide, ServiceState};
pub use trigger::Dashboard;

// src/dashboard/model.rs
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

/// Terminal outcome of one service request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceResult {
    Success { payload: Value },
    Unavailable { service: String },
}

impl ServiceResult {
    pub fn unavailable(service: impl Into<String>) -> Self {
        ServiceResult::Unavailable {
            service: service.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResult::Success { .. })
    }

    /// What the display shows: the payload as received, or an error object
    /// naming the service.
    pub fn display_payload(&self) -> Value {
        match self {
            ServiceResult::Success { payload } => payload.clone(),
            ServiceResult::Unavailable { service } => {
                json!({ "error": format!("{} unavailable", service) })
            }
        }
    }
}

/// A pending side serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServiceState {
    Pending,
    Settled(ServiceResult),
}

impl ServiceState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ServiceState::Pending)
    }

    pub fn result(&self) -> Option<&ServiceResult> {
        match self {
            ServiceState::Pending => None,
            ServiceState::Settled(result) => Some(result),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSide {
    A,
    B,
}

/// Snapshot of one poll cycle. `is_loading` holds exactly while at least
/// one side is still pending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViewState {
    pub generation: u64,
    pub service_a: ServiceState,
    pub service_b: ServiceState,
    pub is_loading: bool,
}

impl DashboardViewState {
    pub fn pending(generation: u64) -> Self {
        Self {
            generation,
            service_a: ServiceState::Pending,
            service_b: ServiceState::Pending,
            is_loading: true,
        }
    }

    /// Records the outcome for one side. A side settles once; later results
    /// for the same side are dropped.
    pub fn settle(mut self, side: ServiceSide, result: ServiceResult) -> Self {
        let slot = match side {
            ServiceSide::A => &mut self.service_a,
            ServiceSide::B => &mut self.service_b,
        };

        if slot.is_pending() {
            *slot = ServiceState::Settled(result);
        } else {
            warn!(
                "Generation {}: side {:?} already settled, ignoring late result",
                self.generation, side
            );
        }

        self.is_loading = self.service_a.is_pending() || self.service_b.is_pending();
        self
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading
    }

    pub fn side(&self, side: ServiceSide) -> &ServiceState {
        match side {
            ServiceSide::A => &self.service_a,
            ServiceSide::B => &self.service_b,
        }
    }
}

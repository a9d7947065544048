// src/dashboard/aggregator.rs
use super::model::{DashboardViewState, ServiceResult, ServiceSide};
use crate::endpoint::ServiceEndpoint;
use crate::metrics::{MetricsCollector, Timer};
use crate::probe::{ProbeError, ServiceClient};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Polls both services concurrently and folds their outcomes into a
/// terminal `DashboardViewState`. Has no failure mode of its own.
pub struct Aggregator {
    client: Arc<dyn ServiceClient>,
    timeout: Duration,
    metrics: Option<Arc<MetricsCollector>>,
    generation: AtomicU64,
}

impl Aggregator {
    pub fn new(client: Arc<dyn ServiceClient>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            metrics: None,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Opens a new cycle: both sides pending, next generation number.
    pub fn begin_cycle(&self) -> DashboardViewState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        DashboardViewState::pending(generation)
    }

    /// Runs both requests to completion and settles `state`.
    pub async fn complete(
        &self,
        state: DashboardViewState,
        endpoints: &(ServiceEndpoint, ServiceEndpoint),
    ) -> DashboardViewState {
        let timer = Timer::new();
        let (a, b) = endpoints;

        // Both futures are created before the only await point.
        let (result_a, result_b) = tokio::join!(self.settle_one(a), self.settle_one(b));

        let state = state
            .settle(ServiceSide::A, result_a)
            .settle(ServiceSide::B, result_b);

        if let Some(metrics) = &self.metrics {
            metrics.record_poll_cycle(timer.elapsed());
        }

        info!(
            "Poll cycle {} settled in {:?}: {}={}, {}={}",
            state.generation,
            timer.elapsed(),
            a.label,
            outcome_name(&state, ServiceSide::A),
            b.label,
            outcome_name(&state, ServiceSide::B),
        );

        state
    }

    pub async fn poll(&self, endpoints: &(ServiceEndpoint, ServiceEndpoint)) -> DashboardViewState {
        let state = self.begin_cycle();
        self.complete(state, endpoints).await
    }

    async fn settle_one(&self, endpoint: &ServiceEndpoint) -> ServiceResult {
        let timer = Timer::new();

        let outcome = match timeout(self.timeout, self.client.fetch(endpoint)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        };

        let result = match outcome {
            Ok(payload) => {
                debug!("{} responded in {:?}", endpoint.label, timer.elapsed());
                ServiceResult::Success { payload }
            }
            Err(e) => {
                warn!(
                    "{} unavailable at {}: {} ({})",
                    endpoint.label,
                    endpoint.base_url,
                    e,
                    e.kind()
                );
                ServiceResult::unavailable(endpoint.label.clone())
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_service_request(&endpoint.label, result.is_success(), timer.elapsed());
        }

        result
    }
}

fn outcome_name(state: &DashboardViewState, side: ServiceSide) -> &'static str {
    match state.side(side).result() {
        Some(ServiceResult::Success { .. }) => "success",
        Some(ServiceResult::Unavailable { .. }) => "unavailable",
        None => "pending",
    }
}

// src/dashboard/trigger.rs
use super::aggregator::Aggregator;
use super::model::DashboardViewState;
use crate::endpoint::{EndpointResolver, ServiceEndpoint};
use crate::metrics::MetricsCollector;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Entry point for the display layer. Each `refresh` is one independent
/// poll cycle; the latest cycle's view-state is published on a watch channel.
/// Endpoints are resolved once at construction since the configuration they
/// come from is immutable.
pub struct Dashboard {
    endpoints: (ServiceEndpoint, ServiceEndpoint),
    aggregator: Aggregator,
    metrics: Option<Arc<MetricsCollector>>,
    state_tx: watch::Sender<DashboardViewState>,
}

impl Dashboard {
    pub fn new(resolver: EndpointResolver, aggregator: Aggregator) -> Self {
        let (state_tx, _) = watch::channel(DashboardViewState::pending(0));
        Self {
            endpoints: resolver.resolve(),
            aggregator,
            metrics: None,
            state_tx,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardViewState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> DashboardViewState {
        self.state_tx.borrow().clone()
    }

    pub fn endpoints(&self) -> &(ServiceEndpoint, ServiceEndpoint) {
        &self.endpoints
    }

    /// Runs one poll cycle and returns its terminal view-state. The pending
    /// state is published first; the terminal state is published only if no
    /// newer cycle has started meanwhile.
    pub async fn refresh(&self) -> DashboardViewState {
        let endpoints = &self.endpoints;
        let pending = self.aggregator.begin_cycle();
        let generation = pending.generation;

        info!(
            "Starting poll cycle {}: {} at {}, {} at {}",
            generation,
            endpoints.0.label,
            endpoints.0.base_url,
            endpoints.1.label,
            endpoints.1.base_url
        );
        self.publish(pending.clone());

        let settled = self.aggregator.complete(pending, endpoints).await;

        if !self.publish(settled.clone()) {
            debug!("Discarding stale result of poll cycle {}", generation);
            if let Some(metrics) = &self.metrics {
                metrics.record_stale_cycle();
            }
        }

        settled
    }

    /// Replaces the published state unless it belongs to a newer cycle.
    fn publish(&self, state: DashboardViewState) -> bool {
        self.state_tx.send_if_modified(|current| {
            if state.generation >= current.generation {
                *current = state;
                true
            } else {
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointsConfig;
    use crate::dashboard::model::{ServiceResult, ServiceState};
    use crate::probe::{ProbeError, ServiceClient};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Semaphore;
    use tokio::time::Duration;

    /// First call per endpoint is slow, later calls are fast.
    struct SlowThenFast {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ServiceClient for SlowThenFast {
        async fn fetch(&self, _endpoint: &ServiceEndpoint) -> Result<Value, ProbeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < 2 {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok(json!({"cycle": "old"}))
            } else {
                Ok(json!({"cycle": "new"}))
            }
        }
    }

    struct Refusing;

    /// Holds every request until the test releases the gate, then refuses.
    struct Gated {
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl ServiceClient for Gated {
        async fn fetch(&self, _endpoint: &ServiceEndpoint) -> Result<Value, ProbeError> {
            let _permit = self.gate.acquire().await.unwrap();
            Err(ProbeError::Status(502))
        }
    }

    struct Recording {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ServiceClient for Recording {
        async fn fetch(&self, endpoint: &ServiceEndpoint) -> Result<Value, ProbeError> {
            self.seen.lock().unwrap().push(endpoint.base_url.clone());
            Ok(json!({}))
        }
    }

    #[async_trait]
    impl ServiceClient for Refusing {
        async fn fetch(&self, _endpoint: &ServiceEndpoint) -> Result<Value, ProbeError> {
            Err(ProbeError::Status(502))
        }
    }

    fn dashboard(client: Arc<dyn ServiceClient>) -> Dashboard {
        Dashboard::new(
            EndpointResolver::new(EndpointsConfig::default()),
            Aggregator::new(client, Duration::from_secs(2)),
        )
    }

    #[tokio::test]
    async fn test_initial_state_is_pending() {
        let dashboard = dashboard(Arc::new(Refusing));
        let state = dashboard.current();
        assert_eq!(state.generation, 0);
        assert!(state.is_loading);
    }

    #[tokio::test]
    async fn test_refresh_publishes_pending_then_terminal() {
        let gate = Arc::new(Semaphore::new(0));
        let dashboard = Arc::new(dashboard(Arc::new(Gated { gate: gate.clone() })));
        let mut rx = dashboard.subscribe();

        let cycle = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.refresh().await })
        };

        rx.changed().await.unwrap();
        let pending = rx.borrow_and_update().clone();
        assert_eq!(pending, DashboardViewState::pending(1));
        assert!(pending.service_a.is_pending() && pending.service_b.is_pending());
        assert!(pending.is_loading);

        gate.add_permits(2);
        rx.changed().await.unwrap();
        let terminal = rx.borrow_and_update().clone();

        assert_eq!(terminal.generation, 1);
        assert!(terminal.is_terminal());
        assert_eq!(
            terminal.service_a,
            ServiceState::Settled(ServiceResult::unavailable("Service A"))
        );
        assert_eq!(
            terminal.service_b,
            ServiceState::Settled(ServiceResult::unavailable("Service B"))
        );
        assert_eq!(cycle.await.unwrap(), terminal);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(dashboard.current(), terminal);
    }

    #[tokio::test]
    async fn test_endpoints_fixed_at_construction() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dashboard = Dashboard::new(
            EndpointResolver::new(EndpointsConfig {
                service_a_url: Some("not a url".to_string()),
                service_b_url: Some("http://green.internal:8000/".to_string()),
                ..Default::default()
            }),
            Aggregator::new(Arc::new(Recording { seen: seen.clone() }), Duration::from_secs(2)),
        );

        assert_eq!(dashboard.endpoints().0.base_url, "http://localhost:18080");
        assert_eq!(dashboard.endpoints().1.base_url, "http://green.internal:8000");

        dashboard.refresh().await;
        dashboard.refresh().await;

        let mut urls = seen.lock().unwrap().clone();
        urls.sort();
        assert_eq!(
            urls,
            vec![
                "http://green.internal:8000".to_string(),
                "http://green.internal:8000".to_string(),
                "http://localhost:18080".to_string(),
                "http://localhost:18080".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_stale_cycle_does_not_overwrite_newer() {
        let dashboard = Arc::new(dashboard(Arc::new(SlowThenFast {
            calls: AtomicUsize::new(0),
        })));

        let slow = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let fresh = dashboard.refresh().await;
        let stale = slow.await.unwrap();

        assert_eq!(stale.generation, 1);
        assert_eq!(fresh.generation, 2);
        assert_eq!(dashboard.current(), fresh);
        assert_eq!(
            dashboard.current().service_a,
            ServiceState::Settled(ServiceResult::Success {
                payload: json!({"cycle": "new"})
            })
        );
    }
}

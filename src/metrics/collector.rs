// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Instant;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Prometheus text exposition of everything registered.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Poll cycle metrics
    pub poll_cycles_total: IntCounter,
    pub poll_duration_seconds: Histogram,
    pub stale_cycles_total: IntCounter,

    // Per-service metrics
    pub service_requests_total: IntCounterVec,
    pub service_request_duration_seconds: HistogramVec,
    pub service_up: IntGaugeVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let poll_cycles_total =
            IntCounter::new("dashboard_poll_cycles_total", "Completed poll cycles")?;
        registry.register(Box::new(poll_cycles_total.clone()))?;

        let poll_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "dashboard_poll_duration_seconds",
            "Time from cycle start until both services settled",
        ))?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;

        let stale_cycles_total = IntCounter::new(
            "dashboard_stale_cycles_total",
            "Terminal view-states discarded because a newer cycle had started",
        )?;
        registry.register(Box::new(stale_cycles_total.clone()))?;

        let service_requests_total = IntCounterVec::new(
            Opts::new("dashboard_service_requests_total", "Requests per service"),
            &["service", "outcome"],
        )?;
        registry.register(Box::new(service_requests_total.clone()))?;

        let service_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dashboard_service_request_duration_seconds",
                "Per-service request duration",
            ),
            &["service"],
        )?;
        registry.register(Box::new(service_request_duration_seconds.clone()))?;

        let service_up = IntGaugeVec::new(
            Opts::new(
                "dashboard_service_up",
                "Last poll outcome per service (1=success, 0=unavailable)",
            ),
            &["service"],
        )?;
        registry.register(Box::new(service_up.clone()))?;

        Ok(Self {
            poll_cycles_total,
            poll_duration_seconds,
            stale_cycles_total,
            service_requests_total,
            service_request_duration_seconds,
            service_up,
        })
    }

    pub fn record_service_request(
        &self,
        service: &str,
        success: bool,
        duration: std::time::Duration,
    ) {
        let outcome = if success { "success" } else { "unavailable" };
        self.service_requests_total
            .with_label_values(&[service, outcome])
            .inc();

        self.service_request_duration_seconds
            .with_label_values(&[service])
            .observe(duration.as_secs_f64());

        self.service_up
            .with_label_values(&[service])
            .set(if success { 1 } else { 0 });
    }

    pub fn record_poll_cycle(&self, duration: std::time::Duration) {
        self.poll_cycles_total.inc();
        self.poll_duration_seconds.observe(duration.as_secs_f64());
    }

    pub fn record_stale_cycle(&self) {
        self.stale_cycles_total.inc();
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

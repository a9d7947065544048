// src/server/handler.rs
use crate::config::{DisplayConfig, MetricsConfig};
use crate::dashboard::Dashboard;
use crate::metrics::MetricsRegistry;
use crate::render::{render_text, DisplayFrame};
use hyper::{header, Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;

/// Routes dashboard requests. Never fails at the service level; errors are
/// turned into HTTP status codes.
#[derive(Clone)]
pub struct RequestHandler {
    dashboard: Arc<Dashboard>,
    display: Arc<DisplayConfig>,
    metrics: Option<(Arc<MetricsRegistry>, String)>,
}

impl RequestHandler {
    pub fn new(dashboard: Arc<Dashboard>, display: DisplayConfig) -> Self {
        Self {
            dashboard,
            display: Arc::new(display),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, registry: Arc<MetricsRegistry>, config: &MetricsConfig) -> Self {
        if config.enabled {
            self.metrics = Some((registry, config.path.clone()));
        }
        self
    }

    fn frame(&self) -> DisplayFrame {
        DisplayFrame::new(
            &self.dashboard.current(),
            self.dashboard.endpoints(),
            &self.display,
            chrono::Local::now(),
        )
    }

    pub async fn route(&self, req: Request<Body>) -> Response<Body> {
        let path = req.uri().path();

        if let Some((registry, metrics_path)) = &self.metrics {
            if req.method() == Method::GET && path == metrics_path.as_str() {
                return match registry.gather() {
                    Ok(body) => respond(StatusCode::OK, "text/plain; version=0.0.4", body),
                    Err(e) => {
                        tracing::error!(%e, "failed to encode metrics");
                        status_only(StatusCode::INTERNAL_SERVER_ERROR)
                    }
                };
            }
        }

        match (req.method(), path) {
            (&Method::GET, "/") => respond(
                StatusCode::OK,
                "text/plain; charset=utf-8",
                render_text(&self.frame()),
            ),
            (&Method::GET, "/api/state") => match serde_json::to_vec(&self.frame()) {
                Ok(body) => respond(StatusCode::OK, "application/json", body),
                Err(e) => {
                    tracing::error!(%e, "failed to serialize view-state");
                    status_only(StatusCode::INTERNAL_SERVER_ERROR)
                }
            },
            (&Method::POST, "/api/refresh") => {
                // Cycles are not queued; each trigger starts its own.
                let dashboard = self.dashboard.clone();
                tokio::spawn(async move {
                    dashboard.refresh().await;
                });
                status_only(StatusCode::ACCEPTED)
            }
            _ => status_only(StatusCode::NOT_FOUND),
        }
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    response
}

fn status_only(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::from(
        status.canonical_reason().unwrap_or_default().to_string(),
    ));
    *response.status_mut() = status;
    response
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move {
            tracing::debug!(method = %req.method(), path = %req.uri().path(), "request");
            Ok(handler.route(req).await)
        })
    }
}

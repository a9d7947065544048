// src/render/mod.rs
//
// Display layer. Everything here is presentation: the wall-clock time and
// environment label are passed through and never validated.
use crate::config::DisplayConfig;
use crate::dashboard::{DashboardViewState, ServiceSide, ServiceState};
use crate::endpoint::ServiceEndpoint;
use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ServicePanel {
    pub label: String,
    pub base_url: String,
    #[serde(flatten)]
    pub state: PanelState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum PanelState {
    Loading,
    Ready { body: serde_json::Value },
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayFrame {
    pub title: String,
    pub subtitle: String,
    pub environment: String,
    pub rendered_at: DateTime<Local>,
    pub is_loading: bool,
    pub generation: u64,
    pub services: [ServicePanel; 2],
}

impl DisplayFrame {
    pub fn new(
        view: &DashboardViewState,
        endpoints: &(ServiceEndpoint, ServiceEndpoint),
        display: &DisplayConfig,
        rendered_at: DateTime<Local>,
    ) -> Self {
        // The joint loading flag gates both panels together.
        let panel = |endpoint: &ServiceEndpoint, side: ServiceSide| ServicePanel {
            label: endpoint.label.clone(),
            base_url: endpoint.base_url.clone(),
            state: match (view.is_loading, view.side(side)) {
                (false, ServiceState::Settled(result)) => PanelState::Ready {
                    body: result.display_payload(),
                },
                _ => PanelState::Loading,
            },
        };

        Self {
            title: display.title.clone(),
            subtitle: display.subtitle.clone(),
            environment: display.environment.clone(),
            rendered_at,
            is_loading: view.is_loading,
            generation: view.generation,
            services: [
                panel(&endpoints.0, ServiceSide::A),
                panel(&endpoints.1, ServiceSide::B),
            ],
        }
    }
}

/// Plain-text page: header, one section per service, footer.
pub fn render_text(frame: &DisplayFrame) -> String {
    let rule = "=".repeat(frame.title.chars().count().max(40));
    let mut out = format!("{rule}\n{}\n{}\n{rule}\n", frame.title, frame.subtitle);

    for panel in &frame.services {
        out.push_str(&format!("\n## {} ({})\n", panel.label, panel.base_url));
        match &panel.state {
            PanelState::Loading => out.push_str("Loading...\n"),
            PanelState::Ready { body } => {
                let pretty =
                    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
                out.push_str(&pretty);
                out.push('\n');
            }
        }
    }

    out.push_str(&format!(
        "\nEnvironment: {}\nRendered at: {}\n",
        frame.environment,
        frame.rendered_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ServiceResult;
    use chrono::TimeZone;
    use serde_json::json;

    fn endpoints() -> (ServiceEndpoint, ServiceEndpoint) {
        (
            ServiceEndpoint::new("Spring Boot API", "http://localhost:18080"),
            ServiceEndpoint::new("FastAPI Service", "http://localhost:18000"),
        )
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_pending_renders_loading_for_both() {
        let frame = DisplayFrame::new(
            &DashboardViewState::pending(1),
            &endpoints(),
            &DisplayConfig::default(),
            at(),
        );
        let text = render_text(&frame);

        assert_eq!(text.matches("Loading...").count(), 2);
        assert!(text.contains("Environment: development"));
        assert!(text.contains("Rendered at: 2026-10-15 09:30:00"));
    }

    #[test]
    fn test_one_side_settled_still_loading() {
        let view = DashboardViewState::pending(1).settle(
            ServiceSide::A,
            ServiceResult::Success {
                payload: json!({"message": "hello"}),
            },
        );
        let frame = DisplayFrame::new(&view, &endpoints(), &DisplayConfig::default(), at());

        assert!(frame
            .services
            .iter()
            .all(|p| p.state == PanelState::Loading));
    }

    #[test]
    fn test_settled_renders_payload_and_error() {
        let view = DashboardViewState::pending(2)
            .settle(
                ServiceSide::A,
                ServiceResult::Success {
                    payload: json!({"message": "Hello from Spring Boot!"}),
                },
            )
            .settle(ServiceSide::B, ServiceResult::unavailable("FastAPI Service"));
        let frame = DisplayFrame::new(&view, &endpoints(), &DisplayConfig::default(), at());
        let text = render_text(&frame);

        assert!(!text.contains("Loading..."));
        assert!(text.contains(r#""message": "Hello from Spring Boot!""#));
        assert!(text.contains(r#""error": "FastAPI Service unavailable""#));
        assert!(text.contains("## FastAPI Service (http://localhost:18000)"));
    }

    #[test]
    fn test_page_layout() {
        let frame = DisplayFrame::new(
            &DashboardViewState::pending(1),
            &endpoints(),
            &DisplayConfig::default(),
            at(),
        );
        let text = render_text(&frame);
        let rule = "=".repeat(40);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            &lines[..4],
            &[
                rule.as_str(),
                "DevOps Pipeline Dashboard",
                "Blue-Green Deployment Status",
                rule.as_str()
            ]
        );
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "## Spring Boot API (http://localhost:18080)");
        assert_eq!(lines[6], "Loading...");
        assert_eq!(lines.last(), Some(&"Rendered at: 2026-10-15 09:30:00"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_frame_json_shape() {
        let frame = DisplayFrame::new(
            &DashboardViewState::pending(4),
            &endpoints(),
            &DisplayConfig::default(),
            at(),
        );
        let value = serde_json::to_value(&frame).unwrap();

        assert_eq!(value["is_loading"], json!(true));
        assert_eq!(value["services"][0]["panel"], json!("loading"));
        assert_eq!(value["services"][1]["label"], json!("FastAPI Service"));
    }
}

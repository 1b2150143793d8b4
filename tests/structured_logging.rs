//! Integration tests for structured logging
//!
//! Transitions and alerts must come out as structured fields that a JSON
//! log pipeline can index on.

mod common;

use chrono::Utc;
use common::{make_runtime, two_node_settings};
use guardian::config::{LogFormat, LoggingConfig};
use guardian::logging::build_filter_directives;
use guardian::probe::ProbeResult;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Default)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl CaptureWriter {
    fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }
}

fn capture<F: FnOnce()>(filter: &str, f: F) -> Vec<serde_json::Value> {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    writer.lines()
}

#[test]
fn test_state_change_logged_with_fields() {
    let rt = make_runtime(&["a", "b"], &two_node_settings());

    let lines = capture("info", || {
        rt.apply_probe("a", &ProbeResult::soft_failure(1), Utc::now());
    });

    let change = lines
        .iter()
        .find(|l| l["fields"]["message"] == "Node state changed")
        .expect("no state change logged");
    assert_eq!(change["level"], "INFO");
    assert_eq!(change["fields"]["node"], "a");
    assert_eq!(change["fields"]["old_state"], "healthy");
    assert_eq!(change["fields"]["new_state"], "unhealthy");
    assert_eq!(change["fields"]["failure_count"], 1);
}

#[test]
fn test_alert_logged_at_warn() {
    let rt = make_runtime(&["a", "b"], &two_node_settings());

    let lines = capture("warn", || {
        let now = Utc::now();
        rt.apply_probe("a", &ProbeResult::hard_failure(1), now);
        rt.apply_probe("b", &ProbeResult::hard_failure(1), now);
    });

    assert_eq!(lines.len(), 1, "only the alert passes a warn filter");
    assert_eq!(lines[0]["level"], "WARN");
    assert_eq!(lines[0]["fields"]["kind"], "crash_denied");
    assert_eq!(lines[0]["fields"]["node"], "b");
}

#[test]
fn test_component_override_enables_debug_for_fleet_only() {
    let config = LoggingConfig {
        level: "warn".to_string(),
        format: LogFormat::Json,
        component_levels: Some(
            [("fleet".to_string(), "debug".to_string())]
                .into_iter()
                .collect(),
        ),
    };
    let directives = build_filter_directives(&config);
    assert_eq!(directives, "warn,guardian::fleet=debug");

    let rt = make_runtime(&["a"], &two_node_settings());
    let lines = capture(&directives, || {
        rt.apply_probe("a", &ProbeResult::healthy(1), Utc::now());
    });

    assert!(lines
        .iter()
        .any(|l| l["fields"]["message"] == "Node probed" && l["level"] == "DEBUG"));
}

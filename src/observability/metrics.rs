//! # Metrics Collection
//!
//! Prometheus metrics for the listener service. Recording goes through the
//! `metrics` facade, so it is a no-op until [`init_metrics`] installs the
//! exporter.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::ObservabilityConfig;
use crate::errors::{ListenerError, Result};

/// Handle for recording application metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Record a finished HTTP request
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration: f64) {
        counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(duration);
    }

    pub fn record_order_enqueued(&self) {
        counter!("listener_orders_enqueued_total").increment(1);
    }

    pub fn record_order_deleted(&self) {
        counter!("listener_orders_deleted_total").increment(1);
    }

    /// Record an assembled RDF export; empty exports are counted separately
    pub fn record_rdf_export(&self, kind: &str, file_count: usize, bytes: usize) {
        let outcome = if file_count == 0 { "empty" } else { "content" };
        counter!("listener_rdf_exports_total", "kind" => kind.to_string(), "outcome" => outcome)
            .increment(1);
        histogram!("listener_rdf_export_files", "kind" => kind.to_string())
            .record(file_count as f64);
        histogram!("listener_rdf_export_bytes", "kind" => kind.to_string()).record(bytes as f64);
    }

    fn describe(&self) {
        describe_counter!("http_requests_total", "Total HTTP requests by method, path and status");
        describe_histogram!(
            "http_request_duration_seconds",
            Unit::Seconds,
            "HTTP request latency by method and path"
        );
        describe_counter!("listener_orders_enqueued_total", "Repositories queued for processing");
        describe_counter!("listener_orders_deleted_total", "Orders removed with all their data");
        describe_counter!("listener_rdf_exports_total", "RDF downloads assembled by kind");
        describe_histogram!(
            "listener_rdf_export_files",
            Unit::Count,
            "Files bundled per RDF export"
        );
        describe_histogram!(
            "listener_rdf_export_bytes",
            Unit::Bytes,
            "Size of assembled RDF exports"
        );
    }
}

/// Initialize metrics collection and the Prometheus exporter
pub async fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => {
            warn!("Metrics disabled: no bind address configured");
            return Ok(());
        }
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        ListenerError::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| {
            ListenerError::config(format!("Failed to initialize metrics exporter: {}", e))
        })?;

    MetricsRecorder::new().describe();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );

    Ok(())
}

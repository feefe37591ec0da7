//! Prometheus 指标
//!
//! 指标通过独立端口的 `/metrics` 暴露。记录函数在未安装 recorder 时为空操作，
//! 测试中可直接调用。

use std::net::SocketAddr;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 指标服务器任务句柄
pub struct MetricsHandle {
    _server: tokio::task::JoinHandle<()>,
}

pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .install_recorder()?;

    describe_metrics();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server = serve_metrics(addr, handle).await?;

    Ok(MetricsHandle { _server: server })
}

fn describe_metrics() {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    metrics::describe_counter!(
        "cascade_updates_total",
        "Progress writes applied through the cascade"
    );
    metrics::describe_counter!(
        "cascade_changes_total",
        "State transitions recorded by the cascade"
    );
    metrics::describe_histogram!(
        "cascade_duration_seconds",
        "Cascade write duration in seconds"
    );
    metrics::describe_counter!(
        "availability_resolutions_total",
        "Availability resolutions by cache outcome"
    );
    metrics::describe_histogram!(
        "availability_resolution_duration_seconds",
        "Availability resolution duration in seconds"
    );
}

async fn serve_metrics(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    }))
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(duration_secs);
}

/// 记录一次级联写入，`kind` 为 single / batch / hideout
pub fn record_cascade_update(kind: &str, changes: usize, duration_secs: f64) {
    let kind = kind.to_string();
    metrics::counter!("cascade_updates_total", "kind" => kind.clone()).increment(1);
    metrics::counter!("cascade_changes_total", "kind" => kind.clone()).increment(changes as u64);
    metrics::histogram!("cascade_duration_seconds", "kind" => kind).record(duration_secs);
}

pub fn record_availability_resolution(actors: usize, cache_hit: bool, duration_secs: f64) {
    let cache = if cache_hit { "hit" } else { "miss" };
    metrics::counter!("availability_resolutions_total", "cache" => cache).increment(1);
    metrics::histogram!(
        "availability_resolution_duration_seconds",
        "actors" => actors.to_string()
    )
    .record(duration_secs);
}

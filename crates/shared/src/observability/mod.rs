//! 可观测性
//!
//! 日志与 Prometheus 指标的统一初始化入口。

pub mod metrics;
pub mod middleware;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 日志与指标中的服务名
    pub service_name: String,
    /// Prometheus 抓取端口
    pub metrics_port: u16,
    pub metrics_enabled: bool,
    /// 未设置 RUST_LOG 时使用的过滤表达式
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            metrics_port: 9090,
            metrics_enabled: true,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }
}

/// 持有指标服务器任务，drop 时记录关闭日志
pub struct ObservabilityGuard {
    _metrics: Option<metrics::MetricsHandle>,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!("Shutting down observability...");
    }
}

/// 先初始化日志，再按配置启动指标导出
pub async fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    let metrics = if config.metrics_enabled {
        Some(metrics::init(config).await?)
    } else {
        None
    };

    info!(
        service = %config.service_name,
        metrics_port = config.metrics_port,
        metrics_enabled = config.metrics_enabled,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(ObservabilityGuard { _metrics: metrics })
}

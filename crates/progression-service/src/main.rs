//! 任务进度服务

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use progress_shared::{
    config::AppConfig,
    database::Database,
    observability::{self, middleware as obs_middleware},
};
use progression::{
    api::{self, AppState},
    metadata::{GraphCache, JsonFileMetadataSource},
    repository::ProgressRepository,
    service::ProgressService,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("progression-service").unwrap_or_default();

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting progression-service on {}", config.server_addr());

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let repo = Arc::new(ProgressRepository::new(db.pool().clone()));
    let source = Arc::new(JsonFileMetadataSource::new(
        &config.progression.metadata_path,
    ));
    let graphs = Arc::new(GraphCache::new(
        source,
        Duration::from_secs(config.progression.graph_cache_seconds),
    ));

    // 预热失败不阻止启动，首次请求时会再次加载
    if let Err(e) = graphs.refresh().await {
        warn!(
            error = %e,
            path = %config.progression.metadata_path,
            "进度图预热失败"
        );
    }

    let service = Arc::new(ProgressService::new(
        repo,
        graphs,
        config.progression.update_source.clone(),
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(AppState::new(service))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号（SIGTERM 或 Ctrl+C）
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

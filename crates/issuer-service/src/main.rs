//! 徽章颁发服务
//!
//! 提供颁发者、徽章类、断言的管理 API，以及公开的 Open Badges 文档。

use std::{sync::Arc, time::Duration};

use axum::{Json, Router, http::HeaderValue, middleware, routing::get};
use badge_issuer::{
    notification::{TemplateEngine, build_transport},
    routes,
    state::AppState,
};
use badge_shared::{
    cache::Cache,
    config::AppConfig,
    database::Database,
    observability::{self, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("badge-issuer-service").unwrap_or_default();

    let obs_config = config.observability.clone().with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting badge-issuer-service on {}", config.server_addr());
    info!(http_origin = %config.site.http_origin, "站点源");

    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.run_migrations().await?;
    }

    // 缓存可关闭，关闭后按 slug 查询直接读库
    let cache = if config.redis.enabled {
        Some(Arc::new(Cache::new(&config.redis)?))
    } else {
        info!("Redis cache disabled");
        None
    };

    let transport = build_transport(&config.mail)?;
    info!(backend = %config.mail.backend, "Mail transport initialized");

    let templates = match &config.mail.templates_dir {
        Some(dir) => TemplateEngine::from_dir(dir)?,
        None => TemplateEngine::with_defaults(),
    };

    let state = AppState::new(
        db.pool().clone(),
        cache.clone(),
        &config,
        transport,
        templates,
    );

    let allowed_origins =
        std::env::var("BADGE_CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("BADGE_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let ready = Router::new().route(
        "/ready",
        get(move || readiness_check(db.clone(), cache.clone())),
    );

    let app = routes::app(state)
        .merge(ready)
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 就绪探针：数据库必须可用，缓存启用时一并检查
async fn readiness_check(db: Database, cache: Option<Arc<Cache>>) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();
    let cache_status = match &cache {
        Some(cache) if cache.health_check().await.is_ok() => "ok",
        Some(_) => "fail",
        None => "disabled",
    };
    let all_ok = db_ok && cache_status != "fail";

    Json(serde_json::json!({
        "status": if all_ok { "ok" } else { "degraded" },
        "service": "badge-issuer-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" },
            "redis": cache_status
        }
    }))
}

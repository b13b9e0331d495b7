//! 路由配置模块
//!
//! 公开文档挂在 `/public`，管理接口挂在 `/api`

use axum::{
    Json, Router,
    routing::{delete, get, post},
};

use crate::{handlers, state::AppState};

/// 公开的 Open Badges 文档路由
///
/// 路径与 `BadgeObject::absolute_url` 一致，即 `@id` 指向的地址
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/issuers/{slug}",
            get(handlers::public::issuer_document),
        )
        .route(
            "/badges/{slug}",
            get(handlers::public::badge_class_document),
        )
        .route(
            "/assertions/{slug}",
            get(handlers::public::assertion_document),
        )
}

/// 颁发者、徽章类、断言管理路由
fn issuer_routes() -> Router<AppState> {
    Router::new()
        // 颁发者
        .route("/issuers", post(handlers::issuer::create_issuer))
        .route(
            "/issuers/{slug}",
            get(handlers::issuer::get_issuer)
                .put(handlers::issuer::update_issuer)
                .delete(handlers::issuer::delete_issuer),
        )
        .route(
            "/issuers/{slug}/members/{role}",
            get(handlers::issuer::list_members).post(handlers::issuer::add_member),
        )
        .route(
            "/issuers/{slug}/members/{role}/{member_id}",
            delete(handlers::issuer::remove_member),
        )
        // 徽章类
        .route(
            "/issuers/{slug}/badges",
            get(handlers::badge_class::list_badge_classes)
                .post(handlers::badge_class::create_badge_class),
        )
        .route(
            "/badges/{slug}",
            get(handlers::badge_class::get_badge_class)
                .put(handlers::badge_class::update_badge_class)
                .delete(handlers::badge_class::delete_badge_class),
        )
        // 断言
        .route(
            "/badges/{slug}/assertions",
            get(handlers::assertion::list_assertions).post(handlers::assertion::issue_assertion),
        )
        .route(
            "/assertions/{slug}",
            get(handlers::assertion::get_assertion).delete(handlers::assertion::delete_assertion),
        )
}

/// Open Badge 导入与获得者通知路由
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/open-badges", post(handlers::open_badge::import_open_badge))
        .route("/open-badges/{id}", get(handlers::open_badge::get_open_badge))
        .route(
            "/notifications",
            post(handlers::notification::create_notification),
        )
        .route(
            "/notifications/{id}/send",
            post(handlers::notification::resend_notification),
        )
}

/// 所有管理 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(issuer_routes())
        .merge(notification_routes())
}

/// 组装完整应用（不含中间件层和就绪探针）
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/public", public_routes())
        .nest("/api", api_routes())
        .route("/health", get(health_check))
        .with_state(state)
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "badge-issuer-service"
    }))
}

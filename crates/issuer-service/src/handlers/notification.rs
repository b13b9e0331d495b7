//! 获得者通知 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{ApiResponse, CreateNotificationRequest},
    error::IssuerError,
    models::EarnerNotification,
    state::AppState,
};

/// 提交获得者通知
///
/// POST /api/notifications
///
/// 同一断言 URL 已通知过时返回 409
pub async fn create_notification(
    State(state): State<AppState>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<Json<ApiResponse<EarnerNotification>>, IssuerError> {
    req.validate()?;

    let notification = state.notification_service.notify_earner(req).await?;
    info!(notification_id = notification.id, "Earner notified");
    Ok(Json(ApiResponse::success(notification)))
}

/// 重新发送通知邮件
///
/// POST /api/notifications/{id}/send
pub async fn resend_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EarnerNotification>>, IssuerError> {
    let notification = state.notification_service.resend(id).await?;
    Ok(Json(ApiResponse::success(notification)))
}

//! Open Badge 导入 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::{
    dto::{ApiResponse, ImportOpenBadgeRequest},
    error::IssuerError,
    models::OpenBadge,
    state::AppState,
};

/// 导入 Open Badge
///
/// POST /api/open-badges
pub async fn import_open_badge(
    State(state): State<AppState>,
    Json(req): Json<ImportOpenBadgeRequest>,
) -> Result<Json<ApiResponse<OpenBadge>>, IssuerError> {
    req.validate()?;

    let open_badge = state.open_badge_service.import(req).await?;
    Ok(Json(ApiResponse::success(open_badge)))
}

/// 获取 Open Badge
///
/// GET /api/open-badges/{id}
pub async fn get_open_badge(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OpenBadge>>, IssuerError> {
    let open_badge = state.open_badge_service.get(id).await?;
    Ok(Json(ApiResponse::success(open_badge)))
}

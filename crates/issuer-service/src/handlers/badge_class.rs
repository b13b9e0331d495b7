//! 徽章类管理 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::{
    dto::{
        ActingUserQuery, ApiResponse, BadgeClassDto, CreateBadgeClassRequest,
        UpdateBadgeClassRequest,
    },
    error::IssuerError,
    models::IssuerBadgeClass,
    state::AppState,
};

async fn to_dto(state: &AppState, badge_class: IssuerBadgeClass) -> Result<BadgeClassDto, IssuerError> {
    let owner_id = state.badge_class_service.owner_of(&badge_class).await?;
    Ok(BadgeClassDto::from_badge_class(
        badge_class,
        owner_id,
        &state.site.http_origin,
    ))
}

/// 在颁发者下创建徽章类
///
/// POST /api/issuers/{slug}/badges
pub async fn create_badge_class(
    State(state): State<AppState>,
    Path(issuer_slug): Path<String>,
    Json(req): Json<CreateBadgeClassRequest>,
) -> Result<Json<ApiResponse<BadgeClassDto>>, IssuerError> {
    req.validate()?;

    let badge_class = state
        .badge_class_service
        .create_badge_class(&issuer_slug, req)
        .await?;
    Ok(Json(ApiResponse::success(to_dto(&state, badge_class).await?)))
}

/// 列出颁发者的徽章类
///
/// GET /api/issuers/{slug}/badges
pub async fn list_badge_classes(
    State(state): State<AppState>,
    Path(issuer_slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<BadgeClassDto>>>, IssuerError> {
    let issuer = state.issuer_service.require_issuer(&issuer_slug).await?;
    let badge_classes = state
        .badge_class_service
        .list_for_issuer(&issuer_slug)
        .await?;

    let items = badge_classes
        .into_iter()
        .map(|bc| BadgeClassDto::from_badge_class(bc, issuer.owner_id, &state.site.http_origin))
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

/// 获取徽章类
///
/// GET /api/badges/{slug}
pub async fn get_badge_class(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<BadgeClassDto>>, IssuerError> {
    let badge_class = state.badge_class_service.require_badge_class(&slug).await?;
    Ok(Json(ApiResponse::success(to_dto(&state, badge_class).await?)))
}

/// 更新徽章类
///
/// PUT /api/badges/{slug}
pub async fn update_badge_class(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateBadgeClassRequest>,
) -> Result<Json<ApiResponse<BadgeClassDto>>, IssuerError> {
    req.validate()?;

    let badge_class = state
        .badge_class_service
        .update_badge_class(&slug, req)
        .await?;
    Ok(Json(ApiResponse::success(to_dto(&state, badge_class).await?)))
}

/// 删除徽章类
///
/// DELETE /api/badges/{slug}?userId=
pub async fn delete_badge_class(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ActingUserQuery>,
) -> Result<Json<ApiResponse<()>>, IssuerError> {
    state
        .badge_class_service
        .delete_badge_class(&slug, query.user_id)
        .await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}

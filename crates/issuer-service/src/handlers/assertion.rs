//! 徽章断言 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    dto::{ActingUserQuery, ApiResponse, AssertionDto, IssueAssertionRequest},
    error::IssuerError,
    models::IssuerAssertion,
    state::AppState,
};

async fn to_dto(state: &AppState, assertion: IssuerAssertion) -> Result<AssertionDto, IssuerError> {
    let owner_id = state.assertion_service.owner_of(&assertion).await?;
    Ok(AssertionDto::from_assertion(
        assertion,
        owner_id,
        &state.site.http_origin,
    ))
}

/// 颁发断言
///
/// POST /api/badges/{slug}/assertions
pub async fn issue_assertion(
    State(state): State<AppState>,
    Path(badge_class_slug): Path<String>,
    Json(req): Json<IssueAssertionRequest>,
) -> Result<Json<ApiResponse<AssertionDto>>, IssuerError> {
    let assertion = state
        .assertion_service
        .issue_assertion(&badge_class_slug, req)
        .await?;
    Ok(Json(ApiResponse::success(to_dto(&state, assertion).await?)))
}

/// 列出徽章类下的断言
///
/// GET /api/badges/{slug}/assertions
pub async fn list_assertions(
    State(state): State<AppState>,
    Path(badge_class_slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<AssertionDto>>>, IssuerError> {
    let assertions = state
        .assertion_service
        .list_for_badge_class(&badge_class_slug)
        .await?;

    let mut items = Vec::with_capacity(assertions.len());
    for assertion in assertions {
        items.push(to_dto(&state, assertion).await?);
    }
    Ok(Json(ApiResponse::success(items)))
}

/// 获取断言
///
/// GET /api/assertions/{slug}
pub async fn get_assertion(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<AssertionDto>>, IssuerError> {
    let assertion = state.assertion_service.require_assertion(&slug).await?;
    Ok(Json(ApiResponse::success(to_dto(&state, assertion).await?)))
}

/// 撤销断言
///
/// DELETE /api/assertions/{slug}?userId=
pub async fn delete_assertion(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ActingUserQuery>,
) -> Result<Json<ApiResponse<()>>, IssuerError> {
    state
        .assertion_service
        .delete_assertion(&slug, query.user_id)
        .await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}

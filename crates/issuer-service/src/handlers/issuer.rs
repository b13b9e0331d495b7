//! 颁发者管理 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::{
    dto::{
        ActingUserQuery, AddMemberRequest, ApiResponse, CreateIssuerRequest, IssuerDto,
        MembersDto, UpdateIssuerRequest,
    },
    error::IssuerError,
    models::IssuerRole,
    state::AppState,
};

/// 路径中的成员角色：`editors` 或 `staff`
pub(crate) fn parse_role(segment: &str) -> Result<IssuerRole, IssuerError> {
    match segment {
        "editors" => Ok(IssuerRole::Editor),
        "staff" => Ok(IssuerRole::Staff),
        other => Err(IssuerError::Validation(format!("未知成员角色: {}", other))),
    }
}

/// 创建颁发者
///
/// POST /api/issuers
pub async fn create_issuer(
    State(state): State<AppState>,
    Json(req): Json<CreateIssuerRequest>,
) -> Result<Json<ApiResponse<IssuerDto>>, IssuerError> {
    req.validate()?;

    let issuer = state.issuer_service.create_issuer(req).await?;
    Ok(Json(ApiResponse::success(IssuerDto::from_issuer(
        issuer,
        &state.site.http_origin,
    ))))
}

/// 获取颁发者
///
/// GET /api/issuers/{slug}
pub async fn get_issuer(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<IssuerDto>>, IssuerError> {
    let issuer = state.issuer_service.require_issuer(&slug).await?;
    Ok(Json(ApiResponse::success(IssuerDto::from_issuer(
        issuer,
        &state.site.http_origin,
    ))))
}

/// 更新颁发者
///
/// PUT /api/issuers/{slug}
pub async fn update_issuer(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateIssuerRequest>,
) -> Result<Json<ApiResponse<IssuerDto>>, IssuerError> {
    req.validate()?;

    let issuer = state.issuer_service.update_issuer(&slug, req).await?;
    Ok(Json(ApiResponse::success(IssuerDto::from_issuer(
        issuer,
        &state.site.http_origin,
    ))))
}

/// 删除颁发者
///
/// DELETE /api/issuers/{slug}?userId=
pub async fn delete_issuer(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ActingUserQuery>,
) -> Result<Json<ApiResponse<()>>, IssuerError> {
    state.issuer_service.delete_issuer(&slug, query.user_id).await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 列出成员
///
/// GET /api/issuers/{slug}/members/{role}
pub async fn list_members(
    State(state): State<AppState>,
    Path((slug, role)): Path<(String, String)>,
) -> Result<Json<ApiResponse<MembersDto>>, IssuerError> {
    let role = parse_role(&role)?;
    let user_ids = state.issuer_service.list_members(&slug, role).await?;
    Ok(Json(ApiResponse::success(MembersDto { role, user_ids })))
}

/// 添加成员
///
/// POST /api/issuers/{slug}/members/{role}
pub async fn add_member(
    State(state): State<AppState>,
    Path((slug, role)): Path<(String, String)>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<ApiResponse<MembersDto>>, IssuerError> {
    let role = parse_role(&role)?;
    let user_ids = state
        .issuer_service
        .add_member(&slug, role, req.user_id, req.member_id)
        .await?;
    Ok(Json(ApiResponse::success(MembersDto { role, user_ids })))
}

/// 移除成员
///
/// DELETE /api/issuers/{slug}/members/{role}/{member_id}?userId=
pub async fn remove_member(
    State(state): State<AppState>,
    Path((slug, role, member_id)): Path<(String, String, i64)>,
    Query(query): Query<ActingUserQuery>,
) -> Result<Json<ApiResponse<MembersDto>>, IssuerError> {
    let role = parse_role(&role)?;
    let user_ids = state
        .issuer_service
        .remove_member(&slug, role, query.user_id, member_id)
        .await?;
    Ok(Json(ApiResponse::success(MembersDto { role, user_ids })))
}

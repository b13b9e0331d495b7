//! 公开文档
//!
//! 按 slug 返回存储的 `badge_object`，即 Open Badges 文档本身，不做响应包装

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

use crate::{error::IssuerError, state::AppState};

/// GET /public/issuers/{slug}
pub async fn issuer_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, IssuerError> {
    let issuer = state.issuer_service.require_issuer(&slug).await?;
    Ok(Json(issuer.badge_object))
}

/// GET /public/badges/{slug}
pub async fn badge_class_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, IssuerError> {
    let badge_class = state.badge_class_service.require_badge_class(&slug).await?;
    Ok(Json(badge_class.badge_object))
}

/// GET /public/assertions/{slug}
pub async fn assertion_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, IssuerError> {
    let assertion = state.assertion_service.require_assertion(&slug).await?;
    Ok(Json(assertion.badge_object))
}

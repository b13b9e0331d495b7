//! 响应 DTO 定义

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::{BadgeObject, Issuer, IssuerAssertion, IssuerBadgeClass, IssuerRole};

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }
}

/// 颁发者响应 DTO
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// 完整公开地址，等于 `badgeObject["@id"]`
    pub url: String,
    pub owner_id: i64,
    pub created_by: Option<i64>,
    pub image: Option<String>,
    pub badge_object: Value,
    pub created_at: DateTime<Utc>,
}

impl IssuerDto {
    pub fn from_issuer(issuer: Issuer, http_origin: &str) -> Self {
        Self {
            url: issuer.full_url(http_origin),
            id: issuer.id,
            name: issuer.name,
            slug: issuer.slug,
            owner_id: issuer.owner_id,
            created_by: issuer.created_by,
            image: issuer.image,
            badge_object: issuer.badge_object,
            created_at: issuer.created_at,
        }
    }
}

/// 徽章类响应 DTO
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeClassDto {
    pub id: i64,
    pub issuer_id: i64,
    /// 所属颁发者的所有者
    pub owner_id: i64,
    pub name: String,
    pub slug: String,
    pub url: String,
    /// `criteriaUrl` 优先，否则为 `criteriaText`
    pub criteria: Option<String>,
    pub criteria_text: Option<String>,
    pub criteria_url: Option<String>,
    pub image: Option<String>,
    pub badge_object: Value,
    pub created_at: DateTime<Utc>,
}

impl BadgeClassDto {
    pub fn from_badge_class(badge_class: IssuerBadgeClass, owner_id: i64, http_origin: &str) -> Self {
        Self {
            url: badge_class.full_url(http_origin),
            criteria: badge_class.criteria().map(str::to_string),
            id: badge_class.id,
            issuer_id: badge_class.issuer_id,
            owner_id,
            name: badge_class.name,
            slug: badge_class.slug,
            criteria_text: badge_class.criteria_text,
            criteria_url: badge_class.criteria_url,
            image: badge_class.image,
            badge_object: badge_class.badge_object,
            created_at: badge_class.created_at,
        }
    }
}

/// 徽章断言响应 DTO
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionDto {
    pub id: i64,
    pub badge_class_id: i64,
    pub issuer_id: i64,
    pub owner_id: i64,
    pub slug: String,
    pub url: String,
    pub badge_object: Value,
    pub created_at: DateTime<Utc>,
}

impl AssertionDto {
    pub fn from_assertion(assertion: IssuerAssertion, owner_id: i64, http_origin: &str) -> Self {
        Self {
            url: assertion.full_url(http_origin),
            id: assertion.id,
            badge_class_id: assertion.badge_class_id,
            issuer_id: assertion.issuer_id,
            owner_id,
            slug: assertion.slug,
            badge_object: assertion.badge_object,
            created_at: assertion.created_at,
        }
    }
}

/// 颁发者成员列表
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersDto {
    pub role: IssuerRole,
    pub user_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::badge_class::sample_badge_class;
    use crate::models::issuer::sample_issuer;

    #[test]
    fn test_issuer_dto_url() {
        let dto = IssuerDto::from_issuer(sample_issuer(1, "oregon"), "https://b.example.org");
        assert_eq!(dto.url, "https://b.example.org/public/issuers/oregon");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["ownerId"], 1);
    }

    #[test]
    fn test_badge_class_dto_criteria() {
        let mut bc = sample_badge_class(2, 1, "web-literacy");
        bc.set_criteria("https://example.org/criteria");
        let dto = BadgeClassDto::from_badge_class(bc, 7, "https://b.example.org");
        assert_eq!(dto.criteria.as_deref(), Some("https://example.org/criteria"));
        assert_eq!(dto.owner_id, 7);
        assert_eq!(dto.url, "https://b.example.org/public/badges/web-literacy");
    }

    #[test]
    fn test_api_response_envelope() {
        let json = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["code"], "SUCCESS");
        assert_eq!(json["data"], 1);
    }
}

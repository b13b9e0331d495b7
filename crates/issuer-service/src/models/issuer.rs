//! 颁发者实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BadgeObject;

/// 颁发者
///
/// 定义并颁发徽章的组织。`badge_object` 存储 Open Badges 颁发者文档，
/// 其 `@id` 必须等于颁发者的完整 URL，由服务层在保存后回填。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    /// 创建人（用户 ID）
    #[sqlx(default)]
    pub created_by: Option<i64>,
    /// Open Badges 颁发者文档
    pub badge_object: Value,
    pub name: String,
    /// 由名称生成，可编辑，全局唯一
    pub slug: String,
    /// 所有者，不可为空，删除用户前需先转移
    pub owner_id: i64,
    /// 上传图片路径（uploads/issuers 下）
    #[sqlx(default)]
    pub image: Option<String>,
}

impl Issuer {
    /// 文档中的 `@id`
    pub fn object_id(&self) -> Option<&str> {
        super::object_id(&self.badge_object)
    }

    /// 写入文档中的 `@id`
    pub fn set_object_id(&mut self, id: &str) {
        super::set_object_id(&mut self.badge_object, id);
    }
}

impl BadgeObject for Issuer {
    fn absolute_url(&self) -> String {
        format!("/public/issuers/{}", self.slug)
    }
}

/// 新建颁发者的入库数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssuer {
    pub name: String,
    pub slug: String,
    pub owner_id: i64,
    pub created_by: Option<i64>,
    pub image: Option<String>,
    pub badge_object: Value,
}

#[cfg(test)]
pub(crate) fn sample_issuer(id: i64, slug: &str) -> Issuer {
    Issuer {
        id,
        created_at: Utc::now(),
        created_by: Some(1),
        badge_object: serde_json::json!({"name": "Oregon Badge Alliance"}),
        name: "Oregon Badge Alliance".to_string(),
        slug: slug.to_string(),
        owner_id: 1,
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let issuer = sample_issuer(1, "oregon-badge-alliance");
        assert_eq!(issuer.absolute_url(), "/public/issuers/oregon-badge-alliance");
        assert_eq!(
            issuer.full_url("https://badges.example.org"),
            "https://badges.example.org/public/issuers/oregon-badge-alliance"
        );
    }

    #[test]
    fn test_object_id() {
        let mut issuer = sample_issuer(1, "oba");
        assert_eq!(issuer.object_id(), None);
        issuer.set_object_id("https://badges.example.org/public/issuers/oba");
        assert_eq!(
            issuer.object_id(),
            Some("https://badges.example.org/public/issuers/oba")
        );
    }

    #[test]
    fn test_serialize_camel_case() {
        let issuer = sample_issuer(7, "oba");
        let value = serde_json::to_value(&issuer).unwrap();
        assert_eq!(value["ownerId"], 1);
        assert_eq!(value["badgeObject"]["name"], "Oregon Badge Alliance");
    }
}

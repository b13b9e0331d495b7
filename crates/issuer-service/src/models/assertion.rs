//! 徽章断言实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::BadgeObject;

/// 徽章断言
///
/// 某个徽章颁发给某位获得者的记录。`issuer_id` 与徽章类的颁发者冗余存储，
/// 为将来允许二者不同预留。slug 为随机 UUID，创建后不可修改。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IssuerAssertion {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub created_by: Option<i64>,
    /// Open Badges 断言文档
    pub badge_object: Value,
    pub badge_class_id: i64,
    pub issuer_id: i64,
    pub slug: String,
}

impl IssuerAssertion {
    /// 生成新的断言 slug
    pub fn new_slug() -> String {
        Uuid::new_v4().to_string()
    }
}

impl BadgeObject for IssuerAssertion {
    fn absolute_url(&self) -> String {
        format!("/public/assertions/{}", self.slug)
    }
}

/// 新建断言的入库数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssertion {
    pub badge_class_id: i64,
    pub issuer_id: i64,
    pub slug: String,
    pub created_by: Option<i64>,
    pub badge_object: Value,
}

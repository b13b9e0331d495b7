//! 获得者通知实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 获得者通知
///
/// 记录需要就某个 Open Badge 断言通知的邮箱地址
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EarnerNotification {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 断言 URL，去重按此字段精确匹配
    pub url: String,
    pub email: String,
    /// 关联的 Open Badge
    #[sqlx(default)]
    pub badge_id: Option<i64>,
}

/// 新建获得者通知的入库数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewEarnerNotification {
    pub url: String,
    pub email: String,
    pub badge_id: Option<i64>,
}

#[cfg(test)]
pub(crate) fn sample_notification(id: i64, badge_id: Option<i64>) -> EarnerNotification {
    let now = Utc::now();
    EarnerNotification {
        id,
        created_at: now,
        updated_at: now,
        url: "https://issuer.example.org/assertions/1".to_string(),
        email: "earner@example.org".to_string(),
        badge_id,
    }
}

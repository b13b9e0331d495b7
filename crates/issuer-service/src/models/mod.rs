//! 颁发服务领域模型
//!
//! 颁发者 -> 徽章类 -> 徽章断言 三层结构，以及 Open Badge 文档和获得者通知

pub mod assertion;
pub mod badge_class;
pub mod earner_notification;
pub mod enums;
pub mod issuer;
pub mod open_badge;

pub use assertion::{IssuerAssertion, NewAssertion};
pub use badge_class::{IssuerBadgeClass, NewBadgeClass};
pub use earner_notification::{EarnerNotification, NewEarnerNotification};
pub use enums::{IssuerRole, LdScope};
pub use issuer::{Issuer, NewIssuer};
pub use open_badge::{BadgeDocument, NewOpenBadge, OpenBadge};

/// 徽章对象的公共行为
///
/// 颁发者、徽章类、断言都有站内公开地址，完整 URL 为站点源加上该地址
pub trait BadgeObject {
    /// 站内绝对路径，如 `/public/issuers/{slug}`
    fn absolute_url(&self) -> String;

    /// 带站点源的完整 URL
    fn full_url(&self, http_origin: &str) -> String {
        format!("{}{}", http_origin, self.absolute_url())
    }
}

/// 读取徽章文档中的 `@id`
pub(crate) fn object_id(badge_object: &serde_json::Value) -> Option<&str> {
    badge_object.get("@id").and_then(|v| v.as_str())
}

/// 写入徽章文档中的 `@id`，文档不是 JSON 对象时先替换为空对象
pub(crate) fn set_object_id(badge_object: &mut serde_json::Value, id: &str) {
    if !badge_object.is_object() {
        *badge_object = serde_json::Value::Object(serde_json::Map::new());
    }
    if let Some(map) = badge_object.as_object_mut() {
        map.insert("@id".to_string(), serde_json::Value::String(id.to_string()));
    }
}

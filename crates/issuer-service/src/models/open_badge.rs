//! Open Badge 文档
//!
//! 已导入的 Open Badge（含断言、徽章类、颁发者三部分链接数据）及其烘焙图片。
//! 通知邮件通过 [`BadgeDocument`] 读取展示字段。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use badge_shared::config::SiteConfig;

use super::enums::LdScope;
use crate::utils::is_probable_url;

/// Open Badge 文档访问接口
pub trait BadgeDocument {
    /// 按点分路径读取子文档中的属性，如 `ld_prop(LdScope::Issuer, "name")`
    ///
    /// 数字段用于数组下标，如 `"alignment.0.url"`
    fn ld_prop(&self, scope: LdScope, path: &str) -> Option<&Value>;

    /// 烘焙图片的完整 URL
    fn baked_image_url(&self, site: &SiteConfig) -> Option<String>;

    /// 属性的文本形式，缺失或为 null 时为空串
    fn ld_prop_text(&self, scope: LdScope, path: &str) -> String {
        match self.ld_prop(scope, path) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// 带范围前缀的属性文本，如 `"bc.name"`、`"iss.url"`
    ///
    /// 前缀无法识别时按缺失处理
    fn ld_text(&self, qualified: &str) -> String {
        let Some((scope, path)) = qualified.split_once('.') else {
            return String::new();
        };
        match scope.parse::<LdScope>() {
            Ok(scope) => self.ld_prop_text(scope, path),
            Err(_) => String::new(),
        }
    }
}

/// 已导入的 Open Badge
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OpenBadge {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    /// 导入时填写的获得者标识（通常为邮箱）
    #[sqlx(default)]
    pub recipient_input: Option<String>,
    /// 烘焙图片路径（相对 media 目录）或完整 URL
    #[sqlx(default)]
    pub image: Option<String>,
    /// `{"assertion": {...}, "badgeclass": {...}, "issuer": {...}}`
    pub full_ld: Value,
}

impl BadgeDocument for OpenBadge {
    fn ld_prop(&self, scope: LdScope, path: &str) -> Option<&Value> {
        let mut current = self.full_ld.get(scope.key())?;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                other => other.get(segment)?,
            };
        }
        Some(current)
    }

    fn baked_image_url(&self, site: &SiteConfig) -> Option<String> {
        let image = self.image.as_deref().filter(|s| !s.is_empty())?;
        if is_probable_url(image) {
            return Some(image.to_string());
        }

        let path = image.trim_start_matches('/');
        if is_probable_url(&site.media_url) {
            Some(format!("{}{}", site.media_url, path))
        } else {
            Some(format!("{}{}{}", site.http_origin, site.media_url, path))
        }
    }
}

/// 新建 Open Badge 的入库数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewOpenBadge {
    pub recipient_input: Option<String>,
    pub image: Option<String>,
    pub full_ld: Value,
}

#[cfg(test)]
pub(crate) fn sample_open_badge(id: i64) -> OpenBadge {
    OpenBadge {
        id,
        created_at: Utc::now(),
        recipient_input: Some("earner@example.org".to_string()),
        image: Some("baked/web-literacy.png".to_string()),
        full_ld: serde_json::json!({
            "assertion": {"uid": "abc", "issuedOn": 1700000000},
            "badgeclass": {
                "name": "Web Literacy",
                "description": "Understands how the web works",
                "alignment": [{"url": "https://example.org/standard/1"}]
            },
            "issuer": {"name": "Oregon Badge Alliance", "url": "https://oregonbadgealliance.org"}
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            http_origin: "https://badges.example.org".to_string(),
            media_url: "/media/".to_string(),
        }
    }

    #[test]
    fn test_ld_prop_simple() {
        let ob = sample_open_badge(1);
        assert_eq!(
            ob.ld_prop(LdScope::BadgeClass, "name"),
            Some(&Value::String("Web Literacy".to_string()))
        );
        assert_eq!(
            ob.ld_prop_text(LdScope::Issuer, "url"),
            "https://oregonbadgealliance.org"
        );
    }

    #[test]
    fn test_ld_prop_dotted_and_array() {
        let ob = sample_open_badge(1);
        assert_eq!(
            ob.ld_prop_text(LdScope::BadgeClass, "alignment.0.url"),
            "https://example.org/standard/1"
        );
        assert_eq!(ob.ld_prop(LdScope::BadgeClass, "alignment.5.url"), None);
    }

    #[test]
    fn test_ld_prop_text_for_missing_and_numbers() {
        let ob = sample_open_badge(1);
        assert_eq!(ob.ld_prop_text(LdScope::Issuer, "email"), "");
        assert_eq!(ob.ld_prop_text(LdScope::Assertion, "issuedOn"), "1700000000");
    }

    #[test]
    fn test_baked_image_url_relative() {
        let ob = sample_open_badge(1);
        assert_eq!(
            ob.baked_image_url(&site()).as_deref(),
            Some("https://badges.example.org/media/baked/web-literacy.png")
        );
    }

    #[test]
    fn test_baked_image_url_absolute_and_missing() {
        let mut ob = sample_open_badge(1);
        ob.image = Some("https://cdn.example.org/b.png".to_string());
        assert_eq!(
            ob.baked_image_url(&site()).as_deref(),
            Some("https://cdn.example.org/b.png")
        );

        ob.image = None;
        assert_eq!(ob.baked_image_url(&site()), None);
    }

    #[test]
    fn test_baked_image_url_with_absolute_media_url() {
        let ob = sample_open_badge(1);
        let site = SiteConfig {
            http_origin: "https://badges.example.org".to_string(),
            media_url: "https://cdn.example.org/media/".to_string(),
        };
        assert_eq!(
            ob.baked_image_url(&site).as_deref(),
            Some("https://cdn.example.org/media/baked/web-literacy.png")
        );
    }

    #[test]
    fn test_ld_text_with_scope_prefix() {
        let ob = sample_open_badge(1);
        assert_eq!(ob.ld_text("bc.name"), "Web Literacy");
        assert_eq!(ob.ld_text("iss.url"), "https://oregonbadgealliance.org");
        assert_eq!(ob.ld_text("badgeclass.alignment.0.url"), "https://example.org/standard/1");
        assert_eq!(ob.ld_text("recipient.email"), "");
        assert_eq!(ob.ld_text("name"), "");
    }
}

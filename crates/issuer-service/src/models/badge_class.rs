//! 徽章类实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BadgeObject;
use crate::utils::is_probable_url;

/// 徽章类
///
/// 颁发者可授予的一类徽章。获取条件（criteria）要么是远程 URL，要么是本地文本，
/// 两者不会同时存在。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IssuerBadgeClass {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub created_by: Option<i64>,
    /// Open Badges 徽章类文档
    pub badge_object: Value,
    /// 所属颁发者，存在徽章类时颁发者不可删除
    pub issuer_id: i64,
    pub name: String,
    pub slug: String,
    #[sqlx(default)]
    pub criteria_text: Option<String>,
    #[sqlx(default)]
    pub criteria_url: Option<String>,
    /// 上传图片路径（uploads/badges 下）
    #[sqlx(default)]
    pub image: Option<String>,
}

impl IssuerBadgeClass {
    /// 获取条件：优先返回 URL，其次返回文本
    pub fn criteria(&self) -> Option<&str> {
        match &self.criteria_url {
            Some(url) => Some(url.as_str()),
            None => self.criteria_text.as_deref(),
        }
    }

    /// 设置获取条件
    ///
    /// 像 URL 的值写入 `criteria_url` 并清空文本，否则写入 `criteria_text` 并清空 URL
    pub fn set_criteria(&mut self, value: impl Into<String>) {
        let (url, text) = split_criteria(value.into());
        self.criteria_url = url;
        self.criteria_text = text;
    }

    /// 清空获取条件
    pub fn clear_criteria(&mut self) {
        self.criteria_url = None;
        self.criteria_text = None;
    }
}

impl BadgeObject for IssuerBadgeClass {
    fn absolute_url(&self) -> String {
        format!("/public/badges/{}", self.slug)
    }
}

/// `criteria_url` 列长度上限
pub const CRITERIA_URL_MAX_LENGTH: usize = 1024;

/// 将获取条件拆分为 (url, text)，二者至多一个有值
pub(crate) fn split_criteria(value: String) -> (Option<String>, Option<String>) {
    if is_probable_url(&value) {
        (Some(value), None)
    } else {
        (None, Some(value))
    }
}

/// 新建徽章类的入库数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewBadgeClass {
    pub issuer_id: i64,
    pub name: String,
    pub slug: String,
    pub criteria_text: Option<String>,
    pub criteria_url: Option<String>,
    pub image: Option<String>,
    pub created_by: Option<i64>,
    pub badge_object: Value,
}

impl NewBadgeClass {
    /// 设置获取条件，规则同 [`IssuerBadgeClass::set_criteria`]，空串视为无条件
    pub fn with_criteria(mut self, value: Option<String>) -> Self {
        let (url, text) = match value.filter(|v| !v.is_empty()) {
            Some(v) => split_criteria(v),
            None => (None, None),
        };
        self.criteria_url = url;
        self.criteria_text = text;
        self
    }
}

#[cfg(test)]
pub(crate) fn sample_badge_class(id: i64, issuer_id: i64, slug: &str) -> IssuerBadgeClass {
    IssuerBadgeClass {
        id,
        created_at: Utc::now(),
        created_by: Some(1),
        badge_object: serde_json::json!({"name": "Web Literacy"}),
        issuer_id,
        name: "Web Literacy".to_string(),
        slug: slug.to_string(),
        criteria_text: None,
        criteria_url: None,
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_criteria_url() {
        let mut bc = sample_badge_class(1, 1, "web-literacy");
        bc.criteria_text = Some("old text".to_string());

        bc.set_criteria("https://example.org/criteria/web-literacy");

        assert_eq!(
            bc.criteria_url.as_deref(),
            Some("https://example.org/criteria/web-literacy")
        );
        assert_eq!(bc.criteria_text, None);
        assert_eq!(bc.criteria(), Some("https://example.org/criteria/web-literacy"));
    }

    #[test]
    fn test_set_criteria_text() {
        let mut bc = sample_badge_class(1, 1, "web-literacy");
        bc.criteria_url = Some("https://example.org/old".to_string());

        bc.set_criteria("Attend three workshops and publish a web page.");

        assert_eq!(bc.criteria_url, None);
        assert_eq!(
            bc.criteria_text.as_deref(),
            Some("Attend three workshops and publish a web page.")
        );
        assert_eq!(
            bc.criteria(),
            Some("Attend three workshops and publish a web page.")
        );
    }

    #[test]
    fn test_criteria_never_both() {
        let mut bc = sample_badge_class(1, 1, "x");
        for value in ["https://a.example/1", "plain", "http://b.example", "x y"] {
            bc.set_criteria(value);
            assert!(bc.criteria_url.is_none() || bc.criteria_text.is_none());
        }
        bc.clear_criteria();
        assert_eq!(bc.criteria(), None);
    }

    #[test]
    fn test_new_badge_class_with_criteria() {
        let new = NewBadgeClass {
            issuer_id: 1,
            name: "n".to_string(),
            slug: "n".to_string(),
            criteria_text: None,
            criteria_url: None,
            image: None,
            created_by: None,
            badge_object: serde_json::json!({}),
        };
        let with_url = new.clone().with_criteria(Some("https://example.org/c".to_string()));
        assert_eq!(with_url.criteria_url.as_deref(), Some("https://example.org/c"));
        assert_eq!(with_url.criteria_text, None);

        let with_none = new.with_criteria(None);
        assert_eq!(with_none.criteria_url, None);
        assert_eq!(with_none.criteria_text, None);
    }

    #[test]
    fn test_absolute_url() {
        let bc = sample_badge_class(1, 1, "web-literacy");
        assert_eq!(bc.absolute_url(), "/public/badges/web-literacy");
    }

    #[test]
    fn test_new_badge_class_empty_criteria_is_none() {
        let new = NewBadgeClass {
            issuer_id: 1,
            name: "n".to_string(),
            slug: "n".to_string(),
            criteria_text: Some("stale".to_string()),
            criteria_url: None,
            image: None,
            created_by: None,
            badge_object: Value::Null,
        }
        .with_criteria(Some(String::new()));
        assert_eq!(new.criteria_text, None);
        assert_eq!(new.criteria_url, None);
    }
}

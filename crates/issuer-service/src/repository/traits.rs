//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，便于 mock 测试

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    EarnerNotification, Issuer, IssuerAssertion, IssuerBadgeClass, IssuerRole, NewAssertion,
    NewBadgeClass, NewEarnerNotification, NewIssuer, NewOpenBadge, OpenBadge,
};

/// 颁发者仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssuerRepositoryTrait: Send + Sync {
    async fn get_issuer(&self, id: i64) -> Result<Option<Issuer>>;
    async fn get_issuer_by_slug(&self, slug: &str) -> Result<Option<Issuer>>;
    /// 可能与 `base` 及其 `-N` 变体冲突的已有 slug，可排除自身
    async fn list_slugs_with_prefix(&self, base: &str, exclude_id: Option<i64>)
    -> Result<Vec<String>>;

    async fn insert_issuer(&self, issuer: &NewIssuer) -> Result<Issuer>;
    /// 整行写入（不含 id/created_at）
    async fn update_issuer(&self, issuer: &Issuer) -> Result<()>;
    /// 只写 `badge_object`
    async fn update_badge_object(&self, id: i64, badge_object: &Value) -> Result<()>;
    async fn delete_issuer(&self, id: i64) -> Result<()>;
    async fn count_badge_classes(&self, issuer_id: i64) -> Result<i64>;

    // 成员
    async fn add_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<()>;
    async fn remove_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<()>;
    async fn list_members(&self, issuer_id: i64, role: IssuerRole) -> Result<Vec<i64>>;
    async fn is_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<bool>;
}

/// 徽章类仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeClassRepositoryTrait: Send + Sync {
    async fn get_badge_class(&self, id: i64) -> Result<Option<IssuerBadgeClass>>;
    async fn get_badge_class_by_slug(&self, slug: &str) -> Result<Option<IssuerBadgeClass>>;
    async fn list_by_issuer(&self, issuer_id: i64) -> Result<Vec<IssuerBadgeClass>>;
    async fn list_slugs_with_prefix(&self, base: &str, exclude_id: Option<i64>)
    -> Result<Vec<String>>;

    async fn insert_badge_class(&self, badge_class: &NewBadgeClass) -> Result<IssuerBadgeClass>;
    async fn update_badge_class(&self, badge_class: &IssuerBadgeClass) -> Result<()>;
    async fn delete_badge_class(&self, id: i64) -> Result<()>;
    async fn count_assertions(&self, badge_class_id: i64) -> Result<i64>;
}

/// 徽章断言仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssertionRepositoryTrait: Send + Sync {
    async fn get_assertion(&self, id: i64) -> Result<Option<IssuerAssertion>>;
    async fn get_assertion_by_slug(&self, slug: &str) -> Result<Option<IssuerAssertion>>;
    async fn list_by_badge_class(&self, badge_class_id: i64) -> Result<Vec<IssuerAssertion>>;
    async fn insert_assertion(&self, assertion: &NewAssertion) -> Result<IssuerAssertion>;
    async fn delete_assertion(&self, id: i64) -> Result<()>;
}

/// Open Badge 仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OpenBadgeRepositoryTrait: Send + Sync {
    async fn get_open_badge(&self, id: i64) -> Result<Option<OpenBadge>>;
    async fn insert_open_badge(&self, open_badge: &NewOpenBadge) -> Result<OpenBadge>;
}

/// 获得者通知仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EarnerNotificationRepositoryTrait: Send + Sync {
    async fn get_notification(&self, id: i64) -> Result<Option<EarnerNotification>>;
    /// 按 url 精确匹配，最多返回 `limit` 条
    async fn find_by_url(&self, url: &str, limit: i64) -> Result<Vec<EarnerNotification>>;
    async fn insert_notification(
        &self,
        notification: &NewEarnerNotification,
    ) -> Result<EarnerNotification>;
}

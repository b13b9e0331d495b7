//! 徽章断言服务
//!
//! 颁发断言需要颁发者的所有者、编辑或员工身份。断言的颁发者默认取徽章类的颁发者。

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use badge_shared::observability::metrics;

use super::issuer_service::{can_edit, can_issue};
use super::model_cache::{ModelCache, cache_keys, cache_ttl};
use crate::dto::IssueAssertionRequest;
use crate::error::{IssuerError, Result};
use crate::models::{Issuer, IssuerAssertion, IssuerBadgeClass, NewAssertion};
use crate::repository::{AssertionRepositoryTrait, BadgeClassRepositoryTrait, IssuerRepositoryTrait};

/// 徽章断言服务
pub struct AssertionService<IR, BR, AR>
where
    IR: IssuerRepositoryTrait,
    BR: BadgeClassRepositoryTrait,
    AR: AssertionRepositoryTrait,
{
    issuer_repo: Arc<IR>,
    badge_class_repo: Arc<BR>,
    assertion_repo: Arc<AR>,
    cache: ModelCache,
}

impl<IR, BR, AR> AssertionService<IR, BR, AR>
where
    IR: IssuerRepositoryTrait,
    BR: BadgeClassRepositoryTrait,
    AR: AssertionRepositoryTrait,
{
    pub fn new(
        issuer_repo: Arc<IR>,
        badge_class_repo: Arc<BR>,
        assertion_repo: Arc<AR>,
        cache: ModelCache,
    ) -> Self {
        Self {
            issuer_repo,
            badge_class_repo,
            assertion_repo,
            cache,
        }
    }

    /// 从徽章类颁发断言
    #[instrument(skip(self, req), fields(badge_class = %badge_class_slug, user_id = req.user_id))]
    pub async fn issue_assertion(
        &self,
        badge_class_slug: &str,
        req: IssueAssertionRequest,
    ) -> Result<IssuerAssertion> {
        let badge_class = self.require_badge_class(badge_class_slug).await?;
        let issuer = self.issuer(badge_class.issuer_id).await?;
        if !can_issue(self.issuer_repo.as_ref(), &issuer, req.user_id).await? {
            return Err(IssuerError::Forbidden(format!(
                "用户 {} 不能以颁发者 {} 的名义颁发徽章",
                req.user_id, issuer.slug
            )));
        }

        let new_assertion = NewAssertion {
            badge_class_id: badge_class.id,
            issuer_id: badge_class.issuer_id,
            slug: IssuerAssertion::new_slug(),
            created_by: Some(req.user_id),
            badge_object: req.badge_object.unwrap_or_else(|| Value::Object(Default::default())),
        };

        let assertion = self.assertion_repo.insert_assertion(&new_assertion).await?;

        metrics::record_badge_object_created("assertion");
        info!(
            assertion_id = assertion.id,
            badge_class_id = badge_class.id,
            slug = %assertion.slug,
            "Assertion issued"
        );
        Ok(assertion)
    }

    /// 按 slug 获取断言（缓存优先）
    pub async fn get_assertion_by_slug(&self, slug: &str) -> Result<Option<IssuerAssertion>> {
        let repo = self.assertion_repo.clone();
        let slug_owned = slug.to_string();
        self.cache
            .get_or_fetch(&cache_keys::assertion(slug), cache_ttl::ASSERTION, || async move {
                repo.get_assertion_by_slug(&slug_owned).await
            })
            .await
    }

    pub async fn require_assertion(&self, slug: &str) -> Result<IssuerAssertion> {
        self.get_assertion_by_slug(slug)
            .await?
            .ok_or_else(|| IssuerError::AssertionNotFound(slug.to_string()))
    }

    /// 列出徽章类下的断言
    pub async fn list_for_badge_class(&self, badge_class_slug: &str) -> Result<Vec<IssuerAssertion>> {
        let badge_class = self.require_badge_class(badge_class_slug).await?;
        self.assertion_repo.list_by_badge_class(badge_class.id).await
    }

    /// 断言的所有者，即颁发者的所有者
    pub async fn owner_of(&self, assertion: &IssuerAssertion) -> Result<i64> {
        Ok(self.issuer(assertion.issuer_id).await?.owner_id)
    }

    /// 撤销（删除）断言，需要编辑权限
    #[instrument(skip(self))]
    pub async fn delete_assertion(&self, slug: &str, user_id: i64) -> Result<()> {
        let assertion = self.require_assertion(slug).await?;
        let issuer = self.issuer(assertion.issuer_id).await?;
        if !can_edit(self.issuer_repo.as_ref(), &issuer, user_id).await? {
            return Err(IssuerError::Forbidden(format!(
                "用户 {} 不能撤销颁发者 {} 的断言",
                user_id, issuer.slug
            )));
        }

        self.assertion_repo.delete_assertion(assertion.id).await?;
        self.cache.invalidate(&cache_keys::assertion(&assertion.slug)).await;
        info!(assertion_id = assertion.id, slug = %assertion.slug, "Assertion deleted");
        Ok(())
    }

    async fn require_badge_class(&self, slug: &str) -> Result<IssuerBadgeClass> {
        let repo = self.badge_class_repo.clone();
        let slug_owned = slug.to_string();
        self.cache
            .get_or_fetch(
                &cache_keys::badge_class(slug),
                cache_ttl::BADGE_CLASS,
                || async move { repo.get_badge_class_by_slug(&slug_owned).await },
            )
            .await?
            .ok_or_else(|| IssuerError::BadgeClassNotFound(slug.to_string()))
    }

    async fn issuer(&self, issuer_id: i64) -> Result<Issuer> {
        self.issuer_repo
            .get_issuer(issuer_id)
            .await?
            .ok_or_else(|| IssuerError::IssuerNotFound(issuer_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::badge_class::sample_badge_class;
    use crate::models::issuer::sample_issuer;
    use crate::models::IssuerRole;
    use crate::repository::{
        MockAssertionRepositoryTrait, MockBadgeClassRepositoryTrait, MockIssuerRepositoryTrait,
    };
    use chrono::Utc;

    type Service = AssertionService<
        MockIssuerRepositoryTrait,
        MockBadgeClassRepositoryTrait,
        MockAssertionRepositoryTrait,
    >;

    fn service(assertion_repo: MockAssertionRepositoryTrait) -> Service {
        let mut issuer_repo = MockIssuerRepositoryTrait::new();
        issuer_repo
            .expect_get_issuer()
            .returning(|id| Ok(Some(sample_issuer(id, "oregon"))));
        // 用户 5 是员工
        issuer_repo
            .expect_is_member()
            .returning(|_, role, user_id| Ok(role == IssuerRole::Staff && user_id == 5));

        let mut badge_class_repo = MockBadgeClassRepositoryTrait::new();
        badge_class_repo
            .expect_get_badge_class_by_slug()
            .returning(|slug| Ok(Some(sample_badge_class(10, 3, slug))));

        AssertionService::new(
            Arc::new(issuer_repo),
            Arc::new(badge_class_repo),
            Arc::new(assertion_repo),
            ModelCache::disabled(),
        )
    }

    fn stored(new: &NewAssertion) -> IssuerAssertion {
        IssuerAssertion {
            id: 100,
            created_at: Utc::now(),
            created_by: new.created_by,
            badge_object: new.badge_object.clone(),
            badge_class_id: new.badge_class_id,
            issuer_id: new.issuer_id,
            slug: new.slug.clone(),
        }
    }

    #[tokio::test]
    async fn test_staff_can_issue_with_default_issuer() {
        let mut repo = MockAssertionRepositoryTrait::new();
        repo.expect_insert_assertion()
            .withf(|new| new.issuer_id == 3 && new.badge_class_id == 10 && new.slug.len() == 36)
            .returning(|new| Ok(stored(new)));

        let req = IssueAssertionRequest {
            user_id: 5,
            badge_object: None,
        };
        let assertion = service(repo).issue_assertion("web-literacy", req).await.unwrap();
        assert_eq!(assertion.issuer_id, 3);
        assert_eq!(assertion.created_by, Some(5));
    }

    #[tokio::test]
    async fn test_outsider_cannot_issue() {
        let mut repo = MockAssertionRepositoryTrait::new();
        repo.expect_insert_assertion().never();

        let req = IssueAssertionRequest {
            user_id: 99,
            badge_object: None,
        };
        let err = service(repo).issue_assertion("web-literacy", req).await.unwrap_err();
        assert!(matches!(err, IssuerError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_staff_cannot_delete() {
        let mut repo = MockAssertionRepositoryTrait::new();
        repo.expect_get_assertion_by_slug().returning(|slug| {
            Ok(Some(IssuerAssertion {
                id: 100,
                created_at: Utc::now(),
                created_by: Some(5),
                badge_object: serde_json::json!({}),
                badge_class_id: 10,
                issuer_id: 3,
                slug: slug.to_string(),
            }))
        });
        repo.expect_delete_assertion().never();

        let err = service(repo).delete_assertion("abc", 5).await.unwrap_err();
        assert!(matches!(err, IssuerError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_assertion_not_found() {
        let mut repo = MockAssertionRepositoryTrait::new();
        repo.expect_get_assertion_by_slug().returning(|_| Ok(None));

        let err = service(repo).require_assertion("nope").await.unwrap_err();
        assert!(matches!(err, IssuerError::AssertionNotFound(slug) if slug == "nope"));
    }
}

//! 颁发者服务
//!
//! 负责颁发者的创建、保存、删除与成员管理。
//!
//! ## 保存语义
//!
//! 先整行写入，再检查 `badge_object["@id"]` 是否等于完整 URL，
//! 不相等时回填并单独再写一次（两次写入不在同一事务内）。
//! 已经相等时只有一次写入。

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use badge_shared::config::SiteConfig;
use badge_shared::observability::metrics;

use super::model_cache::{ModelCache, cache_keys, cache_ttl};
use crate::dto::{CreateIssuerRequest, UpdateIssuerRequest};
use crate::error::{IssuerError, Result};
use crate::models::{BadgeObject, Issuer, IssuerRole, NewIssuer};
use crate::repository::IssuerRepositoryTrait;
use crate::utils::{slug_base, unique_slug};

/// 颁发者 slug 为空时的回退值
const ISSUER_SLUG_FALLBACK: &str = "issuer";

/// 是否可编辑颁发者：所有者或编辑
pub(crate) async fn can_edit<R>(repo: &R, issuer: &Issuer, user_id: i64) -> Result<bool>
where
    R: IssuerRepositoryTrait + ?Sized,
{
    if issuer.owner_id == user_id {
        return Ok(true);
    }
    repo.is_member(issuer.id, IssuerRole::Editor, user_id).await
}

/// 是否可颁发徽章：所有者、编辑或员工
pub(crate) async fn can_issue<R>(repo: &R, issuer: &Issuer, user_id: i64) -> Result<bool>
where
    R: IssuerRepositoryTrait + ?Sized,
{
    if can_edit(repo, issuer, user_id).await? {
        return Ok(true);
    }
    repo.is_member(issuer.id, IssuerRole::Staff, user_id).await
}

/// 颁发者服务
pub struct IssuerService<IR>
where
    IR: IssuerRepositoryTrait,
{
    issuer_repo: Arc<IR>,
    site: SiteConfig,
    cache: ModelCache,
}

impl<IR> IssuerService<IR>
where
    IR: IssuerRepositoryTrait,
{
    pub fn new(issuer_repo: Arc<IR>, site: SiteConfig, cache: ModelCache) -> Self {
        Self {
            issuer_repo,
            site,
            cache,
        }
    }

    /// 创建颁发者
    #[instrument(skip(self, req), fields(user_id = req.user_id, name = %req.name))]
    pub async fn create_issuer(&self, req: CreateIssuerRequest) -> Result<Issuer> {
        let source = req.slug.as_deref().unwrap_or(&req.name);
        let slug = self.allocate_slug(source, None).await?;

        let new_issuer = NewIssuer {
            name: req.name,
            slug,
            owner_id: req.owner_id.unwrap_or(req.user_id),
            created_by: Some(req.user_id),
            image: req.image,
            badge_object: req.badge_object.unwrap_or_else(|| Value::Object(Default::default())),
        };

        let issuer = self.issuer_repo.insert_issuer(&new_issuer).await?;
        let issuer = self.ensure_object_id(issuer, 1).await?;

        metrics::record_badge_object_created("issuer");
        info!(issuer_id = issuer.id, slug = %issuer.slug, "Issuer created");
        Ok(issuer)
    }

    /// 保存颁发者
    ///
    /// 返回时 `badge_object["@id"]` 一定等于 `full_url(http_origin)`
    #[instrument(skip(self, issuer), fields(issuer_id = issuer.id, slug = %issuer.slug))]
    pub async fn save(&self, issuer: Issuer) -> Result<Issuer> {
        self.issuer_repo.update_issuer(&issuer).await?;
        let issuer = self.ensure_object_id(issuer, 1).await?;
        self.cache.invalidate(&cache_keys::issuer(&issuer.slug)).await;
        Ok(issuer)
    }

    /// 第一次写入之后回填 `@id`
    async fn ensure_object_id(&self, mut issuer: Issuer, writes: u32) -> Result<Issuer> {
        let expected = issuer.full_url(&self.site.http_origin);
        if issuer.object_id() == Some(expected.as_str()) {
            metrics::record_issuer_save(writes);
            return Ok(issuer);
        }

        issuer.set_object_id(&expected);
        self.issuer_repo
            .update_badge_object(issuer.id, &issuer.badge_object)
            .await?;
        metrics::record_issuer_save(writes + 1);
        info!(issuer_id = issuer.id, object_id = %expected, "Issuer @id patched");
        Ok(issuer)
    }

    /// 更新颁发者
    #[instrument(skip(self, req), fields(slug = %slug, user_id = req.user_id))]
    pub async fn update_issuer(&self, slug: &str, req: UpdateIssuerRequest) -> Result<Issuer> {
        let mut issuer = self.require_issuer(slug).await?;
        self.require_edit(&issuer, req.user_id).await?;

        let old_slug = issuer.slug.clone();
        if let Some(name) = req.name {
            issuer.name = name;
        }
        if let Some(new_slug) = req.slug {
            if new_slug != issuer.slug {
                issuer.slug = self.allocate_slug(&new_slug, Some(issuer.id)).await?;
            }
        }
        if let Some(image) = req.image {
            issuer.image = Some(image).filter(|s| !s.is_empty());
        }
        if let Some(badge_object) = req.badge_object {
            issuer.badge_object = badge_object;
        }

        let issuer = self.save(issuer).await?;
        if issuer.slug != old_slug {
            self.cache.invalidate(&cache_keys::issuer(&old_slug)).await;
        }
        Ok(issuer)
    }

    /// 按 slug 获取颁发者（缓存优先）
    pub async fn get_issuer_by_slug(&self, slug: &str) -> Result<Option<Issuer>> {
        let repo = self.issuer_repo.clone();
        let slug_owned = slug.to_string();
        self.cache
            .get_or_fetch(&cache_keys::issuer(slug), cache_ttl::ISSUER, || async move {
                repo.get_issuer_by_slug(&slug_owned).await
            })
            .await
    }

    /// 按 slug 获取颁发者，不存在时报错
    pub async fn require_issuer(&self, slug: &str) -> Result<Issuer> {
        self.get_issuer_by_slug(slug)
            .await?
            .ok_or_else(|| IssuerError::IssuerNotFound(slug.to_string()))
    }

    /// 删除颁发者，仍有徽章类时拒绝
    #[instrument(skip(self))]
    pub async fn delete_issuer(&self, slug: &str, user_id: i64) -> Result<()> {
        let issuer = self.require_issuer(slug).await?;
        if issuer.owner_id != user_id {
            return Err(IssuerError::Forbidden("只有所有者可以删除颁发者".to_string()));
        }

        let badge_classes = self.issuer_repo.count_badge_classes(issuer.id).await?;
        if badge_classes > 0 {
            return Err(IssuerError::ProtectedReference(format!(
                "颁发者 {} 下仍有 {} 个徽章类",
                issuer.slug, badge_classes
            )));
        }

        self.issuer_repo.delete_issuer(issuer.id).await?;
        self.cache.invalidate(&cache_keys::issuer(&issuer.slug)).await;
        info!(issuer_id = issuer.id, slug = %issuer.slug, "Issuer deleted");
        Ok(())
    }

    // ==================== 成员 ====================

    pub async fn add_member(
        &self,
        slug: &str,
        role: IssuerRole,
        acting_user_id: i64,
        member_id: i64,
    ) -> Result<Vec<i64>> {
        let issuer = self.require_issuer(slug).await?;
        self.require_edit(&issuer, acting_user_id).await?;

        self.issuer_repo.add_member(issuer.id, role, member_id).await?;
        info!(issuer_id = issuer.id, %role, member_id, "Issuer member added");
        self.issuer_repo.list_members(issuer.id, role).await
    }

    pub async fn remove_member(
        &self,
        slug: &str,
        role: IssuerRole,
        acting_user_id: i64,
        member_id: i64,
    ) -> Result<Vec<i64>> {
        let issuer = self.require_issuer(slug).await?;
        self.require_edit(&issuer, acting_user_id).await?;

        self.issuer_repo.remove_member(issuer.id, role, member_id).await?;
        info!(issuer_id = issuer.id, %role, member_id, "Issuer member removed");
        self.issuer_repo.list_members(issuer.id, role).await
    }

    pub async fn list_members(&self, slug: &str, role: IssuerRole) -> Result<Vec<i64>> {
        let issuer = self.require_issuer(slug).await?;
        self.issuer_repo.list_members(issuer.id, role).await
    }

    pub async fn can_edit(&self, issuer: &Issuer, user_id: i64) -> Result<bool> {
        can_edit(self.issuer_repo.as_ref(), issuer, user_id).await
    }

    pub async fn can_issue(&self, issuer: &Issuer, user_id: i64) -> Result<bool> {
        can_issue(self.issuer_repo.as_ref(), issuer, user_id).await
    }

    async fn require_edit(&self, issuer: &Issuer, user_id: i64) -> Result<()> {
        if self.can_edit(issuer, user_id).await? {
            Ok(())
        } else {
            Err(IssuerError::Forbidden(format!(
                "用户 {} 不能编辑颁发者 {}",
                user_id, issuer.slug
            )))
        }
    }

    async fn allocate_slug(&self, source: &str, exclude_id: Option<i64>) -> Result<String> {
        let base = slug_base(source, ISSUER_SLUG_FALLBACK);
        let taken = self
            .issuer_repo
            .list_slugs_with_prefix(&base, exclude_id)
            .await?;
        Ok(unique_slug(&base, ISSUER_SLUG_FALLBACK, &taken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issuer::sample_issuer;
    use crate::repository::MockIssuerRepositoryTrait;
    use mockall::predicate::*;
    use serde_json::json;

    const ORIGIN: &str = "https://badges.example.org";

    fn site() -> SiteConfig {
        SiteConfig {
            http_origin: ORIGIN.to_string(),
            ..Default::default()
        }
    }

    fn service(repo: MockIssuerRepositoryTrait) -> IssuerService<MockIssuerRepositoryTrait> {
        IssuerService::new(Arc::new(repo), site(), ModelCache::disabled())
    }

    #[tokio::test]
    async fn test_save_patches_object_id() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_update_issuer().times(1).returning(|_| Ok(()));
        repo.expect_update_badge_object()
            .withf(|id, doc| {
                *id == 5 && doc["@id"] == "https://badges.example.org/public/issuers/oregon"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let saved = service(repo).save(sample_issuer(5, "oregon")).await.unwrap();
        assert_eq!(
            saved.object_id(),
            Some("https://badges.example.org/public/issuers/oregon")
        );
        // 其他字段保留
        assert_eq!(saved.badge_object["name"], "Oregon Badge Alliance");
    }

    #[tokio::test]
    async fn test_save_single_write_when_id_matches() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_update_issuer().times(1).returning(|_| Ok(()));
        repo.expect_update_badge_object().never();

        let mut issuer = sample_issuer(5, "oregon");
        issuer.set_object_id("https://badges.example.org/public/issuers/oregon");

        let saved = service(repo).save(issuer).await.unwrap();
        assert_eq!(saved.full_url(ORIGIN), saved.object_id().unwrap());
    }

    #[tokio::test]
    async fn test_save_corrects_stale_id_after_origin_change() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_update_issuer().times(1).returning(|_| Ok(()));
        repo.expect_update_badge_object().times(1).returning(|_, _| Ok(()));

        let mut issuer = sample_issuer(5, "oregon");
        issuer.set_object_id("http://old-host/public/issuers/oregon");

        let saved = service(repo).save(issuer).await.unwrap();
        assert_eq!(
            saved.object_id(),
            Some("https://badges.example.org/public/issuers/oregon")
        );
    }

    #[tokio::test]
    async fn test_create_issuer_generates_unique_slug() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_list_slugs_with_prefix()
            .withf(|base, exclude| base == "oregon-badge-alliance" && exclude.is_none())
            .returning(|_, _| Ok(vec!["oregon-badge-alliance".to_string()]));
        repo.expect_insert_issuer()
            .withf(|new| new.slug == "oregon-badge-alliance-2" && new.owner_id == 9)
            .returning(|new| {
                let mut issuer = sample_issuer(11, &new.slug);
                issuer.owner_id = new.owner_id;
                issuer.badge_object = new.badge_object.clone();
                Ok(issuer)
            });
        repo.expect_update_badge_object().times(1).returning(|_, _| Ok(()));

        let req = CreateIssuerRequest {
            user_id: 9,
            name: "Oregon Badge Alliance".to_string(),
            slug: None,
            owner_id: None,
            image: None,
            badge_object: Some(json!({"name": "Oregon Badge Alliance"})),
        };
        let issuer = service(repo).create_issuer(req).await.unwrap();
        assert_eq!(issuer.slug, "oregon-badge-alliance-2");
        assert_eq!(
            issuer.object_id(),
            Some("https://badges.example.org/public/issuers/oregon-badge-alliance-2")
        );
    }

    #[tokio::test]
    async fn test_delete_protected_by_badge_classes() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_get_issuer_by_slug()
            .returning(|slug| Ok(Some(sample_issuer(5, slug))));
        repo.expect_count_badge_classes().with(eq(5)).returning(|_| Ok(2));
        repo.expect_delete_issuer().never();

        let err = service(repo).delete_issuer("oregon", 1).await.unwrap_err();
        assert!(matches!(err, IssuerError::ProtectedReference(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_get_issuer_by_slug()
            .returning(|slug| Ok(Some(sample_issuer(5, slug))));

        let err = service(repo).delete_issuer("oregon", 42).await.unwrap_err();
        assert!(matches!(err, IssuerError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_issuer_not_found() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_get_issuer_by_slug().returning(|_| Ok(None));

        let err = service(repo).delete_issuer("missing", 1).await.unwrap_err();
        assert!(matches!(err, IssuerError::IssuerNotFound(slug) if slug == "missing"));
    }

    #[tokio::test]
    async fn test_permissions() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_is_member().returning(|_, role, user_id| {
            Ok(matches!(
                (role, user_id),
                (IssuerRole::Editor, 2) | (IssuerRole::Staff, 3)
            ))
        });

        let svc = service(repo);
        let issuer = sample_issuer(5, "oregon");

        // owner_id = 1
        assert!(svc.can_edit(&issuer, 1).await.unwrap());
        assert!(svc.can_edit(&issuer, 2).await.unwrap());
        assert!(!svc.can_edit(&issuer, 3).await.unwrap());

        assert!(svc.can_issue(&issuer, 2).await.unwrap());
        assert!(svc.can_issue(&issuer, 3).await.unwrap());
        assert!(!svc.can_issue(&issuer, 4).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_member_requires_edit() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_get_issuer_by_slug()
            .returning(|slug| Ok(Some(sample_issuer(5, slug))));
        repo.expect_is_member().returning(|_, _, _| Ok(false));
        repo.expect_add_member().never();

        let err = service(repo)
            .add_member("oregon", IssuerRole::Staff, 8, 9)
            .await
            .unwrap_err();
        assert!(matches!(err, IssuerError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_issuer_renames_slug() {
        let mut repo = MockIssuerRepositoryTrait::new();
        repo.expect_get_issuer_by_slug()
            .returning(|slug| Ok(Some(sample_issuer(5, slug))));
        repo.expect_list_slugs_with_prefix()
            .withf(|base, exclude| base == "oba" && *exclude == Some(5))
            .returning(|_, _| Ok(vec![]));
        repo.expect_update_issuer()
            .withf(|issuer| issuer.slug == "oba" && issuer.name == "OBA")
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_update_badge_object().times(1).returning(|_, _| Ok(()));

        let req = UpdateIssuerRequest {
            user_id: 1,
            name: Some("OBA".to_string()),
            slug: Some("OBA".to_string()),
            image: None,
            badge_object: None,
        };
        let issuer = service(repo).update_issuer("oregon", req).await.unwrap();
        assert_eq!(issuer.slug, "oba");
        assert_eq!(
            issuer.object_id(),
            Some("https://badges.example.org/public/issuers/oba")
        );
    }
}

//! 徽章类服务
//!
//! 徽章类属于颁发者，只有颁发者的所有者或编辑可以创建、修改和删除。
//! 获得条件按内容是否像 URL 写入 `criteria_url` 或 `criteria_text`，两者互斥。

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use badge_shared::observability::metrics;

use super::issuer_service::can_edit;
use super::model_cache::{ModelCache, cache_keys, cache_ttl};
use crate::dto::{CreateBadgeClassRequest, UpdateBadgeClassRequest};
use crate::error::{IssuerError, Result};
use crate::models::badge_class::CRITERIA_URL_MAX_LENGTH;
use crate::models::{Issuer, IssuerBadgeClass, NewBadgeClass};
use crate::repository::{BadgeClassRepositoryTrait, IssuerRepositoryTrait};
use crate::utils::{is_probable_url, slug_base, unique_slug};

/// 徽章类 slug 为空时的回退值
const BADGE_CLASS_SLUG_FALLBACK: &str = "badge";

/// URL 形式的获得条件写入 `criteria_url`，不能超过列长度
fn check_criteria(criteria: Option<&str>) -> Result<()> {
    match criteria {
        Some(value) if is_probable_url(value) && value.chars().count() > CRITERIA_URL_MAX_LENGTH => {
            Err(IssuerError::Validation(format!(
                "获得条件 URL 不能超过{}个字符",
                CRITERIA_URL_MAX_LENGTH
            )))
        }
        _ => Ok(()),
    }
}

/// 徽章类服务
pub struct BadgeClassService<IR, BR>
where
    IR: IssuerRepositoryTrait,
    BR: BadgeClassRepositoryTrait,
{
    issuer_repo: Arc<IR>,
    badge_class_repo: Arc<BR>,
    cache: ModelCache,
}

impl<IR, BR> BadgeClassService<IR, BR>
where
    IR: IssuerRepositoryTrait,
    BR: BadgeClassRepositoryTrait,
{
    pub fn new(issuer_repo: Arc<IR>, badge_class_repo: Arc<BR>, cache: ModelCache) -> Self {
        Self {
            issuer_repo,
            badge_class_repo,
            cache,
        }
    }

    /// 在颁发者下创建徽章类
    #[instrument(skip(self, req), fields(issuer = %issuer_slug, user_id = req.user_id))]
    pub async fn create_badge_class(
        &self,
        issuer_slug: &str,
        req: CreateBadgeClassRequest,
    ) -> Result<IssuerBadgeClass> {
        check_criteria(req.criteria.as_deref())?;
        let issuer = self.require_issuer_by_slug(issuer_slug).await?;
        self.require_edit(&issuer, req.user_id).await?;

        let source = req.slug.as_deref().unwrap_or(&req.name);
        let slug = self.allocate_slug(source, None).await?;

        let new_badge_class = NewBadgeClass {
            issuer_id: issuer.id,
            name: req.name,
            slug,
            criteria_text: None,
            criteria_url: None,
            image: req.image,
            created_by: Some(req.user_id),
            badge_object: req.badge_object.unwrap_or_else(|| Value::Object(Default::default())),
        }
        .with_criteria(req.criteria);

        let badge_class = self
            .badge_class_repo
            .insert_badge_class(&new_badge_class)
            .await?;

        metrics::record_badge_object_created("badge_class");
        info!(
            badge_class_id = badge_class.id,
            issuer_id = issuer.id,
            slug = %badge_class.slug,
            "Badge class created"
        );
        Ok(badge_class)
    }

    /// 更新徽章类
    #[instrument(skip(self, req), fields(slug = %slug, user_id = req.user_id))]
    pub async fn update_badge_class(
        &self,
        slug: &str,
        req: UpdateBadgeClassRequest,
    ) -> Result<IssuerBadgeClass> {
        check_criteria(req.criteria.as_deref())?;
        let mut badge_class = self.require_badge_class(slug).await?;
        let issuer = self.issuer_of(&badge_class).await?;
        self.require_edit(&issuer, req.user_id).await?;

        let old_slug = badge_class.slug.clone();
        if let Some(name) = req.name {
            badge_class.name = name;
        }
        if let Some(new_slug) = req.slug {
            if new_slug != badge_class.slug {
                badge_class.slug = self.allocate_slug(&new_slug, Some(badge_class.id)).await?;
            }
        }
        match req.criteria {
            Some(criteria) if criteria.is_empty() => badge_class.clear_criteria(),
            Some(criteria) => badge_class.set_criteria(criteria),
            None => {}
        }
        if let Some(image) = req.image {
            badge_class.image = Some(image).filter(|s| !s.is_empty());
        }
        if let Some(badge_object) = req.badge_object {
            badge_class.badge_object = badge_object;
        }

        self.badge_class_repo.update_badge_class(&badge_class).await?;
        self.cache.invalidate(&cache_keys::badge_class(&old_slug)).await;
        if badge_class.slug != old_slug {
            self.cache
                .invalidate(&cache_keys::badge_class(&badge_class.slug))
                .await;
        }

        info!(badge_class_id = badge_class.id, slug = %badge_class.slug, "Badge class updated");
        Ok(badge_class)
    }

    /// 按 slug 获取徽章类（缓存优先）
    pub async fn get_badge_class_by_slug(&self, slug: &str) -> Result<Option<IssuerBadgeClass>> {
        let repo = self.badge_class_repo.clone();
        let slug_owned = slug.to_string();
        self.cache
            .get_or_fetch(
                &cache_keys::badge_class(slug),
                cache_ttl::BADGE_CLASS,
                || async move { repo.get_badge_class_by_slug(&slug_owned).await },
            )
            .await
    }

    pub async fn require_badge_class(&self, slug: &str) -> Result<IssuerBadgeClass> {
        self.get_badge_class_by_slug(slug)
            .await?
            .ok_or_else(|| IssuerError::BadgeClassNotFound(slug.to_string()))
    }

    /// 列出颁发者下的徽章类
    pub async fn list_for_issuer(&self, issuer_slug: &str) -> Result<Vec<IssuerBadgeClass>> {
        let issuer = self.require_issuer_by_slug(issuer_slug).await?;
        self.badge_class_repo.list_by_issuer(issuer.id).await
    }

    /// 徽章类的所有者，即所属颁发者的所有者
    pub async fn owner_of(&self, badge_class: &IssuerBadgeClass) -> Result<i64> {
        Ok(self.issuer_of(badge_class).await?.owner_id)
    }

    /// 删除徽章类，仍有断言时拒绝
    #[instrument(skip(self))]
    pub async fn delete_badge_class(&self, slug: &str, user_id: i64) -> Result<()> {
        let badge_class = self.require_badge_class(slug).await?;
        let issuer = self.issuer_of(&badge_class).await?;
        self.require_edit(&issuer, user_id).await?;

        let assertions = self.badge_class_repo.count_assertions(badge_class.id).await?;
        if assertions > 0 {
            return Err(IssuerError::ProtectedReference(format!(
                "徽章类 {} 已颁发 {} 个断言",
                badge_class.slug, assertions
            )));
        }

        self.badge_class_repo.delete_badge_class(badge_class.id).await?;
        self.cache
            .invalidate(&cache_keys::badge_class(&badge_class.slug))
            .await;
        info!(badge_class_id = badge_class.id, slug = %badge_class.slug, "Badge class deleted");
        Ok(())
    }

    async fn issuer_of(&self, badge_class: &IssuerBadgeClass) -> Result<Issuer> {
        self.issuer_repo
            .get_issuer(badge_class.issuer_id)
            .await?
            .ok_or_else(|| IssuerError::IssuerNotFound(badge_class.issuer_id.to_string()))
    }

    async fn require_issuer_by_slug(&self, slug: &str) -> Result<Issuer> {
        let repo = self.issuer_repo.clone();
        let slug_owned = slug.to_string();
        self.cache
            .get_or_fetch(&cache_keys::issuer(slug), cache_ttl::ISSUER, || async move {
                repo.get_issuer_by_slug(&slug_owned).await
            })
            .await?
            .ok_or_else(|| IssuerError::IssuerNotFound(slug.to_string()))
    }

    async fn require_edit(&self, issuer: &Issuer, user_id: i64) -> Result<()> {
        if can_edit(self.issuer_repo.as_ref(), issuer, user_id).await? {
            Ok(())
        } else {
            Err(IssuerError::Forbidden(format!(
                "用户 {} 不能管理颁发者 {} 的徽章类",
                user_id, issuer.slug
            )))
        }
    }

    async fn allocate_slug(&self, source: &str, exclude_id: Option<i64>) -> Result<String> {
        let base = slug_base(source, BADGE_CLASS_SLUG_FALLBACK);
        let taken = self
            .badge_class_repo
            .list_slugs_with_prefix(&base, exclude_id)
            .await?;
        Ok(unique_slug(&base, BADGE_CLASS_SLUG_FALLBACK, &taken))
    }
}

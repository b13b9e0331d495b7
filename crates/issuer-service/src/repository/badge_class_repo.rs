//! 徽章类仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::slug_prefix_pattern;
use super::traits::BadgeClassRepositoryTrait;
use crate::error::Result;
use crate::models::{IssuerBadgeClass, NewBadgeClass};

/// 徽章类仓储
pub struct BadgeClassRepository {
    pool: PgPool,
}

impl BadgeClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_badge_class(&self, id: i64) -> Result<Option<IssuerBadgeClass>> {
        let badge_class = sqlx::query_as::<_, IssuerBadgeClass>(
            r#"
            SELECT id, created_at, created_by, badge_object, issuer_id, name, slug,
                   criteria_text, criteria_url, image
            FROM issuer_badge_classes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge_class)
    }

    pub async fn get_badge_class_by_slug(&self, slug: &str) -> Result<Option<IssuerBadgeClass>> {
        let badge_class = sqlx::query_as::<_, IssuerBadgeClass>(
            r#"
            SELECT id, created_at, created_by, badge_object, issuer_id, name, slug,
                   criteria_text, criteria_url, image
            FROM issuer_badge_classes
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge_class)
    }

    /// 按颁发者列出徽章类
    pub async fn list_by_issuer(&self, issuer_id: i64) -> Result<Vec<IssuerBadgeClass>> {
        let badge_classes = sqlx::query_as::<_, IssuerBadgeClass>(
            r#"
            SELECT id, created_at, created_by, badge_object, issuer_id, name, slug,
                   criteria_text, criteria_url, image
            FROM issuer_badge_classes
            WHERE issuer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(issuer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(badge_classes)
    }

    pub async fn list_slugs_with_prefix(
        &self,
        base: &str,
        exclude_id: Option<i64>,
    ) -> Result<Vec<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT slug
            FROM issuer_badge_classes
            WHERE (slug = $1 OR slug LIKE $2)
              AND ($3::BIGINT IS NULL OR id <> $3)
            "#,
        )
        .bind(base)
        .bind(slug_prefix_pattern(base))
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    pub async fn insert_badge_class(&self, badge_class: &NewBadgeClass) -> Result<IssuerBadgeClass> {
        let created = sqlx::query_as::<_, IssuerBadgeClass>(
            r#"
            INSERT INTO issuer_badge_classes
                (created_by, badge_object, issuer_id, name, slug, criteria_text, criteria_url, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at, created_by, badge_object, issuer_id, name, slug,
                      criteria_text, criteria_url, image
            "#,
        )
        .bind(badge_class.created_by)
        .bind(&badge_class.badge_object)
        .bind(badge_class.issuer_id)
        .bind(&badge_class.name)
        .bind(&badge_class.slug)
        .bind(&badge_class.criteria_text)
        .bind(&badge_class.criteria_url)
        .bind(&badge_class.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn update_badge_class(&self, badge_class: &IssuerBadgeClass) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE issuer_badge_classes
            SET created_by = $2, badge_object = $3, issuer_id = $4, name = $5, slug = $6,
                criteria_text = $7, criteria_url = $8, image = $9
            WHERE id = $1
            "#,
        )
        .bind(badge_class.id)
        .bind(badge_class.created_by)
        .bind(&badge_class.badge_object)
        .bind(badge_class.issuer_id)
        .bind(&badge_class.name)
        .bind(&badge_class.slug)
        .bind(&badge_class.criteria_text)
        .bind(&badge_class.criteria_url)
        .bind(&badge_class.image)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_badge_class(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM issuer_badge_classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 徽章类下的断言数量
    pub async fn count_assertions(&self, badge_class_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM issuer_assertions WHERE badge_class_id = $1",
        )
        .bind(badge_class_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl BadgeClassRepositoryTrait for BadgeClassRepository {
    async fn get_badge_class(&self, id: i64) -> Result<Option<IssuerBadgeClass>> {
        self.get_badge_class(id).await
    }

    async fn get_badge_class_by_slug(&self, slug: &str) -> Result<Option<IssuerBadgeClass>> {
        self.get_badge_class_by_slug(slug).await
    }

    async fn list_by_issuer(&self, issuer_id: i64) -> Result<Vec<IssuerBadgeClass>> {
        self.list_by_issuer(issuer_id).await
    }

    async fn list_slugs_with_prefix(
        &self,
        base: &str,
        exclude_id: Option<i64>,
    ) -> Result<Vec<String>> {
        self.list_slugs_with_prefix(base, exclude_id).await
    }

    async fn insert_badge_class(&self, badge_class: &NewBadgeClass) -> Result<IssuerBadgeClass> {
        self.insert_badge_class(badge_class).await
    }

    async fn update_badge_class(&self, badge_class: &IssuerBadgeClass) -> Result<()> {
        self.update_badge_class(badge_class).await
    }

    async fn delete_badge_class(&self, id: i64) -> Result<()> {
        self.delete_badge_class(id).await
    }

    async fn count_assertions(&self, badge_class_id: i64) -> Result<i64> {
        self.count_assertions(badge_class_id).await
    }
}

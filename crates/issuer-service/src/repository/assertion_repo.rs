//! 徽章断言仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::AssertionRepositoryTrait;
use crate::error::Result;
use crate::models::{IssuerAssertion, NewAssertion};

/// 徽章断言仓储
pub struct AssertionRepository {
    pool: PgPool,
}

impl AssertionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_assertion(&self, id: i64) -> Result<Option<IssuerAssertion>> {
        let assertion = sqlx::query_as::<_, IssuerAssertion>(
            r#"
            SELECT id, created_at, created_by, badge_object, badge_class_id, issuer_id, slug
            FROM issuer_assertions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assertion)
    }

    pub async fn get_assertion_by_slug(&self, slug: &str) -> Result<Option<IssuerAssertion>> {
        let assertion = sqlx::query_as::<_, IssuerAssertion>(
            r#"
            SELECT id, created_at, created_by, badge_object, badge_class_id, issuer_id, slug
            FROM issuer_assertions
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assertion)
    }

    /// 按徽章类列出断言
    pub async fn list_by_badge_class(&self, badge_class_id: i64) -> Result<Vec<IssuerAssertion>> {
        let assertions = sqlx::query_as::<_, IssuerAssertion>(
            r#"
            SELECT id, created_at, created_by, badge_object, badge_class_id, issuer_id, slug
            FROM issuer_assertions
            WHERE badge_class_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(badge_class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assertions)
    }

    pub async fn insert_assertion(&self, assertion: &NewAssertion) -> Result<IssuerAssertion> {
        let created = sqlx::query_as::<_, IssuerAssertion>(
            r#"
            INSERT INTO issuer_assertions (created_by, badge_object, badge_class_id, issuer_id, slug)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at, created_by, badge_object, badge_class_id, issuer_id, slug
            "#,
        )
        .bind(assertion.created_by)
        .bind(&assertion.badge_object)
        .bind(assertion.badge_class_id)
        .bind(assertion.issuer_id)
        .bind(&assertion.slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn delete_assertion(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM issuer_assertions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl AssertionRepositoryTrait for AssertionRepository {
    async fn get_assertion(&self, id: i64) -> Result<Option<IssuerAssertion>> {
        self.get_assertion(id).await
    }

    async fn get_assertion_by_slug(&self, slug: &str) -> Result<Option<IssuerAssertion>> {
        self.get_assertion_by_slug(slug).await
    }

    async fn list_by_badge_class(&self, badge_class_id: i64) -> Result<Vec<IssuerAssertion>> {
        self.list_by_badge_class(badge_class_id).await
    }

    async fn insert_assertion(&self, assertion: &NewAssertion) -> Result<IssuerAssertion> {
        self.insert_assertion(assertion).await
    }

    async fn delete_assertion(&self, id: i64) -> Result<()> {
        self.delete_assertion(id).await
    }
}

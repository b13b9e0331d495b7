//! 颁发者仓储
//!
//! 颁发者及其编辑、员工成员表的数据访问

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::slug_prefix_pattern;
use super::traits::IssuerRepositoryTrait;
use crate::error::Result;
use crate::models::{Issuer, IssuerRole, NewIssuer};

/// 颁发者仓储
pub struct IssuerRepository {
    pool: PgPool,
}

impl IssuerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 颁发者 ====================

    /// 按 ID 获取颁发者
    pub async fn get_issuer(&self, id: i64) -> Result<Option<Issuer>> {
        let issuer = sqlx::query_as::<_, Issuer>(
            r#"
            SELECT id, created_at, created_by, badge_object, name, slug, owner_id, image
            FROM issuers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(issuer)
    }

    /// 按 slug 获取颁发者
    pub async fn get_issuer_by_slug(&self, slug: &str) -> Result<Option<Issuer>> {
        let issuer = sqlx::query_as::<_, Issuer>(
            r#"
            SELECT id, created_at, created_by, badge_object, name, slug, owner_id, image
            FROM issuers
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(issuer)
    }

    /// 列出与 `base` 冲突的已有 slug
    pub async fn list_slugs_with_prefix(
        &self,
        base: &str,
        exclude_id: Option<i64>,
    ) -> Result<Vec<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT slug
            FROM issuers
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

    /// 插入颁发者
    pub async fn insert_issuer(&self, issuer: &NewIssuer) -> Result<Issuer> {
        let created = sqlx::query_as::<_, Issuer>(
            r#"
            INSERT INTO issuers (created_by, badge_object, name, slug, owner_id, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at, created_by, badge_object, name, slug, owner_id, image
            "#,
        )
        .bind(issuer.created_by)
        .bind(&issuer.badge_object)
        .bind(&issuer.name)
        .bind(&issuer.slug)
        .bind(issuer.owner_id)
        .bind(&issuer.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// 更新颁发者整行
    pub async fn update_issuer(&self, issuer: &Issuer) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE issuers
            SET created_by = $2, badge_object = $3, name = $4, slug = $5,
                owner_id = $6, image = $7
            WHERE id = $1
            "#,
        )
        .bind(issuer.id)
        .bind(issuer.created_by)
        .bind(&issuer.badge_object)
        .bind(&issuer.name)
        .bind(&issuer.slug)
        .bind(issuer.owner_id)
        .bind(&issuer.image)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 只更新 badge_object
    pub async fn update_badge_object(&self, id: i64, badge_object: &Value) -> Result<()> {
        sqlx::query("UPDATE issuers SET badge_object = $2 WHERE id = $1")
            .bind(id)
            .bind(badge_object)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 删除颁发者，成员记录随外键级联删除
    pub async fn delete_issuer(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM issuers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 颁发者下的徽章类数量
    pub async fn count_badge_classes(&self, issuer_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM issuer_badge_classes WHERE issuer_id = $1",
        )
        .bind(issuer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // ==================== 成员 ====================

    /// 添加成员，已存在时忽略
    pub async fn add_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (issuer_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            role.table_name()
        );
        sqlx::query(&sql)
            .bind(issuer_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 移除成员
    pub async fn remove_member(
        &self,
        issuer_id: i64,
        role: IssuerRole,
        user_id: i64,
    ) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE issuer_id = $1 AND user_id = $2",
            role.table_name()
        );
        sqlx::query(&sql)
            .bind(issuer_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 列出成员用户 ID
    pub async fn list_members(&self, issuer_id: i64, role: IssuerRole) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT user_id FROM {} WHERE issuer_id = $1 ORDER BY user_id ASC",
            role.table_name()
        );
        let members = sqlx::query_scalar::<_, i64>(&sql)
            .bind(issuer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(members)
    }

    /// 用户是否为指定角色的成员
    pub async fn is_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE issuer_id = $1 AND user_id = $2)",
            role.table_name()
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(issuer_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}

#[async_trait]
impl IssuerRepositoryTrait for IssuerRepository {
    async fn get_issuer(&self, id: i64) -> Result<Option<Issuer>> {
        self.get_issuer(id).await
    }

    async fn get_issuer_by_slug(&self, slug: &str) -> Result<Option<Issuer>> {
        self.get_issuer_by_slug(slug).await
    }

    async fn list_slugs_with_prefix(
        &self,
        base: &str,
        exclude_id: Option<i64>,
    ) -> Result<Vec<String>> {
        self.list_slugs_with_prefix(base, exclude_id).await
    }

    async fn insert_issuer(&self, issuer: &NewIssuer) -> Result<Issuer> {
        self.insert_issuer(issuer).await
    }

    async fn update_issuer(&self, issuer: &Issuer) -> Result<()> {
        self.update_issuer(issuer).await
    }

    async fn update_badge_object(&self, id: i64, badge_object: &Value) -> Result<()> {
        self.update_badge_object(id, badge_object).await
    }

    async fn delete_issuer(&self, id: i64) -> Result<()> {
        self.delete_issuer(id).await
    }

    async fn count_badge_classes(&self, issuer_id: i64) -> Result<i64> {
        self.count_badge_classes(issuer_id).await
    }

    async fn add_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<()> {
        self.add_member(issuer_id, role, user_id).await
    }

    async fn remove_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<()> {
        self.remove_member(issuer_id, role, user_id).await
    }

    async fn list_members(&self, issuer_id: i64, role: IssuerRole) -> Result<Vec<i64>> {
        self.list_members(issuer_id, role).await
    }

    async fn is_member(&self, issuer_id: i64, role: IssuerRole, user_id: i64) -> Result<bool> {
        self.is_member(issuer_id, role, user_id).await
    }
}

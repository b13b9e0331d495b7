//! Open Badge 仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::OpenBadgeRepositoryTrait;
use crate::error::Result;
use crate::models::{NewOpenBadge, OpenBadge};

/// Open Badge 仓储
pub struct OpenBadgeRepository {
    pool: PgPool,
}

impl OpenBadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpenBadgeRepositoryTrait for OpenBadgeRepository {
    async fn get_open_badge(&self, id: i64) -> Result<Option<OpenBadge>> {
        let open_badge = sqlx::query_as::<_, OpenBadge>(
            r#"
            SELECT id, created_at, recipient_input, image, full_ld
            FROM open_badges
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(open_badge)
    }

    async fn insert_open_badge(&self, open_badge: &NewOpenBadge) -> Result<OpenBadge> {
        let created = sqlx::query_as::<_, OpenBadge>(
            r#"
            INSERT INTO open_badges (recipient_input, image, full_ld)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, recipient_input, image, full_ld
            "#,
        )
        .bind(&open_badge.recipient_input)
        .bind(&open_badge.image)
        .bind(&open_badge.full_ld)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}

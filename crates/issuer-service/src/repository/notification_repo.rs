//! 获得者通知仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::EarnerNotificationRepositoryTrait;
use crate::error::Result;
use crate::models::{EarnerNotification, NewEarnerNotification};

/// 获得者通知仓储
pub struct EarnerNotificationRepository {
    pool: PgPool,
}

impl EarnerNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EarnerNotificationRepositoryTrait for EarnerNotificationRepository {
    async fn get_notification(&self, id: i64) -> Result<Option<EarnerNotification>> {
        let notification = sqlx::query_as::<_, EarnerNotification>(
            r#"
            SELECT id, created_at, updated_at, url, email, badge_id
            FROM earner_notifications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn find_by_url(&self, url: &str, limit: i64) -> Result<Vec<EarnerNotification>> {
        let notifications = sqlx::query_as::<_, EarnerNotification>(
            r#"
            SELECT id, created_at, updated_at, url, email, badge_id
            FROM earner_notifications
            WHERE url = $1
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(url)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn insert_notification(
        &self,
        notification: &NewEarnerNotification,
    ) -> Result<EarnerNotification> {
        let created = sqlx::query_as::<_, EarnerNotification>(
            r#"
            INSERT INTO earner_notifications (url, email, badge_id)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, updated_at, url, email, badge_id
            "#,
        )
        .bind(&notification.url)
        .bind(&notification.email)
        .bind(notification.badge_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}

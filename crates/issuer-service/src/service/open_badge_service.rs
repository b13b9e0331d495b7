//! Open Badge 导入服务

use std::sync::Arc;

use tracing::{info, instrument};

use crate::dto::ImportOpenBadgeRequest;
use crate::error::{IssuerError, Result};
use crate::models::{LdScope, NewOpenBadge, OpenBadge};
use crate::repository::OpenBadgeRepositoryTrait;

/// Open Badge 服务
pub struct OpenBadgeService<OR>
where
    OR: OpenBadgeRepositoryTrait,
{
    open_badge_repo: Arc<OR>,
}

impl<OR> OpenBadgeService<OR>
where
    OR: OpenBadgeRepositoryTrait,
{
    pub fn new(open_badge_repo: Arc<OR>) -> Self {
        Self { open_badge_repo }
    }

    /// 导入 Open Badge 文档
    ///
    /// 文档必须是包含 `assertion`、`badgeclass`、`issuer` 三个对象的 JSON
    #[instrument(skip(self, req))]
    pub async fn import(&self, req: ImportOpenBadgeRequest) -> Result<OpenBadge> {
        for scope in [LdScope::Assertion, LdScope::BadgeClass, LdScope::Issuer] {
            if !req.full_ld.get(scope.key()).is_some_and(|v| v.is_object()) {
                return Err(IssuerError::Validation(format!(
                    "fullLd 缺少对象字段 {}",
                    scope.key()
                )));
            }
        }

        let open_badge = self
            .open_badge_repo
            .insert_open_badge(&NewOpenBadge {
                recipient_input: req.recipient_input,
                image: req.image,
                full_ld: req.full_ld,
            })
            .await?;

        info!(open_badge_id = open_badge.id, "Open Badge imported");
        Ok(open_badge)
    }

    pub async fn get(&self, id: i64) -> Result<OpenBadge> {
        self.open_badge_repo
            .get_open_badge(id)
            .await?
            .ok_or(IssuerError::OpenBadgeNotFound(id))
    }
}

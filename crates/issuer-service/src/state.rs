//! 应用状态定义
//!
//! 各服务以 PostgreSQL 仓储实例化，通过 Arc 在 handler 间共享

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use badge_shared::cache::Cache;
use badge_shared::config::{AppConfig, SiteConfig};

use crate::notification::{MailTransport, TemplateEngine};
use crate::repository::{
    AssertionRepository, BadgeClassRepository, EarnerNotificationRepository, IssuerRepository,
    OpenBadgeRepository,
};
use crate::service::{
    AssertionService, BadgeClassService, EarnerNotificationService, IssuerService, ModelCache,
    OpenBadgeService,
};

pub type PgIssuerService = IssuerService<IssuerRepository>;
pub type PgBadgeClassService = BadgeClassService<IssuerRepository, BadgeClassRepository>;
pub type PgAssertionService =
    AssertionService<IssuerRepository, BadgeClassRepository, AssertionRepository>;
pub type PgOpenBadgeService = OpenBadgeService<OpenBadgeRepository>;
pub type PgNotificationService =
    EarnerNotificationService<EarnerNotificationRepository, OpenBadgeRepository>;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub issuer_service: Arc<PgIssuerService>,
    pub badge_class_service: Arc<PgBadgeClassService>,
    pub assertion_service: Arc<PgAssertionService>,
    pub open_badge_service: Arc<PgOpenBadgeService>,
    pub notification_service: Arc<PgNotificationService>,
    pub site: SiteConfig,
}

impl AppState {
    /// 创建应用状态
    ///
    /// `cache` 为 None 时按 slug 的查询直接读库
    pub fn new(
        pool: PgPool,
        cache: Option<Arc<Cache>>,
        config: &AppConfig,
        transport: Arc<dyn MailTransport>,
        templates: TemplateEngine,
    ) -> Self {
        let model_cache = ModelCache::new(cache);
        info!(cache_enabled = model_cache.is_enabled(), "Building issuer services");

        let issuer_repo = Arc::new(IssuerRepository::new(pool.clone()));
        let badge_class_repo = Arc::new(BadgeClassRepository::new(pool.clone()));
        let assertion_repo = Arc::new(AssertionRepository::new(pool.clone()));
        let open_badge_repo = Arc::new(OpenBadgeRepository::new(pool.clone()));
        let notification_repo = Arc::new(EarnerNotificationRepository::new(pool));

        let issuer_service = Arc::new(IssuerService::new(
            issuer_repo.clone(),
            config.site.clone(),
            model_cache.clone(),
        ));
        let badge_class_service = Arc::new(BadgeClassService::new(
            issuer_repo.clone(),
            badge_class_repo.clone(),
            model_cache.clone(),
        ));
        let assertion_service = Arc::new(AssertionService::new(
            issuer_repo,
            badge_class_repo,
            assertion_repo,
            model_cache,
        ));
        let open_badge_service = Arc::new(OpenBadgeService::new(open_badge_repo.clone()));
        let notification_service = Arc::new(EarnerNotificationService::new(
            notification_repo,
            open_badge_repo,
            transport,
            Arc::new(templates),
            config.site.clone(),
            config.mail.clone(),
        ));

        Self {
            issuer_service,
            badge_class_service,
            assertion_service,
            open_badge_service,
            notification_service,
            site: config.site.clone(),
        }
    }
}

//! 获得者通知服务
//!
//! 提交通知的流程：去重 → 入库 → 发送邮件。
//!
//! 发送邮件是固定的线性步骤，不重试：
//! 1. 从关联的 Open Badge 文档读取徽章名、描述、颁发者名称与地址、烘焙图片地址
//! 2. 渲染纯文本和 HTML 两份模板
//! 3. 交给邮件后端发送，`fail_silently = false`，后端错误原样返回

use std::sync::Arc;

use tracing::{info, instrument, warn};

use badge_shared::config::{MailConfig, SiteConfig};
use badge_shared::observability::metrics;

use crate::dto::CreateNotificationRequest;
use crate::error::{IssuerError, Result};
use crate::models::{BadgeDocument, EarnerNotification, NewEarnerNotification};
use crate::notification::{
    MailMessage, MailTransport, NOTIFY_EARNER_HTML, NOTIFY_EARNER_TEXT, TemplateContext,
    TemplateEngine,
};
use crate::repository::{EarnerNotificationRepositoryTrait, OpenBadgeRepositoryTrait};

/// 模板变量与 Open Badge 文档属性的对应关系
const EMAIL_LD_FIELDS: [(&str, &str); 4] = [
    ("badge_name", "bc.name"),
    ("badge_description", "bc.description"),
    ("issuer_name", "iss.name"),
    ("issuer_url", "iss.url"),
];

/// 获得者通知服务
pub struct EarnerNotificationService<NR, OR>
where
    NR: EarnerNotificationRepositoryTrait,
    OR: OpenBadgeRepositoryTrait,
{
    notification_repo: Arc<NR>,
    open_badge_repo: Arc<OR>,
    transport: Arc<dyn MailTransport>,
    templates: Arc<TemplateEngine>,
    site: SiteConfig,
    mail: MailConfig,
}

impl<NR, OR> EarnerNotificationService<NR, OR>
where
    NR: EarnerNotificationRepositoryTrait,
    OR: OpenBadgeRepositoryTrait,
{
    pub fn new(
        notification_repo: Arc<NR>,
        open_badge_repo: Arc<OR>,
        transport: Arc<dyn MailTransport>,
        templates: Arc<TemplateEngine>,
        site: SiteConfig,
        mail: MailConfig,
    ) -> Self {
        Self {
            notification_repo,
            open_badge_repo,
            transport,
            templates,
            site,
            mail,
        }
    }

    /// 是否已存在针对该断言 URL 的通知
    ///
    /// 只有恰好一条记录时返回 true，没有或多条都返回 false
    pub async fn detect_existing(&self, url: &str) -> Result<bool> {
        let matches = self.notification_repo.find_by_url(url, 2).await?;
        Ok(matches.len() == 1)
    }

    /// 提交获得者通知
    #[instrument(skip(self, req), fields(url = %req.url, badge_id = req.badge_id))]
    pub async fn notify_earner(&self, req: CreateNotificationRequest) -> Result<EarnerNotification> {
        if self.detect_existing(&req.url).await? {
            return Err(IssuerError::AlreadyNotified(req.url));
        }

        // 先确认 Open Badge 存在，避免写入无法发送的通知
        if self.open_badge_repo.get_open_badge(req.badge_id).await?.is_none() {
            return Err(IssuerError::OpenBadgeNotFound(req.badge_id));
        }

        let notification = self
            .notification_repo
            .insert_notification(&NewEarnerNotification {
                url: req.url,
                email: req.email,
                badge_id: Some(req.badge_id),
            })
            .await?;
        info!(notification_id = notification.id, "Earner notification stored");

        self.send_email(&notification).await?;
        Ok(notification)
    }

    /// 重新发送已有通知的邮件
    pub async fn resend(&self, notification_id: i64) -> Result<EarnerNotification> {
        let notification = self
            .notification_repo
            .get_notification(notification_id)
            .await?
            .ok_or(IssuerError::NotificationNotFound(notification_id))?;

        self.send_email(&notification).await?;
        Ok(notification)
    }

    /// 按通知记录发送邮件
    #[instrument(skip(self, notification), fields(notification_id = notification.id))]
    pub async fn send_email(&self, notification: &EarnerNotification) -> Result<()> {
        let badge_id = notification
            .badge_id
            .ok_or(IssuerError::NotificationWithoutBadge(notification.id))?;
        let open_badge = self
            .open_badge_repo
            .get_open_badge(badge_id)
            .await?
            .ok_or(IssuerError::OpenBadgeNotFound(badge_id))?;

        let context = self.email_context(&open_badge);
        let text = self.templates.render(NOTIFY_EARNER_TEXT, &context)?;
        let html = self.templates.render(NOTIFY_EARNER_HTML, &context)?;

        let message = MailMessage {
            subject: self.mail.subject.clone(),
            body: text,
            from: self.mail.from_address.clone(),
            to: vec![notification.email.clone()],
            fail_silently: false,
            html_message: Some(html),
        };

        match self.transport.send_mail(&message).await {
            Ok(()) => {
                metrics::record_notification_email("sent");
                info!(
                    notification_id = notification.id,
                    backend = self.transport.name(),
                    "Earner notification email sent"
                );
                Ok(())
            }
            Err(e) => {
                metrics::record_notification_email("failed");
                warn!(notification_id = notification.id, error = %e, "Earner notification email failed");
                Err(e.into())
            }
        }
    }

    /// 邮件模板变量
    fn email_context(&self, document: &impl BadgeDocument) -> TemplateContext {
        let mut context = TemplateContext::new();
        for (name, qualified) in EMAIL_LD_FIELDS {
            context.set(name, document.ld_text(qualified));
        }
        context.set(
            "image_url",
            document.baked_image_url(&self.site).unwrap_or_default(),
        );
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::earner_notification::sample_notification;
    use crate::models::open_badge::sample_open_badge;
    use crate::notification::{MailError, MockMailTransport};
    use crate::repository::{MockEarnerNotificationRepositoryTrait, MockOpenBadgeRepositoryTrait};

    type Service =
        EarnerNotificationService<MockEarnerNotificationRepositoryTrait, MockOpenBadgeRepositoryTrait>;

    fn site() -> SiteConfig {
        SiteConfig {
            http_origin: "https://badges.example.org".to_string(),
            media_url: "/media/".to_string(),
        }
    }

    fn service(
        notification_repo: MockEarnerNotificationRepositoryTrait,
        open_badge_repo: MockOpenBadgeRepositoryTrait,
        transport: MockMailTransport,
    ) -> Service {
        EarnerNotificationService::new(
            Arc::new(notification_repo),
            Arc::new(open_badge_repo),
            Arc::new(transport),
            Arc::new(TemplateEngine::with_defaults()),
            site(),
            MailConfig::default(),
        )
    }

    fn open_badge_repo() -> MockOpenBadgeRepositoryTrait {
        let mut repo = MockOpenBadgeRepositoryTrait::new();
        repo.expect_get_open_badge()
            .returning(|id| Ok(Some(sample_open_badge(id))));
        repo
    }

    fn repo_with_matches(count: usize) -> MockEarnerNotificationRepositoryTrait {
        let mut repo = MockEarnerNotificationRepositoryTrait::new();
        repo.expect_find_by_url()
            .withf(|url, limit| url == "https://issuer.example.org/assertions/1" && *limit == 2)
            .returning(move |_, _| {
                Ok((0..count as i64).map(|i| sample_notification(i + 1, Some(1))).collect())
            });
        repo
    }

    #[tokio::test]
    async fn test_detect_existing_counts() {
        for (count, expected) in [(0, false), (1, true), (2, false)] {
            let svc = service(
                repo_with_matches(count),
                MockOpenBadgeRepositoryTrait::new(),
                MockMailTransport::new(),
            );
            assert_eq!(
                svc.detect_existing("https://issuer.example.org/assertions/1")
                    .await
                    .unwrap(),
                expected,
                "matches = {count}"
            );
        }
    }

    #[tokio::test]
    async fn test_send_email_builds_message() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send_mail()
            .withf(|msg| {
                let html = msg.html_message.as_deref().unwrap_or_default();
                msg.subject == "Congratulations, you earned a badge!"
                    && msg.from == "Oregon Badge Alliance Badges <noreply@oregonbadgealliance.org>"
                    && msg.to == vec!["earner@example.org".to_string()]
                    && !msg.fail_silently
                    && msg.body.contains("Web Literacy")
                    && msg.body.contains("Oregon Badge Alliance (https://oregonbadgealliance.org)")
                    && msg
                        .body
                        .contains("https://badges.example.org/media/baked/web-literacy.png")
                    && html.contains("Understands how the web works")
            })
            .times(1)
            .returning(|_| Ok(()));
        transport.expect_name().return_const("mock");

        let svc = service(
            MockEarnerNotificationRepositoryTrait::new(),
            open_badge_repo(),
            transport,
        );
        svc.send_email(&sample_notification(1, Some(4))).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_email_propagates_transport_error() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send_mail()
            .returning(|_| Err(MailError::Rejected("550 mailbox unavailable".to_string())));

        let svc = service(
            MockEarnerNotificationRepositoryTrait::new(),
            open_badge_repo(),
            transport,
        );
        let err = svc.send_email(&sample_notification(1, Some(4))).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            MailError::Rejected("550 mailbox unavailable".to_string()).to_string()
        );
        assert!(matches!(
            err,
            IssuerError::Mail(MailError::Rejected(reason)) if reason == "550 mailbox unavailable"
        ));
    }

    #[tokio::test]
    async fn test_send_email_without_badge() {
        let mut transport = MockMailTransport::new();
        transport.expect_send_mail().never();

        let svc = service(
            MockEarnerNotificationRepositoryTrait::new(),
            MockOpenBadgeRepositoryTrait::new(),
            transport,
        );
        let err = svc.send_email(&sample_notification(9, None)).await.unwrap_err();
        assert!(matches!(err, IssuerError::NotificationWithoutBadge(9)));
    }

    #[tokio::test]
    async fn test_notify_earner_rejects_duplicate() {
        let mut repo = repo_with_matches(1);
        repo.expect_insert_notification().never();

        let svc = service(repo, MockOpenBadgeRepositoryTrait::new(), MockMailTransport::new());
        let req = CreateNotificationRequest {
            url: "https://issuer.example.org/assertions/1".to_string(),
            email: "earner@example.org".to_string(),
            badge_id: 1,
        };
        let err = svc.notify_earner(req).await.unwrap_err();
        assert!(matches!(err, IssuerError::AlreadyNotified(_)));
    }

    #[tokio::test]
    async fn test_notify_earner_stores_and_sends() {
        let mut repo = repo_with_matches(0);
        repo.expect_insert_notification()
            .withf(|new| new.badge_id == Some(1) && new.email == "earner@example.org")
            .times(1)
            .returning(|new| Ok(sample_notification(42, new.badge_id)));

        let mut transport = MockMailTransport::new();
        transport.expect_send_mail().times(1).returning(|_| Ok(()));
        transport.expect_name().return_const("mock");

        let svc = service(repo, open_badge_repo(), transport);
        let req = CreateNotificationRequest {
            url: "https://issuer.example.org/assertions/1".to_string(),
            email: "earner@example.org".to_string(),
            badge_id: 1,
        };
        let notification = svc.notify_earner(req).await.unwrap();
        assert_eq!(notification.id, 42);
    }

    #[tokio::test]
    async fn test_notify_earner_unknown_badge() {
        let mut repo = repo_with_matches(0);
        repo.expect_insert_notification().never();

        let mut open_badges = MockOpenBadgeRepositoryTrait::new();
        open_badges.expect_get_open_badge().returning(|_| Ok(None));

        let svc = service(repo, open_badges, MockMailTransport::new());
        let req = CreateNotificationRequest {
            url: "https://issuer.example.org/assertions/1".to_string(),
            email: "earner@example.org".to_string(),
            badge_id: 8,
        };
        let err = svc.notify_earner(req).await.unwrap_err();
        assert!(matches!(err, IssuerError::OpenBadgeNotFound(8)));
    }
}

//! 邮件发送
//!
//! 通过 `MailTransport` trait 抽象发送行为：
//! - `LogMailTransport`: 只记录日志，开发环境默认使用
//! - `HttpMailTransport`: 以 JSON 调用外部邮件 API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use validator::ValidateEmail;

use badge_shared::config::MailConfig;

/// 邮件发送错误
#[derive(Debug, Error)]
pub enum MailError {
    #[error("邮件服务拒绝发送: {0}")]
    Rejected(String),

    #[error("邮件服务请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("邮件后端未配置: {0}")]
    NotConfigured(String),

    #[error("无效的收件地址: {0}")]
    InvalidAddress(String),
}

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailMessage {
    pub subject: String,
    /// 纯文本正文
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
    /// 为 true 时发送失败只记录告警，不返回错误
    #[serde(skip)]
    pub fail_silently: bool,
    #[serde(rename = "html", skip_serializing_if = "Option::is_none")]
    pub html_message: Option<String>,
}

impl MailMessage {
    /// 校验收件人列表
    pub fn validate_recipients(&self) -> Result<(), MailError> {
        if self.to.is_empty() {
            return Err(MailError::InvalidAddress("收件人为空".to_string()));
        }
        match self.to.iter().find(|addr| !addr.validate_email()) {
            Some(bad) => Err(MailError::InvalidAddress(bad.clone())),
            None => Ok(()),
        }
    }
}

/// 邮件发送 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// 发送邮件，`fail_silently` 为 true 时失败返回 Ok
    async fn send_mail(&self, message: &MailMessage) -> Result<(), MailError>;

    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 按 `fail_silently` 处理发送结果
fn settle(message: &MailMessage, backend: &str, result: Result<(), MailError>) -> Result<(), MailError> {
    match result {
        Err(e) if message.fail_silently => {
            warn!(backend, to = ?message.to, error = %e, "邮件发送失败，已按 fail_silently 忽略");
            Ok(())
        }
        other => other,
    }
}

/// 日志邮件后端
///
/// 不真正投递，只把邮件内容写入日志
#[derive(Debug, Default, Clone)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send_mail(&self, message: &MailMessage) -> Result<(), MailError> {
        let result = message.validate_recipients().map(|_| {
            info!(
                backend = "log",
                from = %message.from,
                to = ?message.to,
                subject = %message.subject,
                has_html = message.html_message.is_some(),
                body = %message.body,
                "Email message logged"
            );
        });
        settle(message, self.name(), result)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// HTTP 邮件后端
///
/// 向 `endpoint` POST `MailMessage` 的 JSON，`api_key` 以 Bearer 方式携带
pub struct HttpMailTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMailTransport {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| MailError::NotConfigured("mail.endpoint 未设置".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    async fn post(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate_recipients()?;

        let mut request = self.client.post(&self.endpoint).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            info!(backend = "http", to = ?message.to, status = status.as_u16(), "Email sent");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(MailError::Rejected(format!("{}: {}", status, detail)))
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send_mail(&self, message: &MailMessage) -> Result<(), MailError> {
        let result = self.post(message).await;
        settle(message, self.name(), result)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// 按配置创建邮件后端
pub fn build_transport(config: &MailConfig) -> Result<Arc<dyn MailTransport>, MailError> {
    match config.backend.as_str() {
        "log" => Ok(Arc::new(LogMailTransport)),
        "http" => Ok(Arc::new(HttpMailTransport::new(config)?)),
        other => Err(MailError::NotConfigured(format!("未知邮件后端: {}", other))),
    }
}

//! 颁发服务错误类型
//!
//! 定义业务错误和系统错误，并负责映射为 HTTP 响应

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::notification::MailError;

/// 颁发服务错误类型
#[derive(Debug, Error)]
pub enum IssuerError {
    // === 记录不存在 ===
    #[error("颁发者不存在: {0}")]
    IssuerNotFound(String),

    #[error("徽章类不存在: {0}")]
    BadgeClassNotFound(String),

    #[error("徽章断言不存在: {0}")]
    AssertionNotFound(String),

    #[error("Open Badge 不存在: {0}")]
    OpenBadgeNotFound(i64),

    #[error("获得者通知不存在: {0}")]
    NotificationNotFound(i64),

    // === 业务错误 ===
    #[error("获得者通知未关联 Open Badge: notification_id={0}")]
    NotificationWithoutBadge(i64),

    #[error("该断言已通知过获得者: {0}")]
    AlreadyNotified(String),

    #[error("存在受保护的关联记录，无法删除: {0}")]
    ProtectedReference(String),

    #[error("权限不足: {0}")]
    Forbidden(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 通知错误 ===
    #[error("邮件模板不存在: {0}")]
    TemplateNotFound(String),

    /// 邮件发送失败，原样携带发送端返回的错误
    #[error(transparent)]
    Mail(#[from] MailError),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Infrastructure(#[from] badge_shared::error::BadgeError),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 颁发服务 Result 类型别名
pub type Result<T> = std::result::Result<T, IssuerError>;

impl IssuerError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_)
                | Self::Serialization(_)
                | Self::Infrastructure(_)
                | Self::Internal(_)
                | Self::TemplateNotFound(_)
                | Self::Mail(_)
        )
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::IssuerNotFound(_)
            | Self::BadgeClassNotFound(_)
            | Self::AssertionNotFound(_)
            | Self::OpenBadgeNotFound(_)
            | Self::NotificationNotFound(_) => StatusCode::NOT_FOUND,

            Self::AlreadyNotified(_) | Self::ProtectedReference(_) => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotificationWithoutBadge(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Mail(_) => StatusCode::BAD_GATEWAY,

            Self::TemplateNotFound(_)
            | Self::Database(_)
            | Self::Serialization(_)
            | Self::Infrastructure(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IssuerNotFound(_) => "ISSUER_NOT_FOUND",
            Self::BadgeClassNotFound(_) => "BADGE_CLASS_NOT_FOUND",
            Self::AssertionNotFound(_) => "ASSERTION_NOT_FOUND",
            Self::OpenBadgeNotFound(_) => "OPEN_BADGE_NOT_FOUND",
            Self::NotificationNotFound(_) => "NOTIFICATION_NOT_FOUND",
            Self::NotificationWithoutBadge(_) => "NOTIFICATION_WITHOUT_BADGE",
            Self::AlreadyNotified(_) => "ALREADY_NOTIFIED",
            Self::ProtectedReference(_) => "PROTECTED_REFERENCE",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::Mail(_) => "MAIL_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            // 基础设施错误沿用底层错误码，如 REDIS_ERROR
            Self::Infrastructure(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for IssuerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = if self.is_business_error() {
            self.to_string()
        } else {
            tracing::error!(code = self.error_code(), error = %self, "请求处理失败");
            "服务内部错误，请稍后重试".to_string()
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for IssuerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

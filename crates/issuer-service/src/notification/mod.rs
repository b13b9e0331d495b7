//! 获得者通知邮件
//!
//! - `template`: 按名称渲染纯文本和 HTML 模板
//! - `mail`: 邮件后端抽象及实现

pub mod mail;
pub mod template;

pub use mail::{
    HttpMailTransport, LogMailTransport, MailError, MailMessage, MailTransport, build_transport,
};
pub use template::{NOTIFY_EARNER_HTML, NOTIFY_EARNER_TEXT, TemplateContext, TemplateEngine};

#[cfg(test)]
pub use mail::MockMailTransport;

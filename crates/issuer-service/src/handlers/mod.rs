//! HTTP 请求处理器
//!
//! - `public`: 公开的 Open Badges 文档
//! - `issuer` / `badge_class` / `assertion`: 颁发管理接口
//! - `open_badge` / `notification`: Open Badge 导入与获得者通知

pub mod assertion;
pub mod badge_class;
pub mod issuer;
pub mod notification;
pub mod open_badge;
pub mod public;

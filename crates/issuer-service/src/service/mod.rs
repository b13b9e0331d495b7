//! 服务层
//!
//! 实现颁发业务逻辑，协调仓储层、缓存和邮件发送。
//!
//! ## 模块结构
//!
//! - `issuer_service`: 颁发者保存（回填 `@id`）、删除保护、成员与权限
//! - `badge_class_service`: 徽章类与获得条件
//! - `assertion_service`: 断言颁发
//! - `open_badge_service`: Open Badge 文档导入
//! - `notification_service`: 获得者通知去重与邮件发送
//! - `model_cache`: 按 slug 读取的缓存

pub mod assertion_service;
pub mod badge_class_service;
pub mod issuer_service;
pub mod model_cache;
pub mod notification_service;
pub mod open_badge_service;

pub use assertion_service::AssertionService;
pub use badge_class_service::BadgeClassService;
pub use issuer_service::IssuerService;
pub use model_cache::ModelCache;
pub use notification_service::EarnerNotificationService;
pub use open_badge_service::OpenBadgeService;

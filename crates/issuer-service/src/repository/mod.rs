//! 数据库仓储层
//!
//! 提供颁发者、徽章类、断言、Open Badge 和获得者通知的数据访问。
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 服务层依赖 `traits` 中的接口，单元测试使用 mockall 生成的 mock

mod assertion_repo;
mod badge_class_repo;
mod issuer_repo;
mod notification_repo;
mod open_badge_repo;
mod traits;

pub use assertion_repo::AssertionRepository;
pub use badge_class_repo::BadgeClassRepository;
pub use issuer_repo::IssuerRepository;
pub use notification_repo::EarnerNotificationRepository;
pub use open_badge_repo::OpenBadgeRepository;
pub use traits::*;

use crate::utils::SLUG_MAX_LENGTH;

/// 构造查询候选 slug 的 `LIKE` 模式
///
/// 去重时追加的 `-N` 会截掉 base 的尾部，因此只按较短的前缀匹配，多取的结果不影响判重
pub(crate) fn slug_prefix_pattern(base: &str) -> String {
    let prefix: String = base.chars().take(SLUG_MAX_LENGTH - SLUG_SUFFIX_RESERVE).collect();
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{}%", escaped)
}

// 为 `-N` 后缀预留的长度
const SLUG_SUFFIX_RESERVE: usize = 20;

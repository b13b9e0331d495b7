//! 领域枚举

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 颁发者成员角色
///
/// - `Editor`: 可定义徽章类并颁发徽章
/// - `Staff`: 只能从已有徽章类颁发徽章
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuerRole {
    Editor,
    Staff,
}

impl IssuerRole {
    /// 成员关系所在的表
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Editor => "issuer_editors",
            Self::Staff => "issuer_staff",
        }
    }
}

impl fmt::Display for IssuerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editor => write!(f, "editor"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

/// Open Badge 链接数据文档中的子文档范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LdScope {
    Assertion,
    BadgeClass,
    Issuer,
}

impl LdScope {
    /// 子文档在完整文档中的键
    pub fn key(&self) -> &'static str {
        match self {
            Self::Assertion => "assertion",
            Self::BadgeClass => "badgeclass",
            Self::Issuer => "issuer",
        }
    }
}

impl FromStr for LdScope {
    type Err = String;

    /// 接受简写（asn / bc / iss）和完整键名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asn" | "assertion" => Ok(Self::Assertion),
            "bc" | "badgeclass" => Ok(Self::BadgeClass),
            "iss" | "issuer" => Ok(Self::Issuer),
            other => Err(format!("未知的文档范围: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_table_name() {
        assert_eq!(IssuerRole::Editor.table_name(), "issuer_editors");
        assert_eq!(IssuerRole::Staff.table_name(), "issuer_staff");
        assert_eq!(IssuerRole::Staff.to_string(), "staff");
    }

    #[test]
    fn test_role_serde() {
        let role: IssuerRole = serde_json::from_str("\"editor\"").unwrap();
        assert_eq!(role, IssuerRole::Editor);
    }

    #[test]
    fn test_ld_scope_from_str() {
        assert_eq!("bc".parse::<LdScope>().unwrap(), LdScope::BadgeClass);
        assert_eq!("iss".parse::<LdScope>().unwrap(), LdScope::Issuer);
        assert_eq!("assertion".parse::<LdScope>().unwrap(), LdScope::Assertion);
        assert!("recipient".parse::<LdScope>().is_err());
    }
}

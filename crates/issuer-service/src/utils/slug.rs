//! slug 生成
//!
//! 名称转 slug 的规则：丢弃非 ASCII 字符，转小写，去掉除字母、数字、下划线、
//! 连字符和空白以外的字符，连续的空白和连字符折叠为单个 `-`，并去掉首尾的 `-`/`_`。
//! 与已有 slug 冲突时依次追加 `-2`、`-3`…，总长度不超过 [`SLUG_MAX_LENGTH`]。

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// slug 最大长度，与数据库列宽一致
pub const SLUG_MAX_LENGTH: usize = 255;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid slug regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid slug regex"));

/// 将任意文本转换为 slug，结果可能为空
pub fn slugify(value: &str) -> String {
    let ascii: String = value.chars().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, "");
    let dashed = SEPARATORS.replace_all(cleaned.trim(), "-");
    dashed.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// 去重前的 slug：[`slugify`] 结果为空时使用 `fallback`，并截断到最大长度
pub fn slug_base(source: &str, fallback: &str) -> String {
    let base = slugify(source);
    let base = if base.is_empty() { fallback.to_string() } else { base };
    truncate(&base, SLUG_MAX_LENGTH).to_string()
}

/// 生成不与 `taken` 冲突的 slug
///
/// `source` 先经过 [`slugify`]，为空时使用 `fallback`。
pub fn unique_slug(source: &str, fallback: &str, taken: &[String]) -> String {
    let base = slug_base(source, fallback);
    let base = base.as_str();

    let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
    if !taken.contains(base) {
        return base.to_string();
    }

    let mut index: u64 = 2;
    loop {
        let suffix = format!("-{index}");
        let head = truncate(base, SLUG_MAX_LENGTH - suffix.len()).trim_end_matches('-');
        let candidate = format!("{head}{suffix}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        index += 1;
    }
}

// slug 只含 ASCII，按字节截断是安全的
fn truncate(value: &str, max_len: usize) -> &str {
    if value.len() <= max_len {
        value
    } else {
        &value[..max_len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Oregon Badge Alliance"), "oregon-badge-alliance");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("徽章 Badge"), "badge");
        assert_eq!(slugify("徽章"), "");
    }

    #[test]
    fn test_slug_base() {
        assert_eq!(slug_base("Oregon Badge Alliance", "issuer"), "oregon-badge-alliance");
        assert_eq!(slug_base("???", "badge"), "badge");
        assert_eq!(slug_base(&"b".repeat(300), "badge").len(), SLUG_MAX_LENGTH);
    }

    #[test]
    fn test_unique_slug_without_conflict() {
        assert_eq!(unique_slug("Web Literacy", "badge", &[]), "web-literacy");
    }

    #[test]
    fn test_unique_slug_appends_counter() {
        let taken = vec!["web-literacy".to_string(), "web-literacy-2".to_string()];
        assert_eq!(unique_slug("Web Literacy", "badge", &taken), "web-literacy-3");
    }

    #[test]
    fn test_unique_slug_fallback() {
        assert_eq!(unique_slug("!!!", "issuer", &[]), "issuer");
        let taken = vec!["issuer".to_string()];
        assert_eq!(unique_slug("", "issuer", &taken), "issuer-2");
    }

    #[test]
    fn test_unique_slug_respects_max_length() {
        let long_name = "a".repeat(400);
        let slug = unique_slug(&long_name, "issuer", &[]);
        assert_eq!(slug.len(), SLUG_MAX_LENGTH);

        let taken = vec![slug.clone()];
        let second = unique_slug(&long_name, "issuer", &taken);
        assert_eq!(second.len(), SLUG_MAX_LENGTH);
        assert!(second.ends_with("-2"));
    }
}

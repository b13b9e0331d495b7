//! URL 启发式判断
//!
//! 只看形状，不做解析和可达性校验：以 http:// 或 https:// 开头且不含空白即视为 URL。

use std::sync::LazyLock;

use regex::Regex;

static PROBABLE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+$").expect("valid probable-url regex"));

/// 判断字符串是否像一个 URL
pub fn is_probable_url(value: &str) -> bool {
    PROBABLE_URL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_and_https_are_urls() {
        assert!(is_probable_url("http://example.org/criteria"));
        assert!(is_probable_url("https://example.org/badges/1?x=y#z"));
        assert!(is_probable_url("HTTPS://EXAMPLE.ORG"));
    }

    #[test]
    fn test_free_text_is_not_url() {
        assert!(!is_probable_url("Complete three workshops"));
        assert!(!is_probable_url(""));
        assert!(!is_probable_url("example.org/criteria"));
        assert!(!is_probable_url("ftp://example.org/file"));
    }

    #[test]
    fn test_url_followed_by_text_is_not_url() {
        assert!(!is_probable_url("https://example.org see the page"));
        assert!(!is_probable_url(" https://example.org"));
    }
}

//! 邮件模板引擎
//!
//! 模板按名称注册（如 `issuer/notify_earner_email.txt`），支持 `{{variable}}` 语法。
//! 内置模板随二进制打包，配置 `mail.templates_dir` 后可用同名文件覆盖。
//! 名称以 `.html` 结尾的模板在替换时会对变量值做 HTML 转义。

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{IssuerError, Result};

/// 获得者通知邮件纯文本模板
pub const NOTIFY_EARNER_TEXT: &str = "issuer/notify_earner_email.txt";
/// 获得者通知邮件 HTML 模板
pub const NOTIFY_EARNER_HTML: &str = "issuer/notify_earner_email.html";

// 匹配 {{variable_name}}，变量名支持字母、数字、下划线
static VARIABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("template variable regex"));

/// 模板变量
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    values: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// 模板引擎
pub struct TemplateEngine {
    templates: HashMap<String, String>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TemplateEngine {
    /// 创建空的模板引擎
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// 创建带内置模板的引擎
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.register(
            NOTIFY_EARNER_TEXT,
            include_str!("../../../../templates/issuer/notify_earner_email.txt"),
        );
        engine.register(
            NOTIFY_EARNER_HTML,
            include_str!("../../../../templates/issuer/notify_earner_email.html"),
        );
        engine
    }

    /// 内置模板基础上，用目录中的同名文件覆盖
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut engine = Self::with_defaults();
        let dir = dir.as_ref();

        for name in [NOTIFY_EARNER_TEXT, NOTIFY_EARNER_HTML] {
            let path = dir.join(name);
            if !path.is_file() {
                debug!(template = name, dir = %dir.display(), "模板目录中无此文件，使用内置模板");
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .map_err(|e| IssuerError::Internal(format!("读取模板 {} 失败: {}", path.display(), e)))?;
            engine.register(name, content);
        }

        Ok(engine)
    }

    /// 注册模板
    pub fn register(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    /// 按名称渲染模板
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| IssuerError::TemplateNotFound(name.to_string()))?;

        let escape = name.ends_with(".html");
        let rendered = VARIABLE_REGEX.replace_all(template, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match context.get(var_name) {
                Some(value) if escape => escape_html(value),
                Some(value) => value.to_string(),
                None => {
                    warn!(template = name, variable = var_name, "模板变量未找到，保留原样");
                    caps[0].to_string()
                }
            }
        });

        Ok(rendered.into_owned())
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        let mut ctx = TemplateContext::new();
        ctx.set("badge_name", "Web <Literacy>")
            .set("badge_description", "Knows the web")
            .set("issuer_name", "Oregon Badge Alliance")
            .set("issuer_url", "https://oregonbadgealliance.org")
            .set("image_url", "https://x/media/b.png");
        ctx
    }

    #[test]
    fn test_render_builtin_text() {
        let engine = TemplateEngine::with_defaults();
        let text = engine.render(NOTIFY_EARNER_TEXT, &context()).unwrap();
        assert!(text.contains("\"Web <Literacy>\""));
        assert!(text.contains("Oregon Badge Alliance (https://oregonbadgealliance.org)"));
        assert!(text.contains("https://x/media/b.png"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_render_html_escapes_values() {
        let engine = TemplateEngine::with_defaults();
        let html = engine.render(NOTIFY_EARNER_HTML, &context()).unwrap();
        assert!(html.contains("Web &lt;Literacy&gt;"));
        assert!(!html.contains("Web <Literacy>"));
    }

    #[test]
    fn test_render_missing_template() {
        let engine = TemplateEngine::new();
        let err = engine.render("issuer/none.txt", &context()).unwrap_err();
        assert!(matches!(err, IssuerError::TemplateNotFound(name) if name == "issuer/none.txt"));
    }

    #[test]
    fn test_render_missing_variable_kept() {
        let mut engine = TemplateEngine::new();
        engine.register("greeting.txt", "Hello {{ name }}, {{unknown}}");
        let mut ctx = TemplateContext::new();
        ctx.set("name", "Ada");
        assert_eq!(
            engine.render("greeting.txt", &ctx).unwrap(),
            "Hello Ada, {{unknown}}"
        );
    }

    #[test]
    fn test_from_missing_dir_uses_builtin() {
        let engine = TemplateEngine::from_dir("/nonexistent/templates").unwrap();
        assert!(engine.render(NOTIFY_EARNER_HTML, &context()).is_ok());
    }
}

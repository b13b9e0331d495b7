//! 通用工具
//!
//! - `slug`: 由名称生成唯一 slug
//! - `probable_url`: 判断字符串是否像 URL

pub mod probable_url;
pub mod slug;

pub use probable_url::is_probable_url;
pub use slug::{SLUG_MAX_LENGTH, slug_base, slugify, unique_slug};

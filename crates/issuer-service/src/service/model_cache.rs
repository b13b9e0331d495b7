//! 按 slug 查询的模型缓存
//!
//! 颁发者、徽章类、断言的单条读取走 Redis，写入和删除后失效。
//! 未配置 Redis 时直接读库。缓存读写失败只告警，不影响主流程。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use badge_shared::cache::Cache;

use crate::error::Result;

/// 缓存 TTL 常量（秒）
pub(crate) mod cache_ttl {
    pub const ISSUER: u64 = 600; // 10 min
    pub const BADGE_CLASS: u64 = 600; // 10 min
    pub const ASSERTION: u64 = 1800; // 30 min，断言创建后不再修改
}

/// 缓存键生成
pub(crate) mod cache_keys {
    pub fn issuer(slug: &str) -> String {
        format!("issuer:slug:{}", slug)
    }

    pub fn badge_class(slug: &str) -> String {
        format!("issuer:badgeclass:slug:{}", slug)
    }

    pub fn assertion(slug: &str) -> String {
        format!("issuer:assertion:slug:{}", slug)
    }
}

/// 模型缓存
#[derive(Clone, Default)]
pub struct ModelCache {
    cache: Option<Arc<Cache>>,
}

impl ModelCache {
    pub fn new(cache: Option<Arc<Cache>>) -> Self {
        Self { cache }
    }

    /// 不使用缓存
    pub fn disabled() -> Self {
        Self { cache: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// 缓存优先读取，只缓存查到的记录
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl_secs: u64,
        fetch: F,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let Some(cache) = &self.cache else {
            return fetch().await;
        };

        match cache.get::<T>(key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, "Cache hit");
                return Ok(Some(cached));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get failed, falling back to database");
            }
        }

        let data = fetch().await?;

        if let Some(value) = &data {
            if let Err(e) = cache.set(key, value, Duration::from_secs(ttl_secs)).await {
                warn!(key = %key, error = %e, "Cache set failed");
            }
        }

        Ok(data)
    }

    /// 使缓存失效
    pub async fn invalidate(&self, key: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(key).await {
                warn!(key = %key, error = %e, "Cache invalidate failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_generation() {
        assert_eq!(cache_keys::issuer("oregon"), "issuer:slug:oregon");
        assert_eq!(
            cache_keys::badge_class("web-literacy"),
            "issuer:badgeclass:slug:web-literacy"
        );
        assert_eq!(cache_keys::assertion("abc"), "issuer:assertion:slug:abc");
    }

    #[tokio::test]
    async fn test_disabled_cache_fetches_directly() {
        let cache = ModelCache::disabled();
        assert!(!cache.is_enabled());

        let value: Option<String> = cache
            .get_or_fetch("k", cache_ttl::ISSUER, || async { Ok(Some("v".to_string())) })
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("v"));

        // 失效操作在无缓存时为空操作
        cache.invalidate("k").await;
    }
}

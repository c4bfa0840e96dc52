//! 主题设置存储
//!
//! 设置按用户保存，通过显式的 load/save 接口访问，
//! 没有进程级的全局主题状态。

use async_trait::async_trait;
use dashmap::DashMap;
use shared::error::AppResult;
use shared::settings::ThemeSettings;

/// 设置存储接口
#[async_trait]
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    /// 用户的主题; 从未保存过返回 `None`
    async fn load(&self, user_id: &str) -> AppResult<Option<ThemeSettings>>;

    async fn save(&self, user_id: &str, theme: ThemeSettings) -> AppResult<()>;
}

/// 内存实现 (进程重启后丢失)
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    themes: DashMap<String, ThemeSettings>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, user_id: &str) -> AppResult<Option<ThemeSettings>> {
        Ok(self.themes.get(user_id).map(|t| t.value().clone()))
    }

    async fn save(&self, user_id: &str, theme: ThemeSettings) -> AppResult<()> {
        self.themes.insert(user_id.to_string(), theme);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::settings::ThemeMode;

    #[tokio::test]
    async fn test_memory_store_is_per_user() {
        let store = MemorySettingsStore::new();
        assert!(store.load("u1").await.unwrap().is_none());

        let dark = ThemeSettings {
            mode: ThemeMode::Dark,
            ..Default::default()
        };
        store.save("u1", dark.clone()).await.unwrap();

        assert_eq!(store.load("u1").await.unwrap(), Some(dark));
        assert!(store.load("u2").await.unwrap().is_none());
    }
}

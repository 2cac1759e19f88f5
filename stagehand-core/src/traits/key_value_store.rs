//! 持久化键值存储抽象 Trait

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;

/// 键值存储 Trait
///
/// 平台实现:
/// - 内存: `InMemoryKeyValueStore`
/// - 文件: `JsonFileStore`（stagehand-app）
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取布尔值，不存在时返回 `false`
    async fn get_bool(&self, key: &str) -> CoreResult<bool>;

    /// 写入布尔值
    async fn set_bool(&self, key: &str, value: bool) -> CoreResult<()>;

    /// 删除键
    async fn remove(&self, key: &str) -> CoreResult<()>;
}

/// 内存键值存储
///
/// 默认实现，进程退出后数据丢失。
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<RwLock<HashMap<String, bool>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前所有键（排序后）
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get_bool(&self, key: &str) -> CoreResult<bool> {
        Ok(self.values.read().await.get(key).copied().unwrap_or(false))
    }

    async fn set_bool(&self, key: &str, value: bool) -> CoreResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

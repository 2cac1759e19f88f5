//! JSON 文件键值存储
//!
//! 把教程进度等布尔标记保存在单个 JSON 文件中，
//! 实现 stagehand-core 的 `KeyValueStore` trait。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagehand_core::error::{CoreError, CoreResult};
use stagehand_core::traits::KeyValueStore;
use tokio::fs;
use tokio::sync::Mutex;

/// 文件格式
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    values: BTreeMap<String, bool>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// 基于 JSON 文件的键值存储
///
/// 首次访问时读入内存缓存，每次写入都整体落盘。
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, bool>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从文件加载；文件不存在时视为空
    async fn load_from_file(&self) -> CoreResult<BTreeMap<String, bool>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoreError::StorageError(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let file: StoreFile = serde_json::from_str(&content)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        Ok(file.values)
    }

    async fn save_to_file(&self, values: &BTreeMap<String, bool>) -> CoreResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .await
                    .map_err(|e| CoreError::StorageError(e.to_string()))?;
            }
        }

        let file = StoreFile {
            values: values.clone(),
            updated_at: Some(Utc::now()),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| CoreError::StorageError(e.to_string()))?;

        Ok(())
    }

    /// 对缓存做一次修改并落盘；落盘失败时缓存保持不变
    async fn update<F>(&self, mutate: F) -> CoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, bool>) -> bool,
    {
        let mut cache = self.cache.lock().await;
        let mut values = match cache.as_ref() {
            Some(values) => values.clone(),
            None => self.load_from_file().await?,
        };

        if mutate(&mut values) {
            self.save_to_file(&values).await?;
        }

        *cache = Some(values);
        Ok(())
    }

    /// 当前全部键（有序）
    pub async fn keys(&self) -> CoreResult<Vec<String>> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load_from_file().await?);
        }
        Ok(cache
            .as_ref()
            .map(|values| values.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_bool(&self, key: &str) -> CoreResult<bool> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load_from_file().await?);
        }
        Ok(cache
            .as_ref()
            .and_then(|values| values.get(key).copied())
            .unwrap_or(false))
    }

    async fn set_bool(&self, key: &str, value: bool) -> CoreResult<()> {
        self.update(|values| values.insert(key.to_string(), value) != Some(value))
            .await
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.update(|values| values.remove(key).is_some()).await
    }
}

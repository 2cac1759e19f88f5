//! 锚点注册表
//!
//! 锚点 id → 活动 UI 元素。屏幕挂载时注册、卸载时注销，后写入者覆盖先写入者。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::AnchorElement;
use crate::utils::{read, write};

/// 锚点注册表
#[derive(Default)]
pub struct AnchorRegistry {
    anchors: RwLock<HashMap<String, Arc<dyn AnchorElement>>>,
}

impl AnchorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册锚点；同 id 已存在时直接替换
    pub fn register(&self, id: impl Into<String>, element: Arc<dyn AnchorElement>) {
        let id = id.into();
        if write(&self.anchors).insert(id.clone(), element).is_some() {
            log::debug!("Anchor '{id}' replaced");
        }
    }

    /// 注销锚点；仅当当前注册的正是 `element` 时才移除
    ///
    /// 旧屏幕卸载较晚时不会把新屏幕刚注册的同名锚点删掉。
    pub fn unregister(&self, id: &str, element: &Arc<dyn AnchorElement>) -> bool {
        let mut anchors = write(&self.anchors);
        match anchors.get(id) {
            Some(current) if Arc::ptr_eq(current, element) => {
                anchors.remove(id);
                true
            }
            Some(_) => {
                log::debug!("Anchor '{id}' is registered to another element; unregister ignored");
                false
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn AnchorElement>> {
        read(&self.anchors).get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        read(&self.anchors).contains_key(id)
    }

    /// 已注册的 id（排序后）
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = read(&self.anchors).keys().cloned().collect();
        ids.sort();
        ids
    }
}

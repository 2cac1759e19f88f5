//! 教程进度跟踪
//!
//! 持久化键形如 `"<tutorialId>:<stepId>"` 与 `"<tutorialId>:_DONE_"`。
//! 教程完成时其所有已注册步骤也都写为完成。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::CoreResult;
use crate::traits::KeyValueStore;
use crate::utils::{read, write};

const DONE_SUFFIX: &str = "_DONE_";

pub fn step_key(tutorial_id: &str, step_id: &str) -> String {
    format!("{tutorial_id}:{step_id}")
}

pub fn done_key(tutorial_id: &str) -> String {
    step_key(tutorial_id, DONE_SUFFIX)
}

/// 教程进度服务
pub struct TutorialProgress {
    store: Arc<dyn KeyValueStore>,
    /// 教程 id → 有序步骤 id
    tutorials: RwLock<HashMap<String, Vec<String>>>,
}

impl TutorialProgress {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            tutorials: RwLock::new(HashMap::new()),
        }
    }

    /// 注册教程的有序步骤（重复注册会替换）
    pub fn register<I, S>(&self, tutorial_id: &str, step_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<String> = step_ids.into_iter().map(Into::into).collect();
        write(&self.tutorials).insert(tutorial_id.to_string(), steps);
    }

    pub fn steps(&self, tutorial_id: &str) -> Option<Vec<String>> {
        read(&self.tutorials).get(tutorial_id).cloned()
    }

    /// 标记步骤完成；若为已注册教程的最后一步则同时标记教程完成
    pub async fn mark_step_done(&self, tutorial_id: &str, step_id: &str) -> CoreResult<()> {
        self.store
            .set_bool(&step_key(tutorial_id, step_id), true)
            .await?;

        let is_last = self
            .steps(tutorial_id)
            .is_some_and(|steps| steps.last().is_some_and(|last| last == step_id));
        if is_last {
            self.mark_tutorial_done(tutorial_id).await?;
        }
        Ok(())
    }

    /// 标记教程完成：先补写所有已注册步骤（包括被跳过的），再写完成标记
    pub async fn mark_tutorial_done(&self, tutorial_id: &str) -> CoreResult<()> {
        for step in self.steps(tutorial_id).unwrap_or_default() {
            self.store.set_bool(&step_key(tutorial_id, &step), true).await?;
        }
        log::info!("Tutorial '{tutorial_id}' done");
        self.store.set_bool(&done_key(tutorial_id), true).await
    }

    pub async fn is_step_done(&self, tutorial_id: &str, step_id: &str) -> CoreResult<bool> {
        if self.is_tutorial_done(tutorial_id).await? {
            return Ok(true);
        }
        self.store.get_bool(&step_key(tutorial_id, step_id)).await
    }

    pub async fn is_tutorial_done(&self, tutorial_id: &str) -> CoreResult<bool> {
        self.store.get_bool(&done_key(tutorial_id)).await
    }

    /// 第一个未完成的步骤；教程已完成或未注册时返回 `None`
    pub async fn first_pending_step(&self, tutorial_id: &str) -> CoreResult<Option<String>> {
        if self.is_tutorial_done(tutorial_id).await? {
            return Ok(None);
        }
        for step in self.steps(tutorial_id).unwrap_or_default() {
            if !self.store.get_bool(&step_key(tutorial_id, &step)).await? {
                return Ok(Some(step));
            }
        }
        Ok(None)
    }

    /// 清除该教程的全部进度
    pub async fn reset(&self, tutorial_id: &str) -> CoreResult<()> {
        for step in self.steps(tutorial_id).unwrap_or_default() {
            self.store.remove(&step_key(tutorial_id, &step)).await?;
        }
        self.store.remove(&done_key(tutorial_id)).await
    }
}

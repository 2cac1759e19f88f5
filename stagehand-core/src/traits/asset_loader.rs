//! 资源/预制体加载抽象 Trait

use crate::error::CoreResult;
use crate::traits::NodeHandle;

/// 资源加载 Trait
///
/// 核心只通过模板 id 实例化节点，从不检查模板内部结构。
pub trait AssetLoader: Send + Sync {
    /// 实例化模板并挂到 `parent` 下
    ///
    /// # Returns
    /// * `Err(CoreError::TemplateNotFound)` - 模板不存在
    fn instantiate(&self, template_id: &str, parent: &NodeHandle) -> CoreResult<NodeHandle>;

    /// 创建一个空容器节点（用于转场占位）
    fn create_empty(&self, name: &str, parent: &NodeHandle) -> NodeHandle;
}

//! 模板加载器
//!
//! 把模板 id 映射到在 `Scene` 中构建节点树的工厂函数，实现 `AssetLoader`。
//! `with_standard_templates` 预先注册对话框与高亮模板，节点名取自配置。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stagehand_core::config::{DialogElementNames, StageConfig};
use stagehand_core::error::{CoreError, CoreResult};
use stagehand_core::traits::{AssetLoader, ElementKind, NodeHandle, VisualNode};
use stagehand_core::types::{Rect, Size};
use stagehand_core::utils::{read, write};

use super::scene::{Scene, SceneNode};

/// 模板工厂
pub type TemplateFactory = Arc<dyn Fn(&Scene) -> Arc<SceneNode> + Send + Sync>;

/// 默认对话框尺寸（终端单元格）
pub const DIALOG_SIZE: Size = Size::new(40.0, 9.0);

/// 基于场景图的模板加载器
pub struct TemplateLoader {
    scene: Arc<Scene>,
    templates: RwLock<HashMap<String, TemplateFactory>>,
}

impl TemplateLoader {
    pub fn new(scene: Arc<Scene>) -> Self {
        Self {
            scene,
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// 注册配置中的对话框与高亮模板
    pub fn with_standard_templates(scene: Arc<Scene>, config: &StageConfig) -> Self {
        let loader = Self::new(scene);
        let names = config.modal.elements.clone();
        loader.register(
            &config.modal.dialog_template,
            Arc::new(move |scene: &Scene| dialog_template(scene, &names, DIALOG_SIZE)),
        );
        loader.register(
            &config.tutorial.highlight_template,
            Arc::new(|scene: &Scene| scene.create("Highlight", ElementKind::Image)),
        );
        loader
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    /// 注册（或替换）模板
    pub fn register(&self, template_id: &str, factory: TemplateFactory) {
        write(&self.templates).insert(template_id.to_string(), factory);
    }

    pub fn unregister(&self, template_id: &str) -> bool {
        write(&self.templates).remove(template_id).is_some()
    }

    pub fn contains(&self, template_id: &str) -> bool {
        read(&self.templates).contains_key(template_id)
    }
}

impl AssetLoader for TemplateLoader {
    fn instantiate(&self, template_id: &str, parent: &NodeHandle) -> CoreResult<NodeHandle> {
        let factory = read(&self.templates)
            .get(template_id)
            .cloned()
            .ok_or_else(|| CoreError::TemplateNotFound(template_id.to_string()))?;

        let node = factory(&self.scene);
        node.set_parent(Some(parent));
        log::debug!("Instantiated template '{template_id}' as node {}", node.id());
        Ok(node as NodeHandle)
    }

    fn create_empty(&self, name: &str, parent: &NodeHandle) -> NodeHandle {
        let node = self
            .scene
            .create_with_rect(name, ElementKind::Container, parent.rect());
        node.set_parent(Some(parent));
        node
    }
}

/// 标准对话框：背景按钮、标题、正文、图标以及确认/关闭按钮
pub fn dialog_template(scene: &Scene, names: &DialogElementNames, size: Size) -> Arc<SceneNode> {
    let root = scene.create_with_rect(
        "Dialog",
        ElementKind::Container,
        Rect::new(0.0, 0.0, size.width, size.height),
    );
    let full = Rect::new(0.0, 0.0, size.width, size.height);
    let inner_width = (size.width - 4.0).max(1.0);

    root.add_child(&scene.create_with_rect(&names.background, ElementKind::Button, full));
    // 图标在右上角，标题让出三列
    root.add_child(&scene.create_with_rect(
        &names.icon,
        ElementKind::Image,
        Rect::new(size.width - 4.0, 1.0, 2.0, 1.0),
    ));
    root.add_child(&scene.create_with_rect(
        &names.title,
        ElementKind::Text,
        Rect::new(2.0, 1.0, (inner_width - 3.0).max(1.0), 1.0),
    ));
    root.add_child(&scene.create_with_rect(
        &names.body,
        ElementKind::Text,
        Rect::new(2.0, 3.0, inner_width, (size.height - 6.0).max(1.0)),
    ));

    let button_y = size.height - 2.0;
    for (index, (button, label, text)) in [
        (&names.confirm_button, &names.confirm_label, "OK"),
        (&names.close_button, &names.close_label, "Close"),
    ]
    .into_iter()
    .enumerate()
    {
        #[allow(clippy::cast_precision_loss)]
        let x = 2.0 + index as f32 * 12.0;
        let node =
            scene.create_with_rect(button, ElementKind::Button, Rect::new(x, button_y, 10.0, 1.0));
        let caption =
            scene.create_with_rect(label, ElementKind::Text, Rect::new(0.0, 0.0, 10.0, 1.0));
        caption.set_text(text);
        node.add_child(&caption);
        root.add_child(&node);
    }
    root
}

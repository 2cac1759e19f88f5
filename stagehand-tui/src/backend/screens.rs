//! 演示页面模板
//!
//! 每个页面是一棵全屏节点树：标题、说明文字和一列按钮。
//! 按钮名称同时是视图控制器缓存里的查找键，也是教程锚点的挂载点。

use std::sync::Arc;

use stagehand_app::adapters::{Scene, SceneNode, TemplateLoader};
use stagehand_core::traits::{ElementKind, VisualNode};
use stagehand_core::types::{Rect, Size};

use crate::message::StageMessage;
use crate::model::Screen;

/// 按钮宽度（单元格）
pub const BUTTON_WIDTH: f32 = 24.0;

/// 模板的初始尺寸，实例化后由 `StageBackend` 调整为视口尺寸
const TEMPLATE_SIZE: Size = Size::new(80.0, 23.0);

/// 页面按钮：节点名、文字、点击后投递的消息
pub struct ButtonDef {
    pub name: &'static str,
    pub label: &'static str,
    pub action: StageMessage,
}

struct ScreenDef {
    title: &'static str,
    body: &'static str,
    buttons: &'static [ButtonDef],
}

const HOME: ScreenDef = ScreenDef {
    title: "Stagehand",
    body: "Tab / ↑↓ move focus, Enter presses a button, Esc goes back.\n\
           m tips · w wizard · t restart the tour · q quit",
    buttons: &[
        ButtonDef {
            name: "TipsButton",
            label: "Show tips",
            action: StageMessage::ShowTips,
        },
        ButtonDef {
            name: "GalleryButton",
            label: "Open gallery",
            action: StageMessage::Open(Screen::Gallery),
        },
        ButtonDef {
            name: "SettingsButton",
            label: "Settings",
            action: StageMessage::Open(Screen::Settings),
        },
        ButtonDef {
            name: "TourButton",
            label: "Replay tour",
            action: StageMessage::StartTour,
        },
    ],
};

const GALLERY: ScreenDef = ScreenDef {
    title: "Gallery",
    body: "Modal sequences walk through several dialogs in order.\n\
           Close on any step goes back one step.",
    buttons: &[
        ButtonDef {
            name: "WizardButton",
            label: "Run wizard",
            action: StageMessage::RunWizard,
        },
        ButtonDef {
            name: "BackButton",
            label: "Back",
            action: StageMessage::Back,
        },
    ],
};

const SETTINGS: ScreenDef = ScreenDef {
    title: "Settings",
    body: "Tour progress is stored on disk.\n\
           Resetting it makes the tour run again on next launch.",
    buttons: &[
        ButtonDef {
            name: "ResetButton",
            label: "Reset tour progress",
            action: StageMessage::ResetTour,
        },
        ButtonDef {
            name: "BackButton",
            label: "Back",
            action: StageMessage::Back,
        },
    ],
};

fn definition(screen: Screen) -> &'static ScreenDef {
    match screen {
        Screen::Home => &HOME,
        Screen::Gallery => &GALLERY,
        Screen::Settings => &SETTINGS,
    }
}

/// 页面上的按钮定义
pub fn buttons(screen: Screen) -> &'static [ButtonDef] {
    definition(screen).buttons
}

/// 把所有页面模板注册到加载器
pub fn register(loader: &TemplateLoader) {
    for screen in Screen::ALL {
        loader.register(
            screen.template_id(),
            Arc::new(move |scene: &Scene| build(scene, screen)),
        );
    }
}

fn build(scene: &Scene, screen: Screen) -> Arc<SceneNode> {
    let def = definition(screen);
    let root = scene.create_with_rect(
        screen.name(),
        ElementKind::Container,
        Rect::new(0.0, 0.0, TEMPLATE_SIZE.width, TEMPLATE_SIZE.height),
    );

    let title = scene.create_with_rect("Title", ElementKind::Text, Rect::new(2.0, 1.0, 60.0, 1.0));
    title.set_text(def.title);
    root.add_child(&title);

    let body = scene.create_with_rect("Body", ElementKind::Text, Rect::new(2.0, 3.0, 70.0, 3.0));
    body.set_text(def.body);
    root.add_child(&body);

    for (index, button) in def.buttons.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = 7.0 + index as f32 * 2.0;
        let node = scene.create_with_rect(
            button.name,
            ElementKind::Button,
            Rect::new(2.0, y, BUTTON_WIDTH, 1.0),
        );
        node.set_text(button.label);
        root.add_child(&node);
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::traits::{AssetLoader, NodeHandle};

    #[test]
    fn test_every_screen_template_builds() {
        let scene = Scene::new();
        let loader = TemplateLoader::new(Arc::clone(&scene));
        register(&loader);
        let viewport = scene.create("Viewport", ElementKind::Container);
        let parent: NodeHandle = viewport.clone();

        for screen in Screen::ALL {
            let root = loader.instantiate(screen.template_id(), &parent).unwrap();
            assert_eq!(root.name(), screen.name());
        }
        for button in buttons(Screen::Home) {
            let node = viewport.find(button.name).unwrap();
            assert_eq!(node.kind(), ElementKind::Button);
            assert_eq!(node.text(), button.label);
        }
    }

    #[test]
    fn test_buttons_do_not_overlap() {
        let scene = Scene::new();
        for screen in Screen::ALL {
            let root = build(&scene, screen);
            let rects: Vec<Rect> = root
                .child_nodes()
                .iter()
                .filter(|n| n.kind() == ElementKind::Button)
                .map(|n| n.rect())
                .collect();
            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    assert!(!a.intersects(b));
                }
            }
        }
    }
}

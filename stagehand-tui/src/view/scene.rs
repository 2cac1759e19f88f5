//! 场景渲染
//!
//! 把 `SceneNode` 树画到终端单元格上。节点坐标是视口坐标（单元格，f32），
//! 缩放围绕节点的 pivot 进行并传递给子节点，透明度低于一半时变暗。
//!
//! 绘制顺序：Viewport 的页面 → 高亮框 → 弹窗（弹窗有遮罩时先把整个场景变暗）。

use std::sync::Arc;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use stagehand_app::adapters::SceneNode;
use stagehand_core::config::DialogElementNames;
use stagehand_core::traits::{ElementKind, VisualNode};
use stagehand_core::types::Vec2;

use crate::backend::button_label;
use crate::model::App;
use crate::util::fit_width;
use crate::view::theme::Styles;

/// 高亮模板的根节点名
const HIGHLIGHT_NODE: &str = "Highlight";

/// 透明度低于此值时不绘制
const INVISIBLE_ALPHA: f32 = 0.05;

/// 场景变换：`x' = k * x + dx`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    k: f32,
    dx: f32,
    dy: f32,
}

impl Transform {
    const IDENTITY: Self = Self {
        k: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    /// 变换后的矩形 (x, y, w, h)
    fn apply(self, x: f32, y: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
        (self.k * x + self.dx, self.k * y + self.dy, self.k * w, self.k * h)
    }

    /// 在本变换之后再围绕 `(px, py)` 缩放 `s`
    fn then_scale(self, s: f32, px: f32, py: f32) -> Self {
        Self {
            k: s * self.k,
            dx: s * self.dx + (1.0 - s) * px,
            dy: s * self.dy + (1.0 - s) * py,
        }
    }
}

/// 节点的最终几何：绘制矩形与传给子节点的变换
fn node_geometry(node: &SceneNode, parent: Transform) -> ((f32, f32, f32, f32), Transform) {
    let rect = node.rect();
    let (x, y, w, h) = parent.apply(rect.x, rect.y, rect.width, rect.height);
    let pivot = node.pivot().unwrap_or(Vec2::ZERO);
    let (px, py) = (x + pivot.x * w, y + pivot.y * h);
    let own = parent.then_scale(node.scale(), px, py);
    (own.apply(rect.x, rect.y, rect.width, rect.height), own)
}

/// 场景坐标转成 `area` 内的单元格矩形，完全在外时为 `None`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_cells((x, y, w, h): (f32, f32, f32, f32), area: Rect) -> Option<Rect> {
    if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
        return None;
    }
    let left = f32::from(area.x) + x.round();
    let top = f32::from(area.y) + y.round();
    let right = left + w.round();
    let bottom = top + h.round();

    let l = left.max(f32::from(area.left()));
    let t = top.max(f32::from(area.top()));
    let r = right.min(f32::from(area.right()));
    let b = bottom.min(f32::from(area.bottom()));
    if r <= l || b <= t {
        return None;
    }
    Some(Rect::new(l as u16, t as u16, (r - l) as u16, (b - t) as u16))
}

fn faded(style: Style, alpha: f32) -> Style {
    if alpha < 0.5 {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

struct Painter<'a> {
    area: Rect,
    focused: Option<u64>,
    names: &'a DialogElementNames,
}

impl Painter<'_> {
    /// 页面或弹窗的根节点：有内容时画成带边框的面板
    fn draw_root(&self, frame: &mut Frame, root: &Arc<SceneNode>, dialog: bool) {
        if !root.is_active() || root.alpha() < INVISIBLE_ALPHA {
            return;
        }
        let children = root.child_nodes();
        // 转场占位节点没有内容
        if children.is_empty() {
            return;
        }

        let (geometry, transform) = node_geometry(root, Transform::IDENTITY);
        let alpha = root.alpha();
        if let Some(cells) = to_cells(geometry, self.area) {
            let (border, fill, border_type) = if dialog {
                (Styles::dialog_border(), Styles::dialog(), BorderType::Rounded)
            } else {
                (Styles::border(), Styles::canvas(), BorderType::Plain)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(faded(border, alpha))
                .style(fill);
            frame.render_widget(Clear, cells);
            frame.render_widget(block, cells);
        }

        for child in children {
            self.draw_node(frame, &child, transform, alpha);
        }
    }

    fn draw_node(&self, frame: &mut Frame, node: &Arc<SceneNode>, parent: Transform, alpha: f32) {
        if !node.is_active() {
            return;
        }
        let alpha = alpha * node.alpha();
        if alpha < INVISIBLE_ALPHA {
            return;
        }
        let (geometry, transform) = node_geometry(node, parent);
        let cells = to_cells(geometry, self.area);

        match node.kind() {
            ElementKind::Container => {}
            ElementKind::Button => {
                if let Some(cells) = cells {
                    self.draw_button(frame, node, cells, alpha);
                }
                // 按钮文字已画在按钮上
                return;
            }
            ElementKind::Text | ElementKind::Label => {
                if let Some(cells) = cells {
                    let style = if node.name() == self.names.title {
                        Styles::title()
                    } else {
                        Styles::body()
                    };
                    let paragraph = Paragraph::new(node.text())
                        .style(faded(style, alpha))
                        .wrap(Wrap { trim: true });
                    frame.render_widget(paragraph, cells);
                }
            }
            ElementKind::Image => {
                let image = node.image();
                if let (Some(cells), false) = (cells, image.is_empty()) {
                    let glyph = fit_width(&format!("[{image}]"), usize::from(cells.width));
                    frame.render_widget(
                        Paragraph::new(glyph).style(faded(Styles::icon(), alpha)),
                        cells,
                    );
                }
            }
        }

        for child in node.child_nodes() {
            self.draw_node(frame, &child, transform, alpha);
        }
    }

    fn draw_button(&self, frame: &mut Frame, node: &SceneNode, cells: Rect, alpha: f32) {
        // 没有文字的按钮是弹窗的背景点击区
        let Some(label) = button_label(node) else {
            return;
        };
        let style = if self.focused == Some(node.id()) {
            Styles::button_focused()
        } else if node.is_interactable() {
            Styles::button()
        } else {
            Styles::button_disabled()
        };
        let text = fit_width(&label, usize::from(cells.width.saturating_sub(2)));
        let line = Line::from(text).alignment(Alignment::Center);
        frame.render_widget(Paragraph::new(line).style(faded(style, alpha)), cells);
    }

    fn draw_highlight(&self, frame: &mut Frame, node: &SceneNode) {
        if !node.is_active() {
            return;
        }
        let (geometry, _) = node_geometry(node, Transform::IDENTITY);
        if let Some(cells) = to_cells(geometry, self.area) {
            // 只画边框，洞里的按钮保持原样
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Thick)
                .border_style(Styles::highlight());
            frame.render_widget(block, cells);
        }
    }
}

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let backend = &app.backend;
    let painter = Painter {
        area,
        focused: app.focused().map(|node| node.id()),
        names: backend.dialog_names(),
    };

    frame.render_widget(Block::default().style(Styles::canvas()), area);
    for root in backend.viewport().child_nodes() {
        painter.draw_root(frame, &root, false);
    }

    let (highlights, dialogs): (Vec<_>, Vec<_>) = backend
        .overlay()
        .child_nodes()
        .into_iter()
        .partition(|node| node.name() == HIGHLIGHT_NODE);

    let dims = dialogs.iter().any(|dialog| {
        dialog.is_active()
            && dialog
                .find(&painter.names.background)
                .is_some_and(|background| background.is_active())
    });
    if dims {
        frame
            .buffer_mut()
            .set_style(area, Style::default().add_modifier(Modifier::DIM));
    }

    for highlight in &highlights {
        painter.draw_highlight(frame, highlight);
    }
    for dialog in &dialogs {
        painter.draw_root(frame, dialog, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_app::adapters::Scene;
    use stagehand_core::types::Rect as NodeRect;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 20,
    };

    #[test]
    fn test_to_cells_clips_to_area() {
        assert_eq!(
            to_cells((-5.0, 2.0, 10.0, 3.0), AREA),
            Some(Rect::new(0, 2, 5, 3))
        );
        assert_eq!(to_cells((90.0, 2.0, 10.0, 3.0), AREA), None);
        assert_eq!(to_cells((1.0, 1.0, 0.2, 1.0), AREA), None);
    }

    #[test]
    fn test_scale_shrinks_around_pivot() {
        let scene = Scene::new();
        let dialog = scene.create_with_rect(
            "Dialog",
            ElementKind::Container,
            NodeRect::new(10.0, 5.0, 40.0, 10.0),
        );
        dialog.set_pivot(Vec2::new(0.5, 0.5));
        dialog.set_scale(0.5);

        let ((x, y, w, h), _) = node_geometry(&dialog, Transform::IDENTITY);
        assert!((x - 20.0).abs() < 1e-4);
        assert!((y - 7.5).abs() < 1e-4);
        assert!((w - 20.0).abs() < 1e-4);
        assert!((h - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_children_follow_parent_scale() {
        let scene = Scene::new();
        let dialog = scene.create_with_rect(
            "Dialog",
            ElementKind::Container,
            NodeRect::new(0.0, 0.0, 40.0, 10.0),
        );
        let button = scene.create_with_rect(
            "ConfirmButton",
            ElementKind::Button,
            NodeRect::new(20.0, 5.0, 10.0, 1.0),
        );
        dialog.add_child(&button);
        dialog.set_pivot(Vec2::new(0.0, 0.0));
        dialog.set_scale(0.5);

        let (_, transform) = node_geometry(&dialog, Transform::IDENTITY);
        let ((x, y, w, _), _) = node_geometry(&button, transform);
        assert!((x - 10.0).abs() < 1e-4);
        assert!((y - 2.5).abs() < 1e-4);
        assert!((w - 5.0).abs() < 1e-4);
    }
}

//! 弹窗放置引擎
//!
//! 纯几何计算：给定视口、弹窗尺寸与放置模式，求出弹窗矩形。

use crate::config::PlacementConfig;
use crate::types::{PlacementMode, Rect, Side, Size, Vec2};

/// 放置结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// 弹窗最终矩形（视口坐标）
    pub rect: Rect,
    /// 朝向目标一侧的轴心，0–1 比例
    pub pivot: Vec2,
    /// `NearTarget` 模式下实际使用的方位
    pub side: Option<Side>,
}

/// 目标矩形某一侧到视口边缘的可用空间
pub fn available_space(viewport: &Rect, target: &Rect, side: Side) -> f32 {
    match side {
        Side::Above => target.top() - viewport.top(),
        Side::Below => viewport.bottom() - target.bottom(),
        Side::Right => viewport.right() - target.right(),
        Side::Left => target.left() - viewport.left(),
    }
}

/// 自动选边：空间严格最大者胜出，并列时按 上、下、右、左 的顺序
pub fn choose_side(viewport: &Rect, target: &Rect) -> Side {
    let mut best = Side::EVALUATION_ORDER[0];
    let mut best_space = available_space(viewport, target, best);
    for side in &Side::EVALUATION_ORDER[1..] {
        let space = available_space(viewport, target, *side);
        if space > best_space {
            best = *side;
            best_space = space;
        }
    }
    best
}

fn pivot_for(side: Side) -> Vec2 {
    match side {
        Side::Below => Vec2::new(0.5, 0.0),
        Side::Above => Vec2::new(0.5, 1.0),
        Side::Right => Vec2::new(0.0, 0.5),
        Side::Left => Vec2::new(1.0, 0.5),
    }
}

/// 将一维区间 `[pos, pos + len]` 限制在 `[min, max]` 内；放不下时贴住 `min`
fn clamp_axis(pos: f32, len: f32, min: f32, max: f32) -> f32 {
    if len >= max - min {
        min
    } else {
        pos.max(min).min(max - len)
    }
}

fn clamp_into(rect: Rect, bounds: &Rect) -> Rect {
    Rect::new(
        clamp_axis(rect.x, rect.width, bounds.left(), bounds.right()),
        clamp_axis(rect.y, rect.height, bounds.top(), bounds.bottom()),
        rect.width,
        rect.height,
    )
}

fn centered_at(center: Vec2, size: Size) -> Rect {
    Rect::new(
        center.x - size.width / 2.0,
        center.y - size.height / 2.0,
        size.width,
        size.height,
    )
}

/// 计算弹窗位置
pub fn place(
    viewport: Rect,
    size: Size,
    mode: &PlacementMode,
    config: PlacementConfig,
) -> Placement {
    let bounds = viewport.inset(config.padding);
    match *mode {
        PlacementMode::Center => Placement {
            rect: clamp_into(centered_at(viewport.center(), size), &bounds),
            pivot: Vec2::HALF,
            side: None,
        },
        PlacementMode::Normalized { at } => Placement {
            rect: clamp_into(centered_at(viewport.point_at(at), size), &bounds),
            pivot: Vec2::HALF,
            side: None,
        },
        PlacementMode::Absolute { at } => {
            let center = Vec2::new(viewport.x + at.x, viewport.y + at.y);
            Placement {
                rect: clamp_into(centered_at(center, size), &bounds),
                pivot: Vec2::HALF,
                side: None,
            }
        }
        PlacementMode::NearTarget { target, side } => {
            let side = side.unwrap_or_else(|| choose_side(&viewport, &target));
            Placement {
                rect: near_target(&target, size, side, &bounds, config.gap),
                pivot: pivot_for(side),
                side: Some(side),
            }
        }
    }
}

fn near_target(target: &Rect, size: Size, side: Side, bounds: &Rect, gap: f32) -> Rect {
    let center = target.center();
    let (x, y) = match side {
        Side::Below => (center.x - size.width / 2.0, target.bottom() + gap),
        Side::Above => (center.x - size.width / 2.0, target.top() - gap - size.height),
        Side::Right => (target.right() + gap, center.y - size.height / 2.0),
        Side::Left => (target.left() - gap - size.width, center.y - size.height / 2.0),
    };
    let mut rect = clamp_into(Rect::new(x, y, size.width, size.height), bounds);

    // 夹紧后若侵入间距，沿所选轴向外推回；不与目标重叠优先于留在视口内
    match side {
        Side::Below => rect.y = rect.y.max(target.bottom() + gap),
        Side::Above => rect.y = rect.y.min(target.top() - gap - size.height),
        Side::Right => rect.x = rect.x.max(target.right() + gap),
        Side::Left => rect.x = rect.x.min(target.left() - gap - size.width),
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    const DIALOG: Size = Size::new(20.0, 8.0);

    fn config() -> PlacementConfig {
        PlacementConfig {
            gap: 1.0,
            padding: 1.0,
        }
    }

    fn near(target: Rect) -> Placement {
        place(
            VIEWPORT,
            DIALOG,
            &PlacementMode::NearTarget { target, side: None },
            config(),
        )
    }

    #[test]
    fn test_center() {
        let p = place(VIEWPORT, DIALOG, &PlacementMode::Center, config());
        assert_eq!(p.rect, Rect::new(40.0, 21.0, 20.0, 8.0));
        assert_eq!(p.pivot, Vec2::HALF);
    }

    #[test]
    fn test_target_flush_top_never_above_and_never_overlaps() {
        for x in [0.0, 10.0, 40.0, 80.0] {
            for width in [5.0, 20.0, 60.0] {
                let target = Rect::new(x, 0.0, width, 4.0);
                let p = near(target);
                assert_ne!(p.side, Some(Side::Above));
                assert!(!p.rect.intersects(&target.expand(config().gap - 0.001)));
            }
        }
    }

    #[test]
    fn test_tie_breaks_in_evaluation_order() {
        // 上下空间相等：选 Above
        let target = Rect::new(0.0, 20.0, 100.0, 10.0);
        assert_eq!(choose_side(&VIEWPORT, &target), Side::Above);

        // 上下左右全部相等
        let square = Rect::new(0.0, 0.0, 30.0, 30.0);
        let centered = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(choose_side(&square, &centered), Side::Above);
    }

    #[test]
    fn test_largest_space_wins() {
        let target = Rect::new(80.0, 20.0, 10.0, 5.0);
        assert_eq!(near(target).side, Some(Side::Left));
        let p = near(target);
        assert!((p.rect.right() - 79.0).abs() < f32::EPSILON);
        assert_eq!(p.pivot, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_clamped_to_padding() {
        // 目标贴左边，选 Below，水平方向被夹紧到内边距
        let viewport = Rect::new(0.0, 0.0, 40.0, 50.0);
        let target = Rect::new(0.0, 5.0, 4.0, 4.0);
        let p = place(
            viewport,
            DIALOG,
            &PlacementMode::NearTarget { target, side: None },
            config(),
        );
        assert_eq!(p.side, Some(Side::Below));
        assert!((p.rect.x - 1.0).abs() < f32::EPSILON);
        assert!((p.rect.y - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_forced_side_pushes_away_from_target() {
        // 强制 Above 但上方空间不足：夹紧会造成重叠，需沿 y 轴推回
        let target = Rect::new(40.0, 3.0, 20.0, 4.0);
        let p = place(
            VIEWPORT,
            DIALOG,
            &PlacementMode::NearTarget {
                target,
                side: Some(Side::Above),
            },
            config(),
        );
        assert_eq!(p.side, Some(Side::Above));
        assert!((p.rect.bottom() - 2.0).abs() < f32::EPSILON);
        assert!(!p.rect.intersects(&target));
    }

    #[test]
    fn test_normalized_and_absolute_are_clamped() {
        let p = place(
            VIEWPORT,
            DIALOG,
            &PlacementMode::Normalized {
                at: Vec2::new(1.0, 0.0),
            },
            config(),
        );
        assert_eq!(p.rect, Rect::new(79.0, 1.0, 20.0, 8.0));

        let p = place(
            VIEWPORT,
            DIALOG,
            &PlacementMode::Absolute {
                at: Vec2::new(30.0, 25.0),
            },
            config(),
        );
        assert_eq!(p.rect, Rect::new(20.0, 21.0, 20.0, 8.0));
    }
}

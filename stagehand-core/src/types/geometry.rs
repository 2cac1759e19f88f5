//! 布局几何类型
//!
//! Screen coordinates: origin at the top-left corner, y grows downward.

use serde::{Deserialize, Serialize};

/// 二维向量 / 点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const HALF: Self = Self { x: 0.5, y: 0.5 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 线性插值
    #[must_use]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

/// 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// 轴对齐矩形
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 由左上角与尺寸构造
    #[must_use]
    pub const fn from_origin_size(origin: Vec2, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// 严格相交（仅接触边缘不算相交）
    pub fn intersects(&self, other: &Self) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// 四边向外扩展 `amount`（负值为收缩，尺寸不会小于 0）
    #[must_use]
    pub fn expand(&self, amount: f32) -> Self {
        let width = (self.width + amount * 2.0).max(0.0);
        let height = (self.height + amount * 2.0).max(0.0);
        Self::new(
            self.center().x - width / 2.0,
            self.center().y - height / 2.0,
            width,
            height,
        )
    }

    /// 四边向内收缩 `amount`
    #[must_use]
    pub fn inset(&self, amount: f32) -> Self {
        self.expand(-amount)
    }

    /// Point inside the rect from a 0–1 fraction of its extent.
    pub fn point_at(&self, fraction: Vec2) -> Vec2 {
        Vec2::new(
            self.x + self.width * fraction.x,
            self.y + self.height * fraction.y,
        )
    }
}

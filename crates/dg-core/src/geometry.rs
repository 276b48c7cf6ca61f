//! Integer rectangle geometry
//!
//! Axis-aligned rectangles with half-open extents: a rectangle covers
//! `x..x + width` by `y..y + height`. The all-zero rectangle is the
//! "no rectangle" sentinel returned by failed intersections.

use serde::{Deserialize, Serialize};

/// Width/height pair used for sizes in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A point in layout space, used for line endpoints
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned rectangle on the integer grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// The "no rectangle" sentinel
    pub const ZERO: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub const fn x_max(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive far edge along Y
    pub const fn y_max(&self) -> i32 {
        self.y + self.height
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check whether this is the zero sentinel
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Squared diagonal length; orders rectangles the same way the
    /// diagonal magnitude does without floating point.
    pub const fn diagonal_squared(&self) -> i64 {
        let w = self.width as i64;
        let h = self.height as i64;
        w * w + h * h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x as f32 + self.width as f32 / 2.0,
            y: self.y as f32 + self.height as f32 / 2.0,
        }
    }

    /// Check if this rectangle overlaps another with positive area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x_max()
            && other.x < self.x_max()
            && self.y < other.y_max()
            && other.y < self.y_max()
    }

    /// Overlapping region of two rectangles, or [`Rect::ZERO`] when they
    /// do not overlap. Touching edges count as no overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        if !self.intersects(other) {
            return Rect::ZERO;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Rect::new(
            x,
            y,
            self.x_max().min(other.x_max()) - x,
            self.y_max().min(other.y_max()) - y,
        )
    }

    /// Check if this rectangle fully contains another
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.x_max() >= other.x_max()
            && self.y_max() >= other.y_max()
    }

    /// Grow by `amount` on every side
    pub const fn inflate(&self, amount: i32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2 * amount,
            self.height + 2 * amount,
        )
    }
}

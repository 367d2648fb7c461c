//! Geometry primitives shared by the layout algorithms.
//!
//! All values are logical pixels in `f32`, matching what the render tree
//! consumes. Comparisons go through the epsilon helpers at the bottom of
//! this module rather than raw `==`/`<`.

use std::ops::{Add, AddAssign, Sub};

use glam::Vec2;

/// Tolerance used by the float comparison helpers.
pub const EPSILON: f32 = 0.001;

/// Width and height of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a size.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The zero size.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Size as a vector (`x` = width, `y` = height).
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Shrink by padding on every side, never below zero.
    pub fn minus_padding(self, padding: &Padding) -> Self {
        Self::new(
            (self.width - padding.horizontal()).max(0.0),
            (self.height - padding.vertical()).max(0.0),
        )
    }

    /// Grow by padding on every side.
    pub fn plus_padding(self, padding: &Padding) -> Self {
        Self::new(self.width + padding.horizontal(), self.height + padding.vertical())
    }

    /// Clamp each dimension into `[min, max]`.
    pub fn constrain(self, min: Size, max: Size) -> Self {
        Self::new(
            self.width.max(min.width).min(max.width.max(min.width)),
            self.height.max(min.height).min(max.height.max(min.height)),
        )
    }

    /// Whether both dimensions are (nearly) zero.
    pub fn is_zero(&self) -> bool {
        near_zero(self.width) && near_zero(self.height)
    }
}

impl From<Vec2> for Size {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// A position, relative to the parent's content origin unless stated otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    /// Create an offset.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Offset as a vector.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn add_x(&mut self, dx: f32) {
        self.x += dx;
    }

    pub fn add_y(&mut self, dy: f32) {
        self.y += dy;
    }
}

impl From<Vec2> for Offset {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        *self = *self + rhs;
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a rectangle with position and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from an offset and a size.
    pub fn from_parts(offset: Offset, size: Size) -> Self {
        Self::new(offset.x, offset.y, size.width, size.height)
    }

    /// Create a rectangle from a position vector and a size vector.
    pub fn from_vecs(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn offset(&self) -> Offset {
        Offset::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the rectangle.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Bounding box of both rectangles.
    ///
    /// An empty rectangle (zero width and height) contributes its origin.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Intersection with another rectangle; an empty rectangle at the
    /// clamped origin when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x1 < x2 && y1 < y2 {
            Rect::new(x1, y1, x2 - x1, y2 - y1)
        } else {
            Rect::new(x1, y1, 0.0, 0.0)
        }
    }
}

/// Padding (or padding plus border) on all sides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    /// Create uniform padding.
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create symmetric padding.
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical padding.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Top-left corner of the content box.
    pub fn origin(&self) -> Offset {
        Offset::new(self.left, self.top)
    }
}

/// Computed geometry of a single node.
///
/// The frame is the border box; the margin frame adds the node's margin
/// around it. Parents position children by their margin frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryNode {
    frame_size: Size,
    frame_offset: Offset,
    margin: Padding,
}

impl GeometryNode {
    pub fn new(margin: Padding) -> Self {
        Self {
            margin,
            ..Default::default()
        }
    }

    pub fn frame_size(&self) -> Size {
        self.frame_size
    }

    pub fn set_frame_size(&mut self, size: Size) {
        self.frame_size = size;
    }

    pub fn frame_offset(&self) -> Offset {
        self.frame_offset
    }

    pub fn set_frame_offset(&mut self, offset: Offset) {
        self.frame_offset = offset;
    }

    pub fn margin(&self) -> Padding {
        self.margin
    }

    pub fn set_margin(&mut self, margin: Padding) {
        self.margin = margin;
    }

    /// Frame size including the margin.
    pub fn margin_frame_size(&self) -> Size {
        self.frame_size.plus_padding(&self.margin)
    }

    /// Offset of the margin box.
    pub fn margin_frame_offset(&self) -> Offset {
        self.frame_offset - self.margin.origin()
    }

    /// Position the node by its margin box.
    pub fn set_margin_frame_offset(&mut self, offset: Offset) {
        self.frame_offset = offset + self.margin.origin();
    }

    pub fn frame_rect(&self) -> Rect {
        Rect::from_parts(self.frame_offset, self.frame_size)
    }

    pub fn margin_frame_rect(&self) -> Rect {
        Rect::from_parts(self.margin_frame_offset(), self.margin_frame_size())
    }
}

pub fn near_zero(value: f32) -> bool {
    value.abs() <= EPSILON
}

pub fn near_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

pub fn less_or_equal(a: f32, b: f32) -> bool {
    a < b || near_equal(a, b)
}

pub fn great_or_equal(a: f32, b: f32) -> bool {
    a > b || near_equal(a, b)
}

/// `a > b` by more than the tolerance.
pub fn great_not_equal(a: f32, b: f32) -> bool {
    a > b && !near_equal(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_union_and_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        let union = a.union(&b);
        assert!(near_equal(union.width, 150.0));
        assert!(near_equal(union.height, 150.0));

        let inter = a.intersect(&b);
        assert!(near_equal(inter.x, 50.0));
        assert!(near_equal(inter.width, 50.0));
    }

    #[test]
    fn test_intersect_with_quadrant_drops_negative_part() {
        let rect = Rect::new(-20.0, -10.0, 120.0, 60.0);
        let clipped = rect.intersect(&Rect::new(0.0, 0.0, f32::INFINITY, f32::INFINITY));
        assert!(near_equal(clipped.x, 0.0));
        assert!(near_equal(clipped.width, 100.0));
        assert!(near_equal(clipped.height, 50.0));
    }

    #[test]
    fn test_margin_frame() {
        let mut geometry = GeometryNode::new(Padding::uniform(5.0));
        geometry.set_frame_size(Size::new(100.0, 40.0));
        geometry.set_margin_frame_offset(Offset::new(10.0, 10.0));

        assert_eq!(geometry.frame_offset(), Offset::new(15.0, 15.0));
        assert_eq!(geometry.margin_frame_size(), Size::new(110.0, 50.0));
        assert_eq!(geometry.margin_frame_offset(), Offset::new(10.0, 10.0));
    }

    #[test]
    fn test_size_constrain() {
        let size = Size::new(500.0, -3.0).constrain(Size::zero(), Size::new(300.0, 200.0));
        assert_eq!(size, Size::new(300.0, 0.0));
    }

    #[test]
    fn test_vec2_conversions() {
        let offset = Offset::new(3.0, 4.0);
        let size = Size::new(30.0, 40.0);
        let rect = Rect::from_vecs(offset.to_vec2(), size.to_vec2());
        assert_eq!(rect, Rect::from_parts(offset, size));
        assert_eq!(Offset::from(Vec2::new(1.0, 2.0)), Offset::new(1.0, 2.0));
        assert_eq!(Size::from(rect.size().to_vec2()), size);
    }

    #[test]
    fn test_offset_arithmetic() {
        let mut offset = Offset::new(10.0, 20.0) - Offset::new(4.0, 5.0);
        assert_eq!(offset, Offset::new(6.0, 15.0));
        offset += Offset::new(1.0, 1.0);
        assert_eq!(offset, Offset::new(7.0, 16.0));
    }

    #[test]
    fn test_float_helpers() {
        assert!(great_or_equal(300.0, 300.0004));
        assert!(!great_not_equal(300.0004, 300.0));
        assert!(less_or_equal(-0.0001, 0.0));
    }
}

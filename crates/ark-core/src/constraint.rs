//! Measure constraints passed from parent to child.

use crate::dimension::Dimension;
use crate::geometry::{Padding, Size};

/// A size where either dimension may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionalSize {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl OptionalSize {
    pub const fn new(width: Option<f32>, height: Option<f32>) -> Self {
        Self { width, height }
    }

    pub const fn fixed(width: f32, height: f32) -> Self {
        Self::new(Some(width), Some(height))
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = Some(width);
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = Some(height);
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    pub fn reset(&mut self) {
        self.width = None;
        self.height = None;
    }
}

/// Constraint a parent hands to a child's measure.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConstraint {
    pub min_size: Size,
    pub max_size: Size,
    /// Reference length for percentage dimensions.
    pub percent_reference: Size,
    /// Size the parent requires, overriding the child's own preference.
    pub self_ideal_size: OptionalSize,
}

impl LayoutConstraint {
    /// Loose constraint bounded by `max`.
    pub fn loose(max: Size) -> Self {
        Self {
            min_size: Size::zero(),
            max_size: max,
            percent_reference: max,
            self_ideal_size: OptionalSize::default(),
        }
    }

    /// Tight constraint forcing exactly `size`.
    pub fn tight(size: Size) -> Self {
        Self {
            min_size: size,
            max_size: size,
            percent_reference: size,
            self_ideal_size: OptionalSize::fixed(size.width, size.height),
        }
    }

    /// Ideal size on each axis, falling back to the max size
    /// (a "match parent" measure).
    pub fn ideal_or_max(&self) -> Size {
        Size::new(
            self.self_ideal_size.width.unwrap_or(self.max_size.width),
            self.self_ideal_size.height.unwrap_or(self.max_size.height),
        )
    }

    /// Replace the max size, keeping `min <= max`.
    pub fn update_max_size_with_check(&mut self, size: Size) {
        self.max_size = size;
        self.min_size.width = self.min_size.width.min(size.width);
        self.min_size.height = self.min_size.height.min(size.height);
    }

    /// Replace the min size, keeping `min <= max`.
    pub fn update_min_size_with_check(&mut self, size: Size) {
        self.min_size = Size::new(
            size.width.min(self.max_size.width),
            size.height.min(self.max_size.height),
        );
    }

    /// Clear the parent-imposed ideal size.
    pub fn reset(&mut self) {
        self.self_ideal_size.reset();
    }
}

/// Build the constraint a container passes to its children.
///
/// Children may use the container's content box; an unbounded content box
/// keeps the parent's percent reference.
pub fn create_child_constraint(parent: &LayoutConstraint, frame: Size, padding: &Padding) -> LayoutConstraint {
    let content = frame.minus_padding(padding);
    let mut percent_reference = content;
    if !percent_reference.width.is_finite() {
        percent_reference.width = parent.percent_reference.width;
    }
    if !percent_reference.height.is_finite() {
        percent_reference.height = parent.percent_reference.height;
    }
    LayoutConstraint {
        min_size: Size::zero(),
        max_size: content,
        percent_reference,
        self_ideal_size: OptionalSize::default(),
    }
}

/// User-declared size of a node (`width(...)`/`height(...)`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalcSize {
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
}

impl CalcSize {
    pub const fn new(width: Option<Dimension>, height: Option<Dimension>) -> Self {
        Self { width, height }
    }

    pub const fn px(width: f32, height: f32) -> Self {
        Self::new(Some(Dimension::px(width)), Some(Dimension::px(height)))
    }

    /// Whether width was declared with a concrete (non-auto) length.
    pub fn has_width(&self) -> bool {
        self.width.map_or(false, |w| !w.is_auto())
    }

    /// Whether height was declared with a concrete (non-auto) length.
    pub fn has_height(&self) -> bool {
        self.height.map_or(false, |h| !h.is_auto())
    }

    /// Unset or `Auto` width.
    pub fn is_auto_width(&self) -> bool {
        self.width.map_or(true, |w| w.is_auto())
    }

    /// Unset or `Auto` height.
    pub fn is_auto_height(&self) -> bool {
        self.height.map_or(true, |h| h.is_auto())
    }

    /// Resolve to pixels against a percent reference.
    pub fn resolve(&self, density: f32, reference: Size) -> OptionalSize {
        OptionalSize::new(
            self.width.and_then(|w| w.to_px(density, Some(reference.width))),
            self.height.and_then(|h| h.to_px(density, Some(reference.height))),
        )
    }
}

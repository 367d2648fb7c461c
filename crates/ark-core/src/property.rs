//! Per-node layout properties.
//!
//! Container-specific settings live in [`LayoutVariant`]; the layout tree
//! picks the algorithm for a node by matching on it.

use std::collections::BTreeMap;

use crate::constraint::{CalcSize, LayoutConstraint};
use crate::dimension::Dimension;
use crate::geometry::Padding;

/// Anchor name that refers to the enclosing relative container.
pub const CONTAINER_ANCHOR: &str = "__container__";

/// Visibility of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Visible,
    /// Takes space but is not drawn
    Hidden,
    /// Takes no space and is skipped by layout
    Gone,
}

/// Which edge or center line of a child an alignment rule positions.
///
/// The declaration order matters: rules are evaluated in this order, the
/// three horizontal directions first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlignDirection {
    Left,
    Middle,
    Right,
    Top,
    Center,
    Bottom,
}

impl AlignDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, AlignDirection::Left | AlignDirection::Middle | AlignDirection::Right)
    }
}

/// Horizontal line of the anchor a rule refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlign {
    Start,
    Center,
    End,
}

/// Vertical line of the anchor a rule refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

/// Alignment of one child line against a line of an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignRule {
    /// Sibling id, or [`CONTAINER_ANCHOR`]
    pub anchor: String,
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
}

impl AlignRule {
    pub fn horizontal(anchor: impl Into<String>, align: HorizontalAlign) -> Self {
        Self {
            anchor: anchor.into(),
            horizontal: Some(align),
            vertical: None,
        }
    }

    pub fn vertical(anchor: impl Into<String>, align: VerticalAlign) -> Self {
        Self {
            anchor: anchor.into(),
            horizontal: None,
            vertical: Some(align),
        }
    }

    pub fn is_container_anchor(&self) -> bool {
        self.anchor == CONTAINER_ANCHOR
    }
}

/// Rules of one child, keyed and ordered by direction.
pub type AlignRules = BTreeMap<AlignDirection, AlignRule>;

/// Position of a child between two opposing alignment lines.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bias {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for Bias {
    fn default() -> Self {
        Self {
            horizontal: 0.5,
            vertical: 0.5,
        }
    }
}

/// Properties a node carries as the item of a flex-like container.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlexItemProperty {
    pub align_rules: AlignRules,
    pub bias: Option<Bias>,
    pub flex_grow: Option<f32>,
}

impl FlexItemProperty {
    pub fn has_align_rules(&self) -> bool {
        !self.align_rules.is_empty()
    }

    pub fn with_rule(mut self, direction: AlignDirection, rule: AlignRule) -> Self {
        self.align_rules.insert(direction, rule);
        self
    }

    pub fn with_bias(mut self, horizontal: f32, vertical: f32) -> Self {
        self.bias = Some(Bias { horizontal, vertical });
        self
    }

    pub fn with_flex_grow(mut self, grow: f32) -> Self {
        self.flex_grow = Some(grow);
        self
    }
}

/// Direction contents are laid out in a wrap container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapDirection {
    /// Items fill rows left to right
    #[default]
    Horizontal,
    /// Items fill columns top to bottom
    Vertical,
    HorizontalReverse,
    VerticalReverse,
}

impl WrapDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, WrapDirection::Horizontal | WrapDirection::HorizontalReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, WrapDirection::HorizontalReverse | WrapDirection::VerticalReverse)
    }
}

/// Flex direction of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

/// Alignment policy used for `alignContent`, `justifyContent` and `alignItems`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapAlignment {
    #[default]
    Start,
    Center,
    End,
    SpaceAround,
    SpaceBetween,
    SpaceEvenly,
    Stretch,
    Baseline,
}

/// Settings of a wrap container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WrapProperty {
    pub direction: WrapDirection,
    pub flex_direction: FlexDirection,
    /// `alignContent`: placement of contents on the cross axis
    pub alignment: WrapAlignment,
    /// `justifyContent`: placement of items on the main axis
    pub main_alignment: WrapAlignment,
    /// `alignItems`: placement of items within their content's cross extent
    pub cross_alignment: WrapAlignment,
    /// Gap between items of one content
    pub spacing: Dimension,
    /// Gap between contents
    pub content_space: Dimension,
}

impl WrapProperty {
    pub fn horizontal() -> Self {
        Self::default()
    }

    pub fn vertical() -> Self {
        Self {
            direction: WrapDirection::Vertical,
            flex_direction: FlexDirection::Column,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: WrapDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_flex_direction(mut self, flex_direction: FlexDirection) -> Self {
        self.flex_direction = flex_direction;
        self
    }

    pub fn with_align_content(mut self, alignment: WrapAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_justify_content(mut self, alignment: WrapAlignment) -> Self {
        self.main_alignment = alignment;
        self
    }

    pub fn with_align_items(mut self, alignment: WrapAlignment) -> Self {
        self.cross_alignment = alignment;
        self
    }

    pub fn with_spacing(mut self, spacing: Dimension) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_content_space(mut self, space: Dimension) -> Self {
        self.content_space = space;
        self
    }
}

/// Which layout algorithm a node runs for its children.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutVariant {
    /// No children to arrange; measured from content
    #[default]
    Leaf,
    Relative,
    Wrap(WrapProperty),
}

/// Layout-relevant properties of a node.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutProperty {
    /// Stable identifier other nodes can anchor to
    pub inspector_id: Option<String>,
    pub visibility: Visibility,
    pub flex_item: Option<FlexItemProperty>,
    /// User-declared size
    pub calc_size: Option<CalcSize>,
    /// Padding plus border
    pub padding: Padding,
    pub margin: Padding,
    /// Absolutely positioned; excluded from flow packing
    pub out_of_layout: bool,
    /// Last constraint handed down by the parent
    pub layout_constraint: Option<LayoutConstraint>,
    pub variant: LayoutVariant,
}

impl LayoutProperty {
    pub fn new(variant: LayoutVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.inspector_id = Some(id.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_flex_item(mut self, flex_item: FlexItemProperty) -> Self {
        self.flex_item = Some(flex_item);
        self
    }

    pub fn with_size(mut self, size: CalcSize) -> Self {
        self.calc_size = Some(size);
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_margin(mut self, margin: Padding) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_out_of_layout(mut self, out_of_layout: bool) -> Self {
        self.out_of_layout = out_of_layout;
        self
    }

    pub fn is_gone(&self) -> bool {
        self.visibility == Visibility::Gone
    }

    pub fn align_rules(&self) -> Option<&AlignRules> {
        self.flex_item
            .as_ref()
            .map(|item| &item.align_rules)
            .filter(|rules| !rules.is_empty())
    }

    pub fn flex_grow(&self) -> f32 {
        self.flex_item.as_ref().and_then(|item| item.flex_grow).unwrap_or(0.0)
    }

    pub fn has_ideal_width(&self) -> bool {
        self.calc_size.map_or(false, |size| size.has_width())
    }

    pub fn has_ideal_height(&self) -> bool {
        self.calc_size.map_or(false, |size| size.has_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_order_puts_horizontal_first() {
        let mut rules = AlignRules::new();
        rules.insert(AlignDirection::Bottom, AlignRule::vertical("a", VerticalAlign::Top));
        rules.insert(AlignDirection::Right, AlignRule::horizontal("a", HorizontalAlign::End));
        rules.insert(AlignDirection::Left, AlignRule::horizontal(CONTAINER_ANCHOR, HorizontalAlign::Start));

        let order: Vec<_> = rules.keys().copied().collect();
        assert_eq!(order, vec![AlignDirection::Left, AlignDirection::Right, AlignDirection::Bottom]);
        assert!(rules[&AlignDirection::Left].is_container_anchor());
    }

    #[test]
    fn test_empty_rules_are_absent() {
        let property = LayoutProperty::default().with_flex_item(FlexItemProperty::default());
        assert!(property.align_rules().is_none());
        assert_eq!(property.flex_grow(), 0.0);
    }
}

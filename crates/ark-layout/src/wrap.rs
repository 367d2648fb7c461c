//! Wrap (flow) layout.
//!
//! Children are packed greedily along the main axis into *contents* (rows
//! for a horizontal wrap, columns for a vertical one). A child that does
//! not fit opens a new content. Layout then distributes contents along the
//! cross axis (`alignContent`), items within a content along the main axis
//! (`justifyContent`, flex grow) and each item within its content's cross
//! extent (`alignItems`).

use ark_core::{
    create_child_constraint, great_not_equal, great_or_equal, LayoutConstraint, LayoutContext, LayoutError,
    LayoutVariant, LayoutWrapper, NodeId, Offset, Padding, Size, WrapAlignment, WrapDirection, WrapProperty,
    API_VERSION_ELEVEN, API_VERSION_TEN,
};
use smallvec::SmallVec;
use tracing::trace;

/// One row (or column) of packed items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentInfo {
    /// Sum of item main lengths plus the spacing between them
    pub main_length: f32,
    /// Largest item cross length
    pub cross_length: f32,
    pub count: usize,
    pub items: SmallVec<[NodeId; 8]>,
    pub max_baseline_distance: f32,
}

/// Per-pass state of a wrap container.
#[derive(Debug, Clone, Default)]
pub struct WrapLayoutAlgorithm {
    property: WrapProperty,
    is_horizontal: bool,
    is_reverse: bool,
    is_flex_reverse: bool,
    has_ideal_width: bool,
    has_ideal_height: bool,
    /// Content-box length available on the main axis
    main_length_limit: f32,
    /// Content-box length available on the cross axis
    cross_length_limit: f32,
    total_main_length: f32,
    total_cross_length: f32,
    spacing: f32,
    content_space: f32,
    padding: Padding,
    frame_size: Size,
    child_constraint: LayoutConstraint,
    content_list: Vec<ContentInfo>,
    out_of_layout_children: Vec<NodeId>,
}

impl WrapLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents packed by the last measure.
    pub fn contents(&self) -> &[ContentInfo] {
        &self.content_list
    }

    /// Children excluded from packing by the last measure.
    pub fn out_of_layout_children(&self) -> &[NodeId] {
        &self.out_of_layout_children
    }

    pub fn total_main_length(&self) -> f32 {
        self.total_main_length
    }

    pub fn total_cross_length(&self) -> f32 {
        self.total_cross_length
    }

    fn main_of(&self, size: Size) -> f32 {
        if self.is_horizontal {
            size.width
        } else {
            size.height
        }
    }

    fn cross_of(&self, size: Size) -> f32 {
        if self.is_horizontal {
            size.height
        } else {
            size.width
        }
    }

    fn size_from_axes(&self, main: f32, cross: f32) -> Size {
        if self.is_horizontal {
            Size::new(main, cross)
        } else {
            Size::new(cross, main)
        }
    }

    fn main_offset(&self, offset: Offset) -> f32 {
        if self.is_horizontal {
            offset.x
        } else {
            offset.y
        }
    }

    fn cross_offset(&self, offset: Offset) -> f32 {
        if self.is_horizontal {
            offset.y
        } else {
            offset.x
        }
    }

    fn has_ideal_cross(&self) -> bool {
        if self.is_horizontal {
            self.has_ideal_height
        } else {
            self.has_ideal_width
        }
    }

    /// Reversal used for placement: direction reversal before API 10,
    /// flex-direction reversal from API 10 on.
    fn placement_reversed(&self, ctx: &LayoutContext) -> bool {
        if ctx.at_least(API_VERSION_TEN) {
            self.is_flex_reverse
        } else {
            self.is_reverse
        }
    }

    fn item_main_length<W: LayoutWrapper + ?Sized>(&self, wrapper: &W, item: NodeId) -> Result<f32, LayoutError> {
        Ok(self.main_of(wrapper.geometry(item)?.margin_frame_size()))
    }

    fn item_cross_length<W: LayoutWrapper + ?Sized>(&self, wrapper: &W, item: NodeId) -> Result<f32, LayoutError> {
        Ok(self.cross_of(wrapper.geometry(item)?.margin_frame_size()))
    }

    /// Limits from the container's ideal size, else its max size.
    fn perform_layout_initialize(&mut self, constraint: &LayoutConstraint) {
        let ideal = constraint.self_ideal_size;
        self.has_ideal_width = ideal.width.is_some();
        self.has_ideal_height = ideal.height.is_some();
        let limits = constraint.ideal_or_max();
        self.main_length_limit = self.main_of(limits);
        self.cross_length_limit = self.cross_of(limits);
    }

    /// Re-measure items shorter than their content on the cross axis.
    fn stretch_items_in_content<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &mut W,
        content: &ContentInfo,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        if self.property.cross_alignment != WrapAlignment::Stretch {
            return Ok(());
        }
        let mut constraint = self.child_constraint;
        for &item in &content.items {
            if ctx.at_least(API_VERSION_TEN) && self.user_defined_cross_axis_size(wrapper, item)? {
                continue;
            }
            if great_not_equal(content.cross_length, self.item_cross_length(wrapper, item)?) {
                if self.is_horizontal {
                    constraint.self_ideal_size.set_height(content.cross_length);
                } else {
                    constraint.self_ideal_size.set_width(content.cross_length);
                }
                wrapper.measure(item, &constraint, ctx)?;
            }
        }
        Ok(())
    }

    fn user_defined_cross_axis_size<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        item: NodeId,
    ) -> Result<bool, LayoutError> {
        let Some(calc_size) = wrapper.layout_property(item)?.calc_size else {
            return Ok(false);
        };
        Ok(if self.is_horizontal {
            calc_size.height.is_some()
        } else {
            calc_size.width.is_some()
        })
    }

    /// Finish a content: drop the trailing spacing, stretch and record it.
    fn close_content<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        mut content: ContentInfo,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        content.main_length -= self.spacing;
        self.stretch_items_in_content(wrapper, &content, ctx)?;
        self.total_main_length = self.total_main_length.max(content.main_length);
        self.total_cross_length += content.cross_length;
        self.content_list.push(content);
        Ok(())
    }

    /// Move `start` by `extra_space` along an axis, against the axis when
    /// placement is reversed.
    fn add_extra_space_to_start_position(&self, start: &mut Offset, extra_space: f32, on_main_axis: bool, ctx: &LayoutContext) {
        let extra_space = if self.placement_reversed(ctx) { -extra_space } else { extra_space };
        if on_main_axis == self.is_horizontal {
            start.add_x(extra_space);
        } else {
            start.add_y(extra_space);
        }
    }

    fn add_padding_to_start_position(&self, start: &mut Offset, ctx: &LayoutContext) {
        let padding = self.padding;
        if ctx.at_least(API_VERSION_TEN) {
            let flip = |value: f32| if self.is_flex_reverse { -value } else { value };
            match self.property.direction {
                WrapDirection::Horizontal => {
                    start.add_x(flip(padding.left));
                    start.add_y(padding.top);
                }
                WrapDirection::Vertical => {
                    start.add_x(padding.left);
                    start.add_y(flip(padding.top));
                }
                WrapDirection::HorizontalReverse => {
                    start.add_x(flip(padding.right));
                    start.add_y(padding.top);
                }
                WrapDirection::VerticalReverse => {
                    start.add_x(padding.left);
                    start.add_y(flip(padding.bottom));
                }
            }
        } else {
            match self.property.direction {
                WrapDirection::Horizontal | WrapDirection::Vertical => {
                    start.add_x(padding.left);
                    start.add_y(padding.top);
                }
                WrapDirection::HorizontalReverse => {
                    start.add_x(-padding.right);
                    start.add_y(padding.top);
                }
                WrapDirection::VerticalReverse => {
                    start.add_x(padding.left);
                    start.add_y(-padding.bottom);
                }
            }
        }
    }

    /// Start position of the first content and the extra gap between
    /// contents, from padding, reversal and `alignContent`.
    fn layout_whole_wrap(&self, ctx: &LayoutContext) -> (Offset, f32) {
        let mut start = Offset::zero();
        if self.content_list.is_empty() {
            return (start, 0.0);
        }
        self.add_padding_to_start_position(&mut start, ctx);
        if self.placement_reversed(ctx) {
            self.add_extra_space_to_start_position(&mut start, -self.main_of(self.frame_size), true, ctx);
        }

        // Without an ideal cross size the container already hugs its contents.
        if !self.has_ideal_cross() || self.cross_length_limit <= self.total_cross_length {
            return (start, 0.0);
        }

        let content_count = self.content_list.len() as f32;
        let remain = self.cross_length_limit - self.total_cross_length;
        let signed_remain = if self.placement_reversed(ctx) { -remain } else { remain };
        match self.property.alignment {
            WrapAlignment::End => {
                self.add_extra_space_to_start_position(&mut start, signed_remain, false, ctx);
                (start, 0.0)
            }
            WrapAlignment::Center => {
                self.add_extra_space_to_start_position(&mut start, signed_remain / 2.0, false, ctx);
                (start, 0.0)
            }
            WrapAlignment::SpaceBetween => {
                let space = if self.content_list.len() > 1 {
                    remain / (content_count - 1.0)
                } else {
                    0.0
                };
                (start, space)
            }
            WrapAlignment::SpaceEvenly => {
                let space = signed_remain / (content_count + 1.0);
                self.add_extra_space_to_start_position(&mut start, space, false, ctx);
                (start, space.abs())
            }
            WrapAlignment::SpaceAround => {
                let space = signed_remain / content_count;
                self.add_extra_space_to_start_position(&mut start, space / 2.0, false, ctx);
                (start, space.abs())
            }
            WrapAlignment::Start | WrapAlignment::Stretch | WrapAlignment::Baseline => (start, 0.0),
        }
    }

    /// Lay out every content, advancing along the cross axis.
    fn traverse_content<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        start: Offset,
        space_between: f32,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        let reversed = ctx.at_least(API_VERSION_TEN) && self.is_reverse != self.is_flex_reverse;
        let mut position = start;
        let contents = std::mem::take(&mut self.content_list);
        let mut ordered: Vec<&ContentInfo> = contents.iter().collect();
        if reversed {
            ordered.reverse();
        }
        for content in ordered {
            self.layout_content(wrapper, content, position, ctx)?;
            let advance = content.cross_length + self.content_space + space_between;
            if self.is_horizontal {
                position.add_y(advance);
            } else {
                position.add_x(advance);
            }
        }
        self.content_list = contents;
        Ok(())
    }

    /// Main-axis start and gap between items from `justifyContent`.
    fn calc_item_main_axis_start_and_space_between(
        &self,
        start: &mut Offset,
        content: &ContentInfo,
        ctx: &LayoutContext,
    ) -> f32 {
        let left = self.main_length_limit - content.main_length;
        let count = content.count as f32;
        match self.property.main_alignment {
            WrapAlignment::End => {
                self.add_extra_space_to_start_position(start, left, true, ctx);
                0.0
            }
            WrapAlignment::Center => {
                self.add_extra_space_to_start_position(start, left / 2.0, true, ctx);
                0.0
            }
            WrapAlignment::SpaceBetween => {
                if content.count > 1 {
                    left / (count - 1.0)
                } else {
                    0.0
                }
            }
            WrapAlignment::SpaceEvenly => {
                let space = left / (count + 1.0);
                self.add_extra_space_to_start_position(start, space, true, ctx);
                space
            }
            WrapAlignment::SpaceAround => {
                let space = left / count;
                self.add_extra_space_to_start_position(start, space / 2.0, true, ctx);
                space
            }
            WrapAlignment::Start | WrapAlignment::Stretch | WrapAlignment::Baseline => 0.0,
        }
    }

    /// Cross offset of an item from `alignItems`. Baseline alignment is
    /// not supported and places items like `Start`.
    fn calc_item_cross_axis_offset(&self, content: &ContentInfo, content_offset: Offset, item_size: Size) -> f32 {
        let start = self.cross_offset(content_offset);
        match self.property.cross_alignment {
            WrapAlignment::End => start + content.cross_length - self.cross_of(item_size),
            WrapAlignment::Center => start + (content.cross_length - self.cross_of(item_size)) / 2.0,
            _ => start,
        }
    }

    /// Main length of the content counting trailing spacing, and the
    /// summed flex grow of its items.
    fn get_flex_item_properties<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        content: &ContentInfo,
    ) -> Result<(f32, f32), LayoutError> {
        let mut current_main_length = 0.0;
        let mut total_grow = 0.0;
        for &item in &content.items {
            current_main_length += self.item_main_length(wrapper, item)? + self.spacing;
            let grow = wrapper.layout_property(item)?.flex_grow();
            if great_not_equal(grow, 0.0) {
                total_grow += grow;
            }
        }
        Ok((current_main_length, total_grow))
    }

    /// Grow an item by its share of the remaining main-axis space.
    fn calc_flex_grow_layout<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &mut W,
        item: NodeId,
        total_grow: f32,
        remain: f32,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        let property = wrapper.layout_property(item)?;
        let grow = property.flex_grow();
        let Some(mut constraint) = property.layout_constraint else {
            return Ok(());
        };
        if !(great_not_equal(grow, 0.0) && great_not_equal(remain, 0.0) && great_not_equal(total_grow, 0.0)) {
            return Ok(());
        }
        let flex_size = grow * remain / total_grow + self.item_main_length(wrapper, item)?;
        if self.is_horizontal {
            constraint.self_ideal_size.set_width(flex_size);
        } else {
            constraint.self_ideal_size.set_height(flex_size);
        }
        wrapper.measure(item, &constraint, ctx)
    }

    fn layout_content<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &mut W,
        content: &ContentInfo,
        position: Offset,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        if content.count == 0 {
            return Ok(());
        }
        let mut start = position;
        let space_between = self.calc_item_main_axis_start_and_space_between(&mut start, content, ctx);
        let (current_main_length, total_grow) = self.get_flex_item_properties(wrapper, content)?;
        let remain = self.main_length_limit - current_main_length;
        let reversed = self.placement_reversed(ctx);

        for &item in &content.items {
            if great_not_equal(remain, 0.0) {
                self.calc_flex_grow_layout(wrapper, item, total_grow, remain, ctx)?;
            }
            let item_size = wrapper.geometry(item)?.margin_frame_size();
            let item_main = self.main_of(item_size);
            let mut main_offset = self.main_offset(start);
            if reversed {
                main_offset -= item_main;
            }
            let cross_offset = self.calc_item_cross_axis_offset(content, start, item_size);
            let offset = if self.is_horizontal {
                Offset::new(main_offset, cross_offset)
            } else {
                Offset::new(cross_offset, main_offset)
            };
            trace!(item = %item, x = offset.x, y = offset.y, "wrap item placed");
            wrapper.geometry_mut(item)?.set_margin_frame_offset(offset);

            let span = item_main + self.spacing + space_between;
            let span = if reversed { -span } else { span };
            if self.is_horizontal {
                start.add_x(span);
            } else {
                start.add_y(span);
            }
        }
        Ok(())
    }
}

impl crate::algorithm::LayoutAlgorithm for WrapLayoutAlgorithm {
    fn measure<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        let children = wrapper.children(node)?;
        if children.is_empty() {
            wrapper.geometry_mut(node)?.set_frame_size(Size::zero());
            self.content_list.clear();
            return Ok(());
        }

        let property = wrapper.layout_property(node)?;
        let LayoutVariant::Wrap(wrap) = property.variant else {
            return Err(LayoutError::NotAContainer { node });
        };
        let constraint = property
            .layout_constraint
            .ok_or(LayoutError::MissingConstraint { node })?;
        let padding = property.padding;
        let calc_size = property.calc_size;

        *self = Self {
            property: wrap,
            is_horizontal: wrap.direction.is_horizontal(),
            is_reverse: wrap.direction.is_reverse(),
            is_flex_reverse: wrap.flex_direction.is_reverse(),
            padding,
            spacing: wrap.spacing.to_px(ctx.density, None).unwrap_or(0.0),
            content_space: wrap.content_space.to_px(ctx.density, None).unwrap_or(0.0),
            ..Self::default()
        };
        self.perform_layout_initialize(&constraint);

        let limits = self.size_from_axes(self.main_length_limit, self.cross_length_limit);
        self.child_constraint = create_child_constraint(&constraint, limits, &padding);
        self.main_length_limit = self.main_of(self.child_constraint.max_size);
        self.cross_length_limit = self.cross_of(self.child_constraint.max_size);

        let mut current = ContentInfo::default();
        for child in children {
            let child_property = wrapper.layout_property(child)?;
            if child_property.is_gone() {
                continue;
            }
            let out_of_layout = child_property.out_of_layout;
            wrapper.measure(child, &self.child_constraint, ctx)?;
            if out_of_layout {
                self.out_of_layout_children.push(child);
                continue;
            }

            let item_main = self.item_main_length(wrapper, child)?;
            let item_cross = self.item_cross_length(wrapper, child)?;
            let fits = great_or_equal(self.main_length_limit, current.main_length + item_main);
            if !fits && current.count > 0 {
                let content = std::mem::take(&mut current);
                self.close_content(wrapper, content, ctx)?;
                self.total_cross_length += self.content_space;
            }
            current.main_length += item_main + self.spacing;
            current.cross_length = current.cross_length.max(item_cross);
            if self.property.cross_alignment == WrapAlignment::Baseline {
                current.max_baseline_distance = current.max_baseline_distance.max(wrapper.baseline_distance(child)?);
            }
            current.items.push(child);
            current.count += 1;
        }
        if current.count > 0 {
            self.close_content(wrapper, current, ctx)?;
        }

        let cross = if self.has_ideal_cross() {
            self.cross_length_limit
        } else {
            self.total_cross_length
        };
        let mut frame = self.size_from_axes(self.main_length_limit, cross).plus_padding(&padding);
        if ctx.at_least(API_VERSION_ELEVEN) {
            if let Some(calc_size) = calc_size {
                let resolved = calc_size.resolve(ctx.density, constraint.percent_reference);
                frame.width = resolved.width.unwrap_or(frame.width);
                frame.height = resolved.height.unwrap_or(frame.height);
            }
        }
        self.frame_size = frame;
        wrapper.geometry_mut(node)?.set_frame_size(frame);
        Ok(())
    }

    fn layout<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        let children = wrapper.children(node)?;
        if children.is_empty() {
            return Ok(());
        }
        let (start, space_between) = self.layout_whole_wrap(ctx);
        self.traverse_content(wrapper, start, space_between, ctx)?;

        let origin = self.padding.origin();
        for &child in &self.out_of_layout_children {
            wrapper.geometry_mut(child)?.set_margin_frame_offset(origin);
        }
        for child in children {
            wrapper.layout(child, ctx)?;
        }
        Ok(())
    }
}

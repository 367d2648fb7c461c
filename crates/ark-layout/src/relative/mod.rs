//! Relative container layout.
//!
//! Children position themselves by alignment rules against sibling anchors
//! or the container. Each measure pass:
//!
//! 1. collects identified children into a [`DependencyGraph`],
//! 2. rejects cyclic rule sets (every child collapses to zero size),
//! 3. measures children in topological order so anchors are placed before
//!    their dependents,
//! 4. sizes an auto-sized container to its placed children.
//!
//! Layout then applies the recorded offsets.

mod graph;

pub use graph::DependencyGraph;

use std::collections::HashMap;

use ark_core::{
    create_child_constraint, great_or_equal, AlignDirection, AlignRule, AlignRules, HorizontalAlign,
    LayoutConstraint, LayoutContext, LayoutError, LayoutWrapper, NodeId, Offset, OptionalSize, Padding, Rect,
    Size, VerticalAlign, API_VERSION_ELEVEN,
};
use tracing::{debug, warn};

/// Default position between two opposing alignment lines.
pub const DEFAULT_BIAS: f32 = 0.5;

/// Alignment values resolved for one child, per direction.
///
/// At most two values per axis are collected; further rules on a
/// saturated axis are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlignState {
    values: [Option<f32>; 6],
}

impl AlignState {
    fn slot(direction: AlignDirection) -> usize {
        match direction {
            AlignDirection::Left => 0,
            AlignDirection::Middle => 1,
            AlignDirection::Right => 2,
            AlignDirection::Top => 3,
            AlignDirection::Center => 4,
            AlignDirection::Bottom => 5,
        }
    }

    pub fn get(&self, direction: AlignDirection) -> Option<f32> {
        self.values[Self::slot(direction)]
    }

    pub fn set(&mut self, direction: AlignDirection, value: f32) {
        self.values[Self::slot(direction)] = Some(value);
    }

    fn count(&self, range: std::ops::Range<usize>) -> usize {
        self.values[range].iter().filter(|value| value.is_some()).count()
    }

    pub fn two_horizontal_aligned(&self) -> bool {
        self.count(0..3) >= 2
    }

    pub fn two_vertical_aligned(&self) -> bool {
        self.count(3..6) >= 2
    }

    /// Ideal width spanned by the two horizontal values.
    pub fn horizontal_span(&self) -> Option<f32> {
        if !self.two_horizontal_aligned() {
            return None;
        }
        Some(Self::span(
            self.get(AlignDirection::Left),
            self.get(AlignDirection::Middle),
            self.get(AlignDirection::Right),
        ))
    }

    /// Ideal height spanned by the two vertical values.
    pub fn vertical_span(&self) -> Option<f32> {
        if !self.two_vertical_aligned() {
            return None;
        }
        Some(Self::span(
            self.get(AlignDirection::Top),
            self.get(AlignDirection::Center),
            self.get(AlignDirection::Bottom),
        ))
    }

    fn span(start: Option<f32>, middle: Option<f32>, end: Option<f32>) -> f32 {
        match (start, middle, end) {
            (Some(start), Some(middle), _) => 2.0 * (middle - start).max(0.0),
            (None, Some(middle), Some(end)) => 2.0 * (end - middle).max(0.0),
            (start, _, end) => (end.unwrap_or(0.0) - start.unwrap_or(0.0)).max(0.0),
        }
    }
}

/// Per-pass state of a relative container.
#[derive(Debug, Clone, Default)]
pub struct RelativeContainerLayoutAlgorithm {
    graph: DependencyGraph,
    render_list: Vec<String>,
    record_offsets: HashMap<String, Offset>,
    /// Content box of the container
    container_size: Size,
    padding: Padding,
    child_constraint: LayoutConstraint,
    /// Container max size with no minimum, for children outside relative placement
    max_constraint: LayoutConstraint,
    loop_detected: bool,
}

impl RelativeContainerLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identified children in the order they were measured.
    pub fn render_list(&self) -> &[String] {
        &self.render_list
    }

    /// Offset recorded for an identified child, relative to the content box.
    pub fn recorded_offset(&self, id: &str) -> Option<Offset> {
        self.record_offsets.get(id).copied()
    }

    /// Whether the last pass found cyclic alignment rules.
    pub fn loop_detected(&self) -> bool {
        self.loop_detected
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    fn reset(&mut self) {
        self.graph = DependencyGraph::new();
        self.render_list.clear();
        self.record_offsets.clear();
        self.loop_detected = false;
    }

    /// Size the container, build the dependency graph and compute the
    /// render order. Returns `false` if the rules form a cycle.
    fn determine_topological_order<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        children: &[NodeId],
        ctx: &LayoutContext,
    ) -> Result<bool, LayoutError> {
        let property = wrapper.layout_property(node)?;
        let constraint = property
            .layout_constraint
            .ok_or(LayoutError::MissingConstraint { node })?;
        self.padding = property.padding;

        let frame = constraint.ideal_or_max();
        wrapper.geometry_mut(node)?.set_frame_size(frame);
        self.container_size = frame.minus_padding(&self.padding);
        self.child_constraint = create_child_constraint(&constraint, frame, &self.padding);
        self.max_constraint = LayoutConstraint {
            min_size: Size::zero(),
            max_size: constraint.max_size,
            ..self.child_constraint
        };

        self.collect_nodes_by_id(wrapper, children, ctx)?;
        self.get_dependency_relationship(wrapper)?;

        if !self.graph.pre_topological_loop_detection() {
            warn!(
                container = %node,
                nodes = ?self.graph.loop_dependent_nodes(),
                "alignment rules of relative container form a cycle"
            );
            let collapsed = LayoutConstraint {
                self_ideal_size: OptionalSize::fixed(0.0, 0.0),
                ..self.child_constraint
            };
            for &child in children {
                wrapper.set_active(child, false)?;
                wrapper.measure(child, &collapsed, ctx)?;
            }
            return Ok(false);
        }

        self.render_list = self.graph.topological_sort();
        debug!(container = %node, order = ?self.render_list, "relative container render order");
        Ok(true)
    }

    /// Register identified children. Children with an empty id stay active
    /// at the padding origin, children without one are deactivated; both are
    /// measured right away against the container's max size.
    fn collect_nodes_by_id<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        children: &[NodeId],
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        for &child in children {
            let property = wrapper.layout_property(child)?;
            match property.inspector_id.as_deref() {
                Some("") => {
                    wrapper.set_active(child, true)?;
                    wrapper.measure(child, &self.max_constraint, ctx)?;
                }
                Some(id) => {
                    let rules = property.align_rules().cloned().unwrap_or_default();
                    self.graph.insert(id, child, rules);
                    wrapper.set_active(child, true)?;
                }
                None => {
                    wrapper.set_active(child, false)?;
                    wrapper.measure(child, &self.max_constraint, ctx)?;
                }
            }
        }
        Ok(())
    }

    /// Build edges and deactivate children anchored to GONE siblings.
    fn get_dependency_relationship<W: LayoutWrapper + ?Sized>(&mut self, wrapper: &mut W) -> Result<(), LayoutError> {
        self.graph.build_dependencies();

        let mut hidden_dependents = Vec::new();
        for (anchor, anchor_node) in self.graph.entries() {
            if wrapper.layout_property(anchor_node)?.is_gone() {
                hidden_dependents.extend(self.graph.dependents(anchor).filter_map(|id| self.graph.node(id)));
            }
        }
        for dependent in hidden_dependents {
            wrapper.set_active(dependent, false)?;
        }
        Ok(())
    }

    /// Offset and margin size of a rule's anchor; the container (or an
    /// unknown id) spans the content box from the origin.
    fn anchor_extent<W: LayoutWrapper + ?Sized>(&self, wrapper: &W, rule: &AlignRule) -> Result<(Offset, Size), LayoutError> {
        match self.graph.node(&rule.anchor) {
            Some(anchor) if !rule.is_container_anchor() => {
                let offset = self.record_offsets.get(&rule.anchor).copied().unwrap_or_default();
                Ok((offset, wrapper.geometry(anchor)?.margin_frame_size()))
            }
            _ => Ok((Offset::zero(), self.container_size)),
        }
    }

    /// Anchor value along the horizontal axis, if the rule names one.
    fn horizontal_align_value<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        rule: &AlignRule,
    ) -> Result<Option<f32>, LayoutError> {
        let Some(align) = rule.horizontal else {
            return Ok(None);
        };
        let (offset, size) = self.anchor_extent(wrapper, rule)?;
        let (start, extent) = (offset.x, size.width);
        Ok(Some(match align {
            HorizontalAlign::Start => start,
            HorizontalAlign::Center => start + extent / 2.0,
            HorizontalAlign::End => start + extent,
        }))
    }

    /// Anchor value along the vertical axis, if the rule names one.
    fn vertical_align_value<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        rule: &AlignRule,
    ) -> Result<Option<f32>, LayoutError> {
        let Some(align) = rule.vertical else {
            return Ok(None);
        };
        let (offset, size) = self.anchor_extent(wrapper, rule)?;
        let (start, extent) = (offset.y, size.height);
        Ok(Some(match align {
            VerticalAlign::Top => start,
            VerticalAlign::Center => start + extent / 2.0,
            VerticalAlign::Bottom => start + extent,
        }))
    }

    fn is_resolvable(&self, rule: &AlignRule) -> bool {
        rule.is_container_anchor() || self.graph.contains(&rule.anchor)
    }

    /// Resolve up to two alignment values per axis.
    fn collect_align_values<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        rules: &AlignRules,
    ) -> Result<AlignState, LayoutError> {
        let mut state = AlignState::default();
        for (&direction, rule) in rules {
            if !self.is_resolvable(rule) {
                continue;
            }
            if direction.is_horizontal() {
                if state.two_horizontal_aligned() {
                    continue;
                }
                if let Some(value) = self.horizontal_align_value(wrapper, rule)? {
                    state.set(direction, value);
                }
            } else {
                if state.two_vertical_aligned() {
                    continue;
                }
                if let Some(value) = self.vertical_align_value(wrapper, rule)? {
                    state.set(direction, value);
                }
            }
        }
        Ok(state)
    }

    /// Derive the child's ideal size from its alignment values and measure it.
    fn calc_size_param<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &mut W,
        child: NodeId,
        rules: &AlignRules,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        let state = self.collect_align_values(wrapper, rules)?;
        let mut constraint = self.child_constraint;
        let collapsed = LayoutConstraint {
            self_ideal_size: OptionalSize::fixed(0.0, 0.0),
            ..self.child_constraint
        };

        if let Some(width) = state.horizontal_span() {
            if width <= 0.0 {
                return wrapper.measure(child, &collapsed, ctx);
            }
            constraint.self_ideal_size.set_width(width);
        }
        if let Some(height) = state.vertical_span() {
            if height <= 0.0 {
                return wrapper.measure(child, &collapsed, ctx);
            }
            constraint.self_ideal_size.set_height(height);
        }

        let property = wrapper.layout_property(child)?;
        if ctx.at_least(API_VERSION_ELEVEN) && property.has_ideal_width() && property.has_ideal_height() {
            return wrapper.measure(child, &self.child_constraint, ctx);
        }
        wrapper.measure(child, &constraint, ctx)
    }

    /// Offset of a child along the horizontal axis for one rule.
    fn calc_horizontal_offset<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        direction: AlignDirection,
        rule: &AlignRule,
        width: f32,
    ) -> Result<f32, LayoutError> {
        let (offset, size) = self.anchor_extent(wrapper, rule)?;
        let (anchor_offset, anchor_width) = (offset.x, size.width);
        let Some(align) = rule.horizontal else {
            return Ok(anchor_offset);
        };
        let offset = match (direction, align) {
            (AlignDirection::Left, HorizontalAlign::Start) => 0.0,
            (AlignDirection::Left, HorizontalAlign::Center) => anchor_width / 2.0,
            (AlignDirection::Left, HorizontalAlign::End) => anchor_width,
            (AlignDirection::Middle, HorizontalAlign::Start) => -width / 2.0,
            (AlignDirection::Middle, HorizontalAlign::Center) => (anchor_width - width) / 2.0,
            (AlignDirection::Middle, HorizontalAlign::End) => anchor_width - width / 2.0,
            (AlignDirection::Right, HorizontalAlign::Start) => -width,
            (AlignDirection::Right, HorizontalAlign::Center) => anchor_width / 2.0 - width,
            (AlignDirection::Right, HorizontalAlign::End) => anchor_width - width,
            _ => 0.0,
        };
        Ok(offset + anchor_offset)
    }

    /// Offset of a child along the vertical axis for one rule.
    fn calc_vertical_offset<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        direction: AlignDirection,
        rule: &AlignRule,
        height: f32,
    ) -> Result<f32, LayoutError> {
        let (offset, size) = self.anchor_extent(wrapper, rule)?;
        let (anchor_offset, anchor_height) = (offset.y, size.height);
        let Some(align) = rule.vertical else {
            return Ok(anchor_offset);
        };
        let offset = match (direction, align) {
            (AlignDirection::Top, VerticalAlign::Top) => 0.0,
            (AlignDirection::Top, VerticalAlign::Center) => anchor_height / 2.0,
            (AlignDirection::Top, VerticalAlign::Bottom) => anchor_height,
            (AlignDirection::Center, VerticalAlign::Top) => -height / 2.0,
            (AlignDirection::Center, VerticalAlign::Center) => (anchor_height - height) / 2.0,
            (AlignDirection::Center, VerticalAlign::Bottom) => anchor_height - height / 2.0,
            (AlignDirection::Bottom, VerticalAlign::Top) => -height,
            (AlignDirection::Bottom, VerticalAlign::Center) => anchor_height / 2.0 - height,
            (AlignDirection::Bottom, VerticalAlign::Bottom) => anchor_height - height,
            _ => 0.0,
        };
        Ok(offset + anchor_offset)
    }

    /// Record the child's offset from the first resolvable rule per axis.
    fn calc_offset_param<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &W,
        id: &str,
        child: NodeId,
        rules: &AlignRules,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        let size = wrapper.geometry(child)?.margin_frame_size();
        let mut offset_x = None;
        let mut offset_y = None;
        for (&direction, rule) in rules {
            if !self.is_resolvable(rule) {
                continue;
            }
            if direction.is_horizontal() {
                if offset_x.is_none() {
                    offset_x = Some(self.calc_horizontal_offset(wrapper, direction, rule, size.width)?);
                }
            } else if offset_y.is_none() {
                offset_y = Some(self.calc_vertical_offset(wrapper, direction, rule, size.height)?);
            }
            if offset_x.is_some() && offset_y.is_some() {
                break;
            }
        }

        let bias = self.calc_bias(wrapper, child, rules, ctx)?;
        let offset = Offset::new(offset_x.unwrap_or(0.0), offset_y.unwrap_or(0.0)) + bias;
        self.record_offsets.insert(id.to_string(), offset);
        Ok(())
    }

    /// Extra offset placing an explicitly sized child between two
    /// opposing alignment lines.
    fn calc_bias<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        child: NodeId,
        rules: &AlignRules,
        ctx: &LayoutContext,
    ) -> Result<Offset, LayoutError> {
        if !ctx.at_least(API_VERSION_ELEVEN) {
            return Ok(Offset::zero());
        }
        let property = wrapper.layout_property(child)?;
        let Some(bias) = property.flex_item.as_ref().and_then(|item| item.bias) else {
            return Ok(Offset::zero());
        };
        let size = wrapper.geometry(child)?.margin_frame_size();
        let ideal_width = property.has_ideal_width().then_some(size.width);
        let ideal_height = property.has_ideal_height().then_some(size.height);
        if ideal_width.is_none() && ideal_height.is_none() {
            return Ok(Offset::zero());
        }

        let (horizontal, vertical) = self.first_two_align_values(wrapper, rules)?;
        let mut offset = Offset::zero();
        if let (Some(width), [Some(first), Some(second)]) = (ideal_width, horizontal) {
            offset.x = ((first - second).abs() - width) * effective_bias(bias.horizontal);
        }
        if let (Some(height), [Some(first), Some(second)]) = (ideal_height, vertical) {
            offset.y = ((first - second).abs() - height) * effective_bias(bias.vertical);
        }
        Ok(offset)
    }

    /// First two resolvable alignment values per axis, in rule order.
    fn first_two_align_values<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &W,
        rules: &AlignRules,
    ) -> Result<([Option<f32>; 2], [Option<f32>; 2]), LayoutError> {
        let mut horizontal = [None; 2];
        let mut vertical = [None; 2];
        for (direction, rule) in rules {
            if !self.is_resolvable(rule) {
                continue;
            }
            let (values, value) = if direction.is_horizontal() {
                (&mut horizontal, self.horizontal_align_value(wrapper, rule)?)
            } else {
                (&mut vertical, self.vertical_align_value(wrapper, rule)?)
            };
            let Some(value) = value else {
                continue;
            };
            if let Some(slot) = values.iter_mut().find(|slot| slot.is_none()) {
                *slot = Some(value);
            }
        }
        Ok((horizontal, vertical))
    }

    /// Shrink auto-sized axes to the union of the placed children.
    fn measure_self<W: LayoutWrapper + ?Sized>(
        &self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        if !ctx.at_least(API_VERSION_ELEVEN) {
            return Ok(());
        }
        let property = wrapper.layout_property(node)?;
        let calc_size = property.calc_size.unwrap_or_default();
        let auto_width = calc_size.is_auto_width() && !self.graph.horizontal_rely_on_container();
        let auto_height = calc_size.is_auto_height() && !self.graph.vertical_rely_on_container();
        if !auto_width && !auto_height {
            return Ok(());
        }

        let mut content = Rect::default();
        for id in &self.render_list {
            let Some(child) = self.graph.node(id) else {
                continue;
            };
            if wrapper.layout_property(child)?.is_gone() {
                continue;
            }
            let offset = self.record_offsets.get(id).copied().unwrap_or_default();
            let size = wrapper.geometry(child)?.margin_frame_size();
            content = content.union(&Rect::from_parts(offset, size));
        }
        content = content.intersect(&Rect::new(0.0, 0.0, f32::INFINITY, f32::INFINITY));

        let padding = self.padding;
        let geometry = wrapper.geometry_mut(node)?;
        let mut frame = geometry.frame_size();
        if auto_width {
            frame.width = content.width + padding.horizontal();
        }
        if auto_height {
            frame.height = content.height + padding.vertical();
        }
        geometry.set_frame_size(frame);
        Ok(())
    }
}

fn effective_bias(bias: f32) -> f32 {
    if great_or_equal(bias, 0.0) {
        bias
    } else {
        DEFAULT_BIAS
    }
}

impl crate::algorithm::LayoutAlgorithm for RelativeContainerLayoutAlgorithm {
    fn measure<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        self.reset();
        let children = wrapper.children(node)?;
        if !self.determine_topological_order(wrapper, node, &children, ctx)? {
            self.loop_detected = true;
            return Ok(());
        }

        for id in self.render_list.clone() {
            let Some(child) = self.graph.node(&id) else {
                continue;
            };
            if !wrapper.is_active(child)? {
                wrapper.measure(child, &self.child_constraint, ctx)?;
                continue;
            }
            let rules = self.graph.rules(&id).cloned().unwrap_or_default();
            if rules.is_empty() {
                wrapper.measure(child, &self.child_constraint, ctx)?;
                self.record_offsets.insert(id, Offset::zero());
                continue;
            }
            self.calc_size_param(wrapper, child, &rules, ctx)?;
            self.calc_offset_param(wrapper, &id, child, &rules, ctx)?;
        }

        self.measure_self(wrapper, node, ctx)
    }

    fn layout<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        let origin = self.padding.origin();
        for child in wrapper.children(node)? {
            let offset = wrapper
                .layout_property(child)?
                .inspector_id
                .as_deref()
                .and_then(|id| self.record_offsets.get(id))
                .copied()
                .unwrap_or_default();
            wrapper.geometry_mut(child)?.set_margin_frame_offset(offset + origin);
            wrapper.layout(child, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::LayoutAlgorithmVariant;
    use crate::tree::{LayoutNode, LayoutTree};
    use ark_core::{
        CalcSize, FlexItemProperty, LayoutProperty, LayoutVariant, Visibility, API_VERSION_TEN, CONTAINER_ANCHOR,
    };
    use proptest::prelude::*;

    fn left(anchor: &str, align: HorizontalAlign) -> (AlignDirection, AlignRule) {
        (AlignDirection::Left, AlignRule::horizontal(anchor, align))
    }

    fn right(anchor: &str, align: HorizontalAlign) -> (AlignDirection, AlignRule) {
        (AlignDirection::Right, AlignRule::horizontal(anchor, align))
    }

    fn top(anchor: &str, align: VerticalAlign) -> (AlignDirection, AlignRule) {
        (AlignDirection::Top, AlignRule::vertical(anchor, align))
    }

    fn middle(anchor: &str, align: HorizontalAlign) -> (AlignDirection, AlignRule) {
        (AlignDirection::Middle, AlignRule::horizontal(anchor, align))
    }

    fn center(anchor: &str, align: VerticalAlign) -> (AlignDirection, AlignRule) {
        (AlignDirection::Center, AlignRule::vertical(anchor, align))
    }

    fn bottom(anchor: &str, align: VerticalAlign) -> (AlignDirection, AlignRule) {
        (AlignDirection::Bottom, AlignRule::vertical(anchor, align))
    }

    fn rules(entries: Vec<(AlignDirection, AlignRule)>) -> FlexItemProperty {
        entries
            .into_iter()
            .fold(FlexItemProperty::default(), |item, (direction, rule)| item.with_rule(direction, rule))
    }

    fn sized(id: &str, width: f32, height: f32, item: FlexItemProperty) -> LayoutProperty {
        LayoutProperty::default()
            .with_id(id)
            .with_size(CalcSize::px(width, height))
            .with_flex_item(item)
    }

    fn container(tree: &mut LayoutTree, width: f32, height: f32) -> NodeId {
        tree.insert_root(LayoutProperty::new(LayoutVariant::Relative).with_size(CalcSize::px(width, height)))
    }

    fn run(tree: &mut LayoutTree, root: NodeId, ctx: &LayoutContext) {
        tree.compute_layout(root, &LayoutConstraint::loose(Size::new(500.0, 500.0)), ctx)
            .unwrap();
    }

    fn frame(tree: &LayoutTree, node: NodeId) -> Rect {
        tree.geometry(node).unwrap().frame_rect()
    }

    fn algorithm(tree: &LayoutTree, node: NodeId) -> &RelativeContainerLayoutAlgorithm {
        match tree.get(node).and_then(LayoutNode::algorithm) {
            Some(LayoutAlgorithmVariant::Relative(algorithm)) => algorithm,
            other => panic!("expected relative algorithm, got {other:?}"),
        }
    }

    /// Anchor `a` (50x40) in the top-left corner of a 150x100 container.
    fn anchored_container(tree: &mut LayoutTree) -> (NodeId, NodeId) {
        let root = container(tree, 150.0, 100.0);
        let a = tree
            .insert_child(
                root,
                sized(
                    "a",
                    50.0,
                    40.0,
                    rules(vec![
                        left(CONTAINER_ANCHOR, HorizontalAlign::Start),
                        top(CONTAINER_ANCHOR, VerticalAlign::Top),
                    ]),
                ),
            )
            .unwrap();
        (root, a)
    }

    #[test]
    fn test_anchor_measured_before_dependent() {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, 300.0, 200.0);
        // Dependent declared first.
        let b = tree
            .insert_child(
                root,
                sized(
                    "b",
                    30.0,
                    30.0,
                    rules(vec![left("a", HorizontalAlign::End), top("a", VerticalAlign::Bottom)]),
                ),
            )
            .unwrap();
        let a = tree
            .insert_child(
                root,
                sized(
                    "a",
                    50.0,
                    40.0,
                    rules(vec![
                        left(CONTAINER_ANCHOR, HorizontalAlign::Start),
                        top(CONTAINER_ANCHOR, VerticalAlign::Top),
                    ]),
                ),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert!(tree.get(a).unwrap().measure_stamp < tree.get(b).unwrap().measure_stamp);
        assert_eq!(algorithm(&tree, root).render_list(), &["a".to_string(), "b".to_string()]);
        let rect = frame(&tree, b);
        assert!((rect.x - 50.0).abs() < 0.001);
        assert!((rect.y - 40.0).abs() < 0.001);
    }

    #[test]
    fn test_cycle_collapses_every_child() {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, 300.0, 200.0);
        let a = tree
            .insert_child(root, sized("a", 50.0, 40.0, rules(vec![left("b", HorizontalAlign::End)])))
            .unwrap();
        let b = tree
            .insert_child(root, sized("b", 50.0, 40.0, rules(vec![left("a", HorizontalAlign::End)])))
            .unwrap();
        let c = tree.insert_child(root, sized("c", 20.0, 20.0, FlexItemProperty::default())).unwrap();
        let anonymous = tree
            .insert_child(root, LayoutProperty::default().with_size(CalcSize::px(30.0, 30.0)))
            .unwrap();
        let unnamed = tree
            .insert_child(root, LayoutProperty::default().with_id("").with_size(CalcSize::px(30.0, 30.0)))
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert!(algorithm(&tree, root).loop_detected());
        for child in [a, b, c, anonymous, unnamed] {
            assert!(frame(&tree, child).size().is_zero());
            assert!(!tree.is_active(child).unwrap());
        }
        assert_eq!(frame(&tree, root).size(), Size::new(300.0, 200.0));
    }

    #[test]
    fn test_left_and_right_derive_width() {
        let mut tree = LayoutTree::new();
        let (root, _) = anchored_container(&mut tree);
        let id = tree.next_id();
        let c = tree
            .add_child(
                root,
                LayoutNode::new(
                    id,
                    LayoutProperty::default().with_id("c").with_flex_item(rules(vec![
                        left("a", HorizontalAlign::End),
                        right(CONTAINER_ANCHOR, HorizontalAlign::End),
                    ])),
                )
                .with_content_size(Size::new(10.0, 10.0)),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        let rect = frame(&tree, c);
        assert!((rect.x - 50.0).abs() < 0.001);
        assert!((rect.width - 100.0).abs() < 0.001);
        assert!((rect.height - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_middle_and_left_derive_width() {
        let mut tree = LayoutTree::new();
        let (root, _) = anchored_container(&mut tree);
        let c = tree
            .insert_child(
                root,
                LayoutProperty::default().with_id("c").with_flex_item(rules(vec![
                    left("a", HorizontalAlign::End),
                    (AlignDirection::Middle, AlignRule::horizontal(CONTAINER_ANCHOR, HorizontalAlign::Center)),
                ])),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        let rect = frame(&tree, c);
        assert!((rect.x - 50.0).abs() < 0.001);
        assert!((rect.width - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_middle_and_right_derive_width() {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, 300.0, 100.0);
        tree.insert_child(
            root,
            sized(
                "a",
                50.0,
                40.0,
                rules(vec![
                    left(CONTAINER_ANCHOR, HorizontalAlign::Start),
                    top(CONTAINER_ANCHOR, VerticalAlign::Top),
                ]),
            ),
        )
        .unwrap();
        let c = tree
            .insert_child(
                root,
                LayoutProperty::default().with_id("c").with_flex_item(rules(vec![
                    middle("a", HorizontalAlign::End),
                    right(CONTAINER_ANCHOR, HorizontalAlign::Center),
                ])),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        // 2 * (150 - 50), centred on the right edge of `a`.
        let rect = frame(&tree, c);
        assert!((rect.width - 200.0).abs() < 0.001);
        assert!((rect.x + 50.0).abs() < 0.001);
    }

    #[test]
    fn test_vertical_spans_derive_height() {
        let cases = [
            // TOP + BOTTOM: 100 - 40
            (top("a", VerticalAlign::Bottom), bottom(CONTAINER_ANCHOR, VerticalAlign::Bottom), 40.0, 60.0),
            // CENTER + TOP: 2 * (50 - 40)
            (top("a", VerticalAlign::Bottom), center(CONTAINER_ANCHOR, VerticalAlign::Center), 40.0, 20.0),
            // CENTER + BOTTOM: 2 * (50 - 40), centred on the bottom of `a`
            (center("a", VerticalAlign::Bottom), bottom(CONTAINER_ANCHOR, VerticalAlign::Center), 30.0, 20.0),
        ];
        for (first, second, expected_y, expected_height) in cases {
            let mut tree = LayoutTree::new();
            let (root, _) = anchored_container(&mut tree);
            let c = tree
                .insert_child(
                    root,
                    LayoutProperty::default().with_id("c").with_flex_item(rules(vec![first, second])),
                )
                .unwrap();

            run(&mut tree, root, &LayoutContext::default());

            let rect = frame(&tree, c);
            assert!((rect.height - expected_height).abs() < 0.001, "height = {}", rect.height);
            assert!((rect.y - expected_y).abs() < 0.001, "y = {}", rect.y);
        }
    }

    #[test]
    fn test_horizontal_offset_table() {
        // `a` is 50 wide at x = 0, the child is 20 wide.
        let cases = [
            (AlignDirection::Left, HorizontalAlign::Center, 25.0),
            (AlignDirection::Middle, HorizontalAlign::Start, -10.0),
            (AlignDirection::Middle, HorizontalAlign::Center, 15.0),
            (AlignDirection::Middle, HorizontalAlign::End, 40.0),
            (AlignDirection::Right, HorizontalAlign::Start, -20.0),
            (AlignDirection::Right, HorizontalAlign::Center, 5.0),
            (AlignDirection::Right, HorizontalAlign::End, 30.0),
        ];
        for (direction, align, expected_x) in cases {
            let mut tree = LayoutTree::new();
            let (root, _) = anchored_container(&mut tree);
            let c = tree
                .insert_child(
                    root,
                    sized("c", 20.0, 10.0, rules(vec![(direction, AlignRule::horizontal("a", align))])),
                )
                .unwrap();

            run(&mut tree, root, &LayoutContext::default());

            let x = frame(&tree, c).x;
            assert!((x - expected_x).abs() < 0.001, "{direction:?}/{align:?}: x = {x}");
        }
    }

    #[test]
    fn test_vertical_offset_table() {
        // `a` is 40 high at y = 0, the child is 10 high.
        let cases = [
            (AlignDirection::Top, VerticalAlign::Center, 20.0),
            (AlignDirection::Center, VerticalAlign::Top, -5.0),
            (AlignDirection::Center, VerticalAlign::Center, 15.0),
            (AlignDirection::Center, VerticalAlign::Bottom, 35.0),
            (AlignDirection::Bottom, VerticalAlign::Top, -10.0),
            (AlignDirection::Bottom, VerticalAlign::Center, 10.0),
            (AlignDirection::Bottom, VerticalAlign::Bottom, 30.0),
        ];
        for (direction, align, expected_y) in cases {
            let mut tree = LayoutTree::new();
            let (root, _) = anchored_container(&mut tree);
            let c = tree
                .insert_child(
                    root,
                    sized("c", 20.0, 10.0, rules(vec![(direction, AlignRule::vertical("a", align))])),
                )
                .unwrap();

            run(&mut tree, root, &LayoutContext::default());

            let y = frame(&tree, c).y;
            assert!((y - expected_y).abs() < 0.001, "{direction:?}/{align:?}: y = {y}");
        }
    }

    #[test]
    fn test_vertical_bias() {
        for (bias, expected_y) in [(0.0, 40.0), (1.0, 80.0), (-1.0, 60.0)] {
            let mut tree = LayoutTree::new();
            let (root, _) = anchored_container(&mut tree);
            let c = tree
                .insert_child(
                    root,
                    sized(
                        "c",
                        20.0,
                        20.0,
                        rules(vec![
                            top("a", VerticalAlign::Bottom),
                            bottom(CONTAINER_ANCHOR, VerticalAlign::Bottom),
                        ])
                        .with_bias(0.5, bias),
                    ),
                )
                .unwrap();

            run(&mut tree, root, &LayoutContext::default());

            let rect = frame(&tree, c);
            assert!((rect.height - 20.0).abs() < 0.001);
            assert!((rect.y - expected_y).abs() < 0.001, "bias {bias}: y = {}", rect.y);
            assert!(rect.x.abs() < 0.001);
        }
    }

    #[test]
    fn test_negative_span_measures_zero() {
        let mut tree = LayoutTree::new();
        let (root, _) = anchored_container(&mut tree);
        let c = tree
            .insert_child(
                root,
                LayoutProperty::default().with_id("c").with_flex_item(rules(vec![
                    left(CONTAINER_ANCHOR, HorizontalAlign::End),
                    right("a", HorizontalAlign::Start),
                ])),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert!(frame(&tree, c).size().is_zero());
    }

    #[test]
    fn test_bias_extremes() {
        for (bias, expected_x) in [(0.0, 50.0), (1.0, 110.0), (-1.0, 80.0)] {
            let mut tree = LayoutTree::new();
            let (root, _) = anchored_container(&mut tree);
            let c = tree
                .insert_child(
                    root,
                    sized(
                        "c",
                        40.0,
                        20.0,
                        rules(vec![
                            left("a", HorizontalAlign::End),
                            right(CONTAINER_ANCHOR, HorizontalAlign::End),
                        ])
                        .with_bias(bias, 0.5),
                    ),
                )
                .unwrap();

            run(&mut tree, root, &LayoutContext::default());

            let rect = frame(&tree, c);
            assert!((rect.width - 40.0).abs() < 0.001);
            assert!((rect.x - expected_x).abs() < 0.001, "bias {bias}: x = {}", rect.x);
        }
    }

    #[test]
    fn test_api_ten_ignores_explicit_size_and_bias() {
        let mut tree = LayoutTree::new();
        let (root, _) = anchored_container(&mut tree);
        let c = tree
            .insert_child(
                root,
                sized(
                    "c",
                    40.0,
                    20.0,
                    rules(vec![
                        left("a", HorizontalAlign::End),
                        right(CONTAINER_ANCHOR, HorizontalAlign::End),
                    ])
                    .with_bias(1.0, 0.5),
                ),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default().with_api_version(API_VERSION_TEN));

        let rect = frame(&tree, c);
        assert!((rect.x - 50.0).abs() < 0.001);
        assert!((rect.width - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_unknown_anchor_contributes_nothing() {
        let mut tree = LayoutTree::new();
        let (root, _) = anchored_container(&mut tree);
        let c = tree
            .insert_child(
                root,
                sized("c", 20.0, 20.0, rules(vec![left("ghost", HorizontalAlign::End)])),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert_eq!(frame(&tree, c).offset(), Offset::zero());
        assert!(algorithm(&tree, root).graph().horizontal_rely_on_container());
    }

    #[test]
    fn test_child_without_id_sits_at_padding_origin() {
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            LayoutProperty::new(LayoutVariant::Relative)
                .with_size(CalcSize::px(200.0, 200.0))
                .with_padding(Padding::uniform(10.0)),
        );
        let anonymous = tree
            .insert_child(root, LayoutProperty::default().with_size(CalcSize::px(30.0, 30.0)))
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert_eq!(frame(&tree, anonymous), Rect::new(10.0, 10.0, 30.0, 30.0));
        assert!(!tree.is_active(anonymous).unwrap());
    }

    #[test]
    fn test_children_without_id_measure_against_container_max() {
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            LayoutProperty::new(LayoutVariant::Relative)
                .with_size(CalcSize::px(200.0, 200.0))
                .with_padding(Padding::uniform(10.0)),
        );
        let unnamed = tree
            .insert_child(root, LayoutProperty::default().with_id("").with_size(CalcSize::px(400.0, 400.0)))
            .unwrap();
        let anonymous = tree
            .insert_child(root, LayoutProperty::default().with_size(CalcSize::px(400.0, 400.0)))
            .unwrap();
        let oversized = tree
            .insert_child(root, LayoutProperty::default().with_id("").with_size(CalcSize::px(800.0, 800.0)))
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert_eq!(frame(&tree, unnamed), Rect::new(10.0, 10.0, 400.0, 400.0));
        assert!(tree.is_active(unnamed).unwrap());
        assert_eq!(frame(&tree, anonymous), Rect::new(10.0, 10.0, 400.0, 400.0));
        assert!(!tree.is_active(anonymous).unwrap());
        // Still bounded by the constraint the container received.
        assert_eq!(frame(&tree, oversized).size(), Size::new(500.0, 500.0));
        assert!(algorithm(&tree, root).render_list().is_empty());
    }

    #[test]
    fn test_empty_container_keeps_declared_size() {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, 120.0, 80.0);

        run(&mut tree, root, &LayoutContext::default());

        assert_eq!(frame(&tree, root).size(), Size::new(120.0, 80.0));
        assert!(algorithm(&tree, root).render_list().is_empty());
        assert!(!algorithm(&tree, root).loop_detected());
    }

    #[test]
    fn test_gone_anchor_deactivates_dependent() {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, 200.0, 200.0);
        tree.insert_child(
            root,
            sized("a", 50.0, 50.0, FlexItemProperty::default()).with_visibility(Visibility::Gone),
        )
        .unwrap();
        let b = tree
            .insert_child(root, sized("b", 20.0, 20.0, rules(vec![left("a", HorizontalAlign::End)])))
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert!(!tree.is_active(b).unwrap());
        assert_eq!(frame(&tree, b).offset(), Offset::zero());
    }

    #[test]
    fn test_auto_sized_container_wraps_children() {
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(LayoutProperty::new(LayoutVariant::Relative).with_padding(Padding::uniform(5.0)));
        tree.insert_child(root, sized("a", 50.0, 40.0, FlexItemProperty::default()))
            .unwrap();
        let b = tree
            .insert_child(
                root,
                sized(
                    "b",
                    30.0,
                    30.0,
                    rules(vec![left("a", HorizontalAlign::End), top("a", VerticalAlign::Bottom)]),
                ),
            )
            .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert_eq!(frame(&tree, root).size(), Size::new(90.0, 80.0));
        assert_eq!(frame(&tree, b), Rect::new(55.0, 45.0, 30.0, 30.0));
    }

    #[test]
    fn test_container_reliant_axis_keeps_max_size() {
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(LayoutProperty::new(LayoutVariant::Relative));
        tree.insert_child(
            root,
            sized("a", 50.0, 40.0, rules(vec![right(CONTAINER_ANCHOR, HorizontalAlign::End)])),
        )
        .unwrap();

        run(&mut tree, root, &LayoutContext::default());

        assert_eq!(frame(&tree, root).size(), Size::new(500.0, 40.0));
    }

    #[test]
    fn test_remeasure_is_idempotent() {
        let mut tree = LayoutTree::new();
        let (root, a) = anchored_container(&mut tree);
        let c = tree
            .insert_child(
                root,
                LayoutProperty::default().with_id("c").with_flex_item(rules(vec![
                    left("a", HorizontalAlign::End),
                    right(CONTAINER_ANCHOR, HorizontalAlign::End),
                    top("a", VerticalAlign::Bottom),
                ])),
            )
            .unwrap();
        let ctx = LayoutContext::default();

        run(&mut tree, root, &ctx);
        let first: Vec<_> = [root, a, c].iter().map(|&node| frame(&tree, node)).collect();
        run(&mut tree, root, &ctx);
        let second: Vec<_> = [root, a, c].iter().map(|&node| frame(&tree, node)).collect();

        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_anchors_are_measured_before_dependents(parents in prop::collection::vec(0usize..10, 1..10)) {
            let mut tree = LayoutTree::new();
            let root = container(&mut tree, 400.0, 400.0);
            let mut nodes = Vec::new();
            // Declared in reverse so child order never matches the dependency order.
            for (index, &parent) in parents.iter().enumerate().rev() {
                let anchor = if parent < index { format!("n{parent}") } else { CONTAINER_ANCHOR.to_string() };
                let item = rules(vec![left(&anchor, HorizontalAlign::End), top(&anchor, VerticalAlign::Top)]);
                let node = tree.insert_child(root, sized(&format!("n{index}"), 10.0, 10.0, item)).unwrap();
                nodes.push((index, parent, node));
            }
            let ctx = LayoutContext::default();
            run(&mut tree, root, &ctx);

            let stamp = |index: usize| {
                let (_, _, node) = nodes.iter().find(|(i, _, _)| *i == index).unwrap();
                tree.get(*node).unwrap().measure_stamp
            };
            for &(index, parent, _) in &nodes {
                if parent < index {
                    prop_assert!(stamp(parent) < stamp(index));
                }
            }

            let before: Vec<_> = nodes.iter().map(|(_, _, node)| frame(&tree, *node)).collect();
            run(&mut tree, root, &ctx);
            let after: Vec<_> = nodes.iter().map(|(_, _, node)| frame(&tree, *node)).collect();
            prop_assert_eq!(before, after);
        }
    }
}

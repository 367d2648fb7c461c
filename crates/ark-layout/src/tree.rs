//! Layout tree data structures.
//!
//! An arena of nodes addressed by [`NodeId`]. Each node carries its layout
//! property, its computed geometry and, for containers, the algorithm state
//! of its last pass. The tree implements [`LayoutWrapper`], so algorithms
//! measure children by handle without borrowing into the arena.

use std::collections::HashMap;

use ark_core::{
    GeometryNode, LayoutConstraint, LayoutContext, LayoutError, LayoutProperty, LayoutWrapper, NodeId, Offset,
    Rect, Size,
};

use crate::algorithm::{LayoutAlgorithm, LayoutAlgorithmVariant};

/// A node in the layout tree.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    /// Unique ID for this node
    pub id: NodeId,
    /// Optional name for debugging
    pub name: Option<String>,
    pub property: LayoutProperty,
    /// Computed geometry (offset relative to the parent's frame)
    pub geometry: GeometryNode,
    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,
    /// Child node IDs
    pub children: Vec<NodeId>,
    /// Inactive nodes are laid out but not painted
    pub active: bool,
    /// Size of a leaf's own content (text, image, ...)
    pub content_size: Size,
    /// Distance from the top of the frame to the first baseline
    pub baseline: f32,
    /// Pass stamp of the last measure; 0 if never measured
    pub measure_stamp: u64,
    algorithm: Option<LayoutAlgorithmVariant>,
}

impl LayoutNode {
    /// Create a new layout node.
    pub fn new(id: NodeId, property: LayoutProperty) -> Self {
        Self {
            id,
            name: None,
            geometry: GeometryNode::new(property.margin),
            property,
            parent: None,
            children: Vec::new(),
            active: true,
            content_size: Size::zero(),
            baseline: 0.0,
            measure_stamp: 0,
            algorithm: None,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the content size used when the node is a leaf.
    pub fn with_content_size(mut self, size: Size) -> Self {
        self.content_size = size;
        self
    }

    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.baseline = baseline;
        self
    }

    /// Algorithm state of the last pass, for containers.
    pub fn algorithm(&self) -> Option<&LayoutAlgorithmVariant> {
        self.algorithm.as_ref()
    }
}

/// The complete layout tree.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    /// All nodes in the tree, indexed by ID
    nodes: HashMap<NodeId, LayoutNode>,
    /// Root node IDs
    roots: Vec<NodeId>,
    /// Counter for generating unique IDs
    next_id: u64,
    /// Counter stamped on nodes as they are measured
    measure_counter: u64,
}

impl LayoutTree {
    /// Create an empty layout tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new unique node ID.
    pub fn next_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    /// Add a root node.
    pub fn add_root(&mut self, node: LayoutNode) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        self.roots.push(id);
        id
    }

    /// Add a child node to a parent.
    pub fn add_child(&mut self, parent_id: NodeId, mut node: LayoutNode) -> Result<NodeId, LayoutError> {
        let id = node.id;
        node.parent = Some(parent_id);
        self.node_mut(parent_id)?.children.push(id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Create and add a root node from a property.
    pub fn insert_root(&mut self, property: LayoutProperty) -> NodeId {
        let id = self.next_id();
        self.add_root(LayoutNode::new(id, property))
    }

    /// Create and add a child node from a property.
    pub fn insert_child(&mut self, parent_id: NodeId, property: LayoutProperty) -> Result<NodeId, LayoutError> {
        let id = self.next_id();
        self.add_child(parent_id, LayoutNode::new(id, property))
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode> {
        self.nodes.get_mut(&id)
    }

    fn node(&self, id: NodeId) -> Result<&LayoutNode, LayoutError> {
        self.nodes.get(&id).ok_or(LayoutError::NodeNotFound { node: id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut LayoutNode, LayoutError> {
        self.nodes.get_mut(&id).ok_or(LayoutError::NodeNotFound { node: id })
    }

    /// Get the root nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.values()
    }

    /// Run a full measure and layout pass from `root`, placing it at the origin.
    pub fn compute_layout(
        &mut self,
        root: NodeId,
        constraint: &LayoutConstraint,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        self.measure(root, constraint, ctx)?;
        self.node_mut(root)?.geometry.set_margin_frame_offset(Offset::zero());
        self.layout(root, ctx)
    }

    /// Frame rectangle of a node in root coordinates.
    pub fn absolute_frame_rect(&self, id: NodeId) -> Result<Rect, LayoutError> {
        let node = self.node(id)?;
        let mut offset = node.geometry.frame_offset();
        let mut parent = node.parent;
        while let Some(parent_id) = parent {
            let parent_node = self.node(parent_id)?;
            offset += parent_node.geometry.frame_offset();
            parent = parent_node.parent;
        }
        Ok(Rect::from_parts(offset, node.geometry.frame_size()))
    }

    /// Size of a leaf: parent-imposed ideal size, else declared size, else
    /// content size, clamped into the constraint.
    fn measure_leaf(node: &LayoutNode, constraint: &LayoutConstraint) -> Size {
        let ideal = constraint.self_ideal_size;
        let size = Size::new(
            ideal.width.unwrap_or(node.content_size.width),
            ideal.height.unwrap_or(node.content_size.height),
        );
        size.constrain(constraint.min_size, constraint.max_size)
    }
}

impl LayoutWrapper for LayoutTree {
    fn measure(&mut self, node: NodeId, constraint: &LayoutConstraint, ctx: &LayoutContext) -> Result<(), LayoutError> {
        self.measure_counter += 1;
        let stamp = self.measure_counter;

        let entry = self.node_mut(node)?;
        entry.measure_stamp = stamp;

        // Declared sizes fill in whatever the parent left open.
        let mut effective = *constraint;
        if let Some(calc_size) = entry.property.calc_size {
            let resolved = calc_size.resolve(ctx.density, constraint.percent_reference);
            if effective.self_ideal_size.width.is_none() {
                effective.self_ideal_size.width = resolved.width;
            }
            if effective.self_ideal_size.height.is_none() {
                effective.self_ideal_size.height = resolved.height;
            }
        }
        entry.property.layout_constraint = Some(effective);
        if entry.property.is_gone() {
            entry.geometry.set_frame_size(Size::zero());
            return Ok(());
        }

        let algorithm = match entry.algorithm.take() {
            Some(algorithm) if algorithm.matches(&entry.property.variant) => Some(algorithm),
            _ => LayoutAlgorithmVariant::for_variant(&entry.property.variant),
        };
        let Some(mut algorithm) = algorithm else {
            let size = Self::measure_leaf(entry, &effective);
            entry.geometry.set_frame_size(size);
            return Ok(());
        };

        let result = algorithm.measure(self, node, ctx);
        self.node_mut(node)?.algorithm = Some(algorithm);
        result
    }

    fn layout(&mut self, node: NodeId, ctx: &LayoutContext) -> Result<(), LayoutError> {
        let entry = self.node_mut(node)?;
        if entry.property.is_gone() {
            return Ok(());
        }
        let Some(mut algorithm) = entry.algorithm.take() else {
            return Ok(());
        };
        let result = algorithm.layout(self, node, ctx);
        self.node_mut(node)?.algorithm = Some(algorithm);
        result
    }

    fn geometry(&self, node: NodeId) -> Result<&GeometryNode, LayoutError> {
        Ok(&self.node(node)?.geometry)
    }

    fn geometry_mut(&mut self, node: NodeId) -> Result<&mut GeometryNode, LayoutError> {
        Ok(&mut self.node_mut(node)?.geometry)
    }

    fn layout_property(&self, node: NodeId) -> Result<&LayoutProperty, LayoutError> {
        Ok(&self.node(node)?.property)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, LayoutError> {
        Ok(self.node(node)?.children.clone())
    }

    fn child_by_index(&self, node: NodeId, index: usize) -> Result<Option<NodeId>, LayoutError> {
        Ok(self.node(node)?.children.get(index).copied())
    }

    fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), LayoutError> {
        self.node_mut(node)?.active = active;
        Ok(())
    }

    fn is_active(&self, node: NodeId) -> Result<bool, LayoutError> {
        Ok(self.node(node)?.active)
    }

    fn baseline_distance(&self, node: NodeId) -> Result<f32, LayoutError> {
        Ok(self.node(node)?.baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_core::{CalcSize, Dimension, LayoutVariant, Padding, Visibility};

    #[test]
    fn test_layout_tree() {
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(LayoutProperty::new(LayoutVariant::Relative));
        let child = tree
            .insert_child(root, LayoutProperty::default().with_size(CalcSize::px(100.0, 50.0)))
            .unwrap();

        assert_eq!(tree.get(child).unwrap().parent, Some(root));
        assert_eq!(tree.children(root).unwrap(), vec![child]);
        assert_eq!(tree.child_by_index(root, 0).unwrap(), Some(child));
        assert_eq!(tree.child_by_index(root, 1).unwrap(), None);
        assert_eq!(tree.roots(), &[root]);
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let mut tree = LayoutTree::new();
        let missing = NodeId(42);
        assert_eq!(
            tree.measure(missing, &LayoutConstraint::default(), &LayoutContext::default()),
            Err(LayoutError::NodeNotFound { node: missing })
        );
        assert!(tree.insert_child(missing, LayoutProperty::default()).is_err());
    }

    #[test]
    fn test_leaf_measure_prefers_ideal_then_declared_then_content() {
        let mut tree = LayoutTree::new();
        let id = tree.next_id();
        let leaf = LayoutNode::new(
            id,
            LayoutProperty::default().with_size(CalcSize::new(Some(Dimension::percent(50.0)), None)),
        )
        .with_content_size(Size::new(30.0, 20.0));
        tree.add_root(leaf);
        let ctx = LayoutContext::default();

        tree.measure(id, &LayoutConstraint::loose(Size::new(200.0, 100.0)), &ctx).unwrap();
        assert_eq!(tree.geometry(id).unwrap().frame_size(), Size::new(100.0, 20.0));

        let mut constraint = LayoutConstraint::loose(Size::new(200.0, 100.0));
        constraint.self_ideal_size.set_width(60.0);
        tree.measure(id, &constraint, &ctx).unwrap();
        assert_eq!(tree.geometry(id).unwrap().frame_size(), Size::new(60.0, 20.0));
    }

    #[test]
    fn test_gone_leaf_measures_zero() {
        let mut tree = LayoutTree::new();
        let id = tree.next_id();
        tree.add_root(
            LayoutNode::new(id, LayoutProperty::default().with_visibility(Visibility::Gone))
                .with_content_size(Size::new(30.0, 20.0)),
        );
        tree.measure(id, &LayoutConstraint::loose(Size::new(200.0, 100.0)), &LayoutContext::default())
            .unwrap();
        assert!(tree.geometry(id).unwrap().frame_size().is_zero());
    }

    #[test]
    fn test_gone_container_skips_its_children() {
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            LayoutProperty::new(LayoutVariant::Wrap(ark_core::WrapProperty::horizontal()))
                .with_size(CalcSize::px(300.0, 200.0))
                .with_visibility(Visibility::Gone),
        );
        let child = tree
            .insert_child(root, LayoutProperty::default().with_size(CalcSize::px(100.0, 50.0)))
            .unwrap();

        tree.compute_layout(root, &LayoutConstraint::loose(Size::new(500.0, 500.0)), &LayoutContext::default())
            .unwrap();

        assert!(tree.geometry(root).unwrap().frame_size().is_zero());
        assert_eq!(tree.get(child).unwrap().measure_stamp, 0);
        assert!(tree.get(child).unwrap().geometry.frame_size().is_zero());
        assert!(tree.get(root).unwrap().algorithm().is_none());
    }

    #[test]
    fn test_absolute_frame_rect() {
        let mut tree = LayoutTree::new();
        let root = tree.insert_root(
            LayoutProperty::new(LayoutVariant::Relative)
                .with_size(CalcSize::px(300.0, 200.0))
                .with_padding(Padding::uniform(10.0)),
        );
        let id = tree.next_id();
        let child = tree
            .add_child(
                root,
                LayoutNode::new(id, LayoutProperty::default().with_id("a")).with_content_size(Size::new(40.0, 40.0)),
            )
            .unwrap();

        tree.compute_layout(root, &LayoutConstraint::loose(Size::new(500.0, 500.0)), &LayoutContext::default())
            .unwrap();

        let rect = tree.absolute_frame_rect(child).unwrap();
        assert!((rect.x - 10.0).abs() < 0.001);
        assert!((rect.y - 10.0).abs() < 0.001);
        assert!((rect.width - 40.0).abs() < 0.001);
    }
}

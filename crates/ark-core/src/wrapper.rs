//! The measure/layout protocol the algorithms run against.
//!
//! Nodes are arena handles; the algorithms never hold references into the
//! tree across calls, so a container can measure its children while it is
//! itself being measured.

use std::fmt;

use crate::constraint::LayoutConstraint;
use crate::context::LayoutContext;
use crate::errors::LayoutError;
use crate::geometry::GeometryNode;
use crate::property::LayoutProperty;

/// Handle of a node in a layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Access to a tree of measurable nodes.
pub trait LayoutWrapper {
    /// Measure `node` (and, recursively, its subtree) under `constraint`.
    fn measure(&mut self, node: NodeId, constraint: &LayoutConstraint, ctx: &LayoutContext) -> Result<(), LayoutError>;

    /// Position the children of `node`; its own offset is set by its parent.
    fn layout(&mut self, node: NodeId, ctx: &LayoutContext) -> Result<(), LayoutError>;

    fn geometry(&self, node: NodeId) -> Result<&GeometryNode, LayoutError>;

    fn geometry_mut(&mut self, node: NodeId) -> Result<&mut GeometryNode, LayoutError>;

    fn layout_property(&self, node: NodeId) -> Result<&LayoutProperty, LayoutError>;

    /// All children of `node`, in declaration order.
    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, LayoutError>;

    fn child_by_index(&self, node: NodeId, index: usize) -> Result<Option<NodeId>, LayoutError>;

    /// Inactive nodes keep their geometry but are skipped when painting.
    fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), LayoutError>;

    fn is_active(&self, node: NodeId) -> Result<bool, LayoutError>;

    /// Distance from the top of the node to its first text baseline.
    fn baseline_distance(&self, node: NodeId) -> Result<f32, LayoutError>;
}

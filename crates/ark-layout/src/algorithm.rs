//! Container layout algorithms and their dispatch.

use ark_core::{LayoutContext, LayoutError, LayoutVariant, LayoutWrapper, NodeId};

use crate::relative::RelativeContainerLayoutAlgorithm;
use crate::wrap::WrapLayoutAlgorithm;

/// A two-phase container layout: measure sizes the container and its
/// children, layout positions the children.
///
/// Algorithms keep per-pass state between the two calls; measure must run
/// before layout.
pub trait LayoutAlgorithm {
    fn measure<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError>;

    fn layout<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError>;
}

/// The algorithm a container node runs, chosen from its [`LayoutVariant`].
#[derive(Debug, Clone)]
pub enum LayoutAlgorithmVariant {
    Relative(RelativeContainerLayoutAlgorithm),
    Wrap(WrapLayoutAlgorithm),
}

impl LayoutAlgorithmVariant {
    /// Algorithm for a node variant; leaves have none.
    pub fn for_variant(variant: &LayoutVariant) -> Option<Self> {
        match variant {
            LayoutVariant::Leaf => None,
            LayoutVariant::Relative => Some(Self::Relative(RelativeContainerLayoutAlgorithm::new())),
            LayoutVariant::Wrap(_) => Some(Self::Wrap(WrapLayoutAlgorithm::new())),
        }
    }

    /// Whether this algorithm serves `variant`.
    pub fn matches(&self, variant: &LayoutVariant) -> bool {
        matches!(
            (self, variant),
            (Self::Relative(_), LayoutVariant::Relative) | (Self::Wrap(_), LayoutVariant::Wrap(_))
        )
    }
}

impl LayoutAlgorithm for LayoutAlgorithmVariant {
    fn measure<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        match self {
            Self::Relative(algorithm) => algorithm.measure(wrapper, node, ctx),
            Self::Wrap(algorithm) => algorithm.measure(wrapper, node, ctx),
        }
    }

    fn layout<W: LayoutWrapper + ?Sized>(
        &mut self,
        wrapper: &mut W,
        node: NodeId,
        ctx: &LayoutContext,
    ) -> Result<(), LayoutError> {
        match self {
            Self::Relative(algorithm) => algorithm.layout(wrapper, node, ctx),
            Self::Wrap(algorithm) => algorithm.layout(wrapper, node, ctx),
        }
    }
}

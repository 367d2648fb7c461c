//! Container layout algorithms for the ArkUI layout core.
//!
//! This crate computes the sizes and positions of container children.
//!
//! # Architecture
//!
//! 1. **Layout tree**: an arena of nodes implementing [`LayoutWrapper`]
//! 2. **Relative container**: children aligned to sibling anchors, solved in
//!    dependency order
//! 3. **Wrap**: flow layout packing children into rows or columns
//!
//! # Example
//!
//! ```
//! use ark_core::{CalcSize, LayoutConstraint, LayoutContext, LayoutProperty, LayoutVariant, Size, WrapProperty};
//! use ark_layout::LayoutTree;
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.insert_root(
//!     LayoutProperty::new(LayoutVariant::Wrap(WrapProperty::horizontal())).with_size(CalcSize::px(300.0, 200.0)),
//! );
//! for _ in 0..4 {
//!     tree.insert_child(root, LayoutProperty::default().with_size(CalcSize::px(100.0, 40.0))).unwrap();
//! }
//! tree.compute_layout(root, &LayoutConstraint::loose(Size::new(800.0, 600.0)), &LayoutContext::default())
//!     .unwrap();
//! ```
//!
//! [`LayoutWrapper`]: ark_core::LayoutWrapper

mod algorithm;
pub mod relative;
mod tree;
pub mod wrap;

pub use algorithm::{LayoutAlgorithm, LayoutAlgorithmVariant};
pub use relative::{AlignState, DependencyGraph, RelativeContainerLayoutAlgorithm};
pub use tree::{LayoutNode, LayoutTree};
pub use wrap::{ContentInfo, WrapLayoutAlgorithm};

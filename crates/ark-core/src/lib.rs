//! Core types for the ArkUI layout core.
//!
//! This crate provides the foundational types used by the layout algorithms:
//! - Geometry (sizes, offsets, rectangles, per-node geometry)
//! - Dimensions and measure constraints
//! - Layout properties, including relative-container align rules and
//!   wrap container settings
//! - The [`LayoutWrapper`] protocol algorithms measure children through
//! - Error types

pub mod constraint;
pub mod context;
pub mod dimension;
pub mod errors;
pub mod geometry;
pub mod property;
pub mod wrapper;

pub use constraint::*;
pub use context::*;
pub use dimension::*;
pub use errors::*;
pub use geometry::*;
pub use property::*;
pub use wrapper::*;

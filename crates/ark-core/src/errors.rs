//! Error types for the layout core.
//!
//! Degenerate input (cyclic anchors, negative sizes, missing anchors) is
//! recovered inside the algorithms and never surfaces here. These errors
//! report a caller handing the wrong node to the layout protocol.

use thiserror::Error;

use crate::wrapper::NodeId;

/// Errors during layout computation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout node {node} does not exist")]
    NodeNotFound { node: NodeId },

    #[error("Layout node {node} has no container layout")]
    NotAContainer { node: NodeId },

    #[error("Layout node {node} was laid out before being measured")]
    MissingConstraint { node: NodeId },
}

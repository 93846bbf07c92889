//! Frame graph error types.

use thiserror::Error;

use super::node::{Node, NodeId};
use crate::resources::DescriptorType;

/// Errors that can occur while building or compiling a frame graph.
///
/// Compile failures are per-frame conditions: the caller should skip
/// submitting the frame and keep running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameGraphError {
    /// No presentation master is registered, so the graph has no output.
    #[error("frame graph has no presentation master")]
    NoPresentationMaster,

    /// The wired dependencies contain a cycle.
    #[error("frame graph contains a dependency cycle through {} node(s)", .nodes.len())]
    CycleDetected {
        /// Nodes that could not be ordered.
        nodes: Vec<Node>,
    },

    /// A descriptor slot is empty or bound to the wrong kind of object.
    #[error("descriptor set {set} binding {binding}: {reason}")]
    InvalidDescriptorBinding {
        set: NodeId,
        binding: u32,
        descriptor_type: DescriptorType,
        reason: String,
    },

    /// Compiled results were requested while the graph is dirty.
    #[error("frame graph has not been compiled since it last changed")]
    NotCompiled,

    /// The node is not (or no longer) part of the graph.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The node exists but is not a render or compute pass.
    #[error("node {0} is not a pass")]
    NotAPass(Node),
}

//! Frame Graph - dependency tracking and command linearization for GPU frames
//!
//! Every GPU object that contributes to a frame (buffers, images, descriptor
//! sets, pipelines, command buffers, passes) is registered with a
//! [`FrameGraph`]. The graph wires dependency edges from the objects' own
//! references, orders them topologically, prunes whatever the presentation
//! master does not need and linearizes the surviving passes into a command
//! stream for a [`Backend`](backend::Backend).
//!
//! # Features
//! - Automatic dependency wiring per object category
//! - Deterministic topological order with cycle detection
//! - Pruning of work that does not reach the presented image
//! - Scoped membership through reference-counted [`Handle`]s
//! - Recompilation only when nodes, edges or object properties change

pub mod backend;
pub mod frame_graph;
pub mod resources;

pub use backend::{Backend, BackendError, BackendResult, DummyBackend};
pub use frame_graph::{
    AnyHandle, CompileState, CompileStats, Cycle, FrameError, FrameExecutor, FrameGraph,
    FrameGraphError, FrameReport, Graph, Handle, Node, NodeId, NodeType, PassRecorder,
};
pub use resources::*;

/// Frame graph library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for a [`FrameGraph`]
#[derive(Debug, Clone)]
pub struct FrameGraphConfig {
    /// Name used as a prefix in log messages
    pub label: String,
    /// Log every pruned node at debug level during compilation
    pub log_pruned_nodes: bool,
    /// Number of nodes to reserve storage for
    pub node_capacity: usize,
}

impl Default for FrameGraphConfig {
    fn default() -> Self {
        Self {
            label: "frame graph".to_string(),
            log_pruned_nodes: true,
            node_capacity: 64,
        }
    }
}

/// Initialize the frame graph library.
///
/// Only logs the version; logger setup is left to the application.
pub fn init() {
    log::info!("Frame Graph v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_frame_graph_creation() {
        let graph = FrameGraph::new();
        assert!(graph.is_empty());
        assert!(graph.is_dirty());
        assert_eq!(graph.config().label, "frame graph");
    }

    #[test]
    fn test_dummy_backend() {
        let backend = DummyBackend::new();
        assert!(backend.name() == "Dummy");
    }
}

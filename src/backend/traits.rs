//! Core backend abstraction traits
//!
//! The frame graph never talks to a GPU API. A backend receives the ordered
//! command buffers produced by [`FrameGraph::record_commands`](crate::FrameGraph::record_commands)
//! and submits them.

use thiserror::Error;

use crate::resources::CommandBuffer;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to record commands: {0}")]
    RecordingFailed(String),
    #[error("Failed to submit commands: {0}")]
    SubmitFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Executes recorded frames.
pub trait Backend {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Submit one frame worth of command buffers, in order.
    fn submit(&mut self, command_buffers: &[CommandBuffer]) -> BackendResult<()>;
}

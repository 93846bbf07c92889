//! Render and compute passes.

use std::fmt;
use std::sync::Arc;

use glam::Vec4;

use crate::backend::{Backend, BackendResult};
use crate::frame_graph::{AnyHandle, Handle, Node};

use super::{Attachment, CommandBuffer};

/// Context handed to a [`CommandRecorder`].
pub struct RecordContext<'a> {
    pub backend: &'a mut dyn Backend,
    /// The pass being recorded.
    pub pass: Node,
    pub label: &'a str,
    pub frame_index: u64,
}

/// Deferred callback producing the commands of one pass.
///
/// Recorders are invoked by the render loop (see
/// [`FrameExecutor`](crate::FrameExecutor)), never by the frame graph itself.
pub trait CommandRecorder: Send + Sync {
    fn record(&self, ctx: &mut RecordContext<'_>) -> BackendResult<CommandBuffer>;
}

impl<F> CommandRecorder for F
where
    F: Fn(&mut RecordContext<'_>) -> BackendResult<CommandBuffer> + Send + Sync,
{
    fn record(&self, ctx: &mut RecordContext<'_>) -> BackendResult<CommandBuffer> {
        self(ctx)
    }
}

/// A graphics pass writing a set of attachments.
///
/// Depends on its command buffer; every attachment depends on the pass.
#[derive(Clone)]
pub struct RenderPass {
    pub label: String,
    pub attachments: Vec<Handle<Attachment>>,
    pub commands: Option<Handle<CommandBuffer>>,
    pub clear_color: Vec4,
    pub recorder: Option<Arc<dyn CommandRecorder>>,
}

impl RenderPass {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            attachments: Vec::new(),
            commands: None,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            recorder: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Handle<Attachment>) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_commands(mut self, commands: Handle<CommandBuffer>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn with_clear_color(mut self, clear_color: Vec4) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_recorder(mut self, recorder: impl CommandRecorder + 'static) -> Self {
        self.recorder = Some(Arc::new(recorder));
        self
    }

    /// Closure form of [`with_recorder`](Self::with_recorder).
    pub fn with_recorder_fn<F>(self, recorder: F) -> Self
    where
        F: Fn(&mut RecordContext<'_>) -> BackendResult<CommandBuffer> + Send + Sync + 'static,
    {
        self.with_recorder(recorder)
    }
}

impl fmt::Debug for RenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPass")
            .field("label", &self.label)
            .field("attachments", &self.attachments)
            .field("commands", &self.commands)
            .field("has_recorder", &self.recorder.is_some())
            .finish()
    }
}

/// A compute pass writing arbitrary resources.
///
/// Depends on its command buffer; every written resource depends on the pass.
#[derive(Clone)]
pub struct ComputePass {
    pub label: String,
    pub writes: Vec<AnyHandle>,
    pub commands: Option<Handle<CommandBuffer>>,
    pub recorder: Option<Arc<dyn CommandRecorder>>,
}

impl ComputePass {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            writes: Vec::new(),
            commands: None,
            recorder: None,
        }
    }

    pub fn with_write(mut self, resource: impl Into<AnyHandle>) -> Self {
        self.writes.push(resource.into());
        self
    }

    pub fn with_commands(mut self, commands: Handle<CommandBuffer>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn with_recorder(mut self, recorder: impl CommandRecorder + 'static) -> Self {
        self.recorder = Some(Arc::new(recorder));
        self
    }

    /// Closure form of [`with_recorder`](Self::with_recorder).
    pub fn with_recorder_fn<F>(self, recorder: F) -> Self
    where
        F: Fn(&mut RecordContext<'_>) -> BackendResult<CommandBuffer> + Send + Sync + 'static,
    {
        self.with_recorder(recorder)
    }
}

impl fmt::Debug for ComputePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputePass")
            .field("label", &self.label)
            .field("writes", &self.writes)
            .field("commands", &self.commands)
            .field("has_recorder", &self.recorder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_recorder() {
        let pass = RenderPass::new("main")
            .with_recorder_fn(|_| Ok(CommandBuffer::new()));
        let debug = format!("{:?}", pass);
        assert!(debug.contains("main"));
        assert!(debug.contains("has_recorder: true"));
    }
}

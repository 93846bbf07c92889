//! Recorded commands and command buffers.

use std::ops::Range;

use glam::{UVec3, Vec2, Vec4};

use crate::frame_graph::{Handle, Node, NodeId};

use super::{Attachment, DescriptorSet, IndexBuffer, Pipeline, VertexBuffer};

/// Discriminant of a [`Command`], for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    BeginRenderPass,
    EndRenderPass,
    BindGraphicsPipeline,
    BindComputePipeline,
    BindVertexBuffer,
    BindIndexBuffer,
    BindDescriptorSet,
    SetViewport,
    Draw,
    DrawIndexed,
    Dispatch,
    ExecuteCommands,
}

/// A single recorded GPU command.
///
/// Bind commands hold handles to what they bind, so recorded commands keep
/// their resources alive.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginRenderPass {
        pass: NodeId,
        label: String,
        attachments: Vec<Handle<Attachment>>,
        clear_color: Vec4,
    },
    EndRenderPass,
    BindGraphicsPipeline(Handle<Pipeline>),
    BindComputePipeline(Handle<Pipeline>),
    BindVertexBuffer {
        slot: u32,
        buffer: Handle<VertexBuffer>,
    },
    BindIndexBuffer(Handle<IndexBuffer>),
    BindDescriptorSet {
        index: u32,
        set: Handle<DescriptorSet>,
    },
    SetViewport {
        origin: Vec2,
        extent: Vec2,
    },
    Draw {
        vertices: Range<u32>,
        instances: Range<u32>,
    },
    DrawIndexed {
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    },
    Dispatch {
        groups: UVec3,
    },
    /// Run a nested command buffer.
    ExecuteCommands(Handle<CommandBuffer>),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::BeginRenderPass { .. } => CommandKind::BeginRenderPass,
            Command::EndRenderPass => CommandKind::EndRenderPass,
            Command::BindGraphicsPipeline(_) => CommandKind::BindGraphicsPipeline,
            Command::BindComputePipeline(_) => CommandKind::BindComputePipeline,
            Command::BindVertexBuffer { .. } => CommandKind::BindVertexBuffer,
            Command::BindIndexBuffer(_) => CommandKind::BindIndexBuffer,
            Command::BindDescriptorSet { .. } => CommandKind::BindDescriptorSet,
            Command::SetViewport { .. } => CommandKind::SetViewport,
            Command::Draw { .. } => CommandKind::Draw,
            Command::DrawIndexed { .. } => CommandKind::DrawIndexed,
            Command::Dispatch { .. } => CommandKind::Dispatch,
            Command::ExecuteCommands(_) => CommandKind::ExecuteCommands,
        }
    }

    /// Push the id of every handle this command stores.
    pub(crate) fn held_handles(&self, held: &mut Vec<NodeId>) {
        match self {
            Command::BeginRenderPass { attachments, .. } => {
                held.extend(attachments.iter().map(Handle::id));
            }
            _ => held.extend(self.bound_node().map(|node| node.id)),
        }
    }

    /// The object this command binds, if it is a binding command.
    ///
    /// A nested command buffer counts as bound by the buffer executing it.
    pub fn bound_node(&self) -> Option<Node> {
        match self {
            Command::BindGraphicsPipeline(pipeline) | Command::BindComputePipeline(pipeline) => {
                Some(pipeline.node())
            }
            Command::BindVertexBuffer { buffer, .. } => Some(buffer.node()),
            Command::BindIndexBuffer(buffer) => Some(buffer.node()),
            Command::BindDescriptorSet { set, .. } => Some(set.node()),
            Command::ExecuteCommands(nested) => Some(nested.node()),
            _ => None,
        }
    }
}

/// An ordered list of commands.
///
/// Registered command buffers are graph nodes depending on everything they
/// bind. The top-level buffer produced by
/// [`FrameGraph::record_commands`](crate::FrameGraph::record_commands) is not
/// registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBuffer {
    pub label: Option<String>,
    pub commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn bind_graphics_pipeline(&mut self, pipeline: &Handle<Pipeline>) -> &mut Self {
        self.push(Command::BindGraphicsPipeline(pipeline.clone()))
    }

    pub fn bind_compute_pipeline(&mut self, pipeline: &Handle<Pipeline>) -> &mut Self {
        self.push(Command::BindComputePipeline(pipeline.clone()))
    }

    pub fn bind_vertex_buffer(&mut self, slot: u32, buffer: &Handle<VertexBuffer>) -> &mut Self {
        self.push(Command::BindVertexBuffer {
            slot,
            buffer: buffer.clone(),
        })
    }

    pub fn bind_index_buffer(&mut self, buffer: &Handle<IndexBuffer>) -> &mut Self {
        self.push(Command::BindIndexBuffer(buffer.clone()))
    }

    pub fn bind_descriptor_set(&mut self, index: u32, set: &Handle<DescriptorSet>) -> &mut Self {
        self.push(Command::BindDescriptorSet {
            index,
            set: set.clone(),
        })
    }

    pub fn set_viewport(&mut self, origin: Vec2, extent: Vec2) -> &mut Self {
        self.push(Command::SetViewport { origin, extent })
    }

    pub fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) -> &mut Self {
        self.push(Command::Draw {
            vertices,
            instances,
        })
    }

    pub fn draw_indexed(
        &mut self,
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    ) -> &mut Self {
        self.push(Command::DrawIndexed {
            indices,
            base_vertex,
            instances,
        })
    }

    pub fn dispatch(&mut self, groups: UVec3) -> &mut Self {
        self.push(Command::Dispatch { groups })
    }

    pub fn execute(&mut self, nested: &Handle<CommandBuffer>) -> &mut Self {
        self.push(Command::ExecuteCommands(nested.clone()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = CommandKind> + '_ {
        self.commands.iter().map(Command::kind)
    }

    /// Nodes bound by this buffer's commands, in recording order.
    pub fn bound_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.commands.iter().filter_map(Command::bound_node)
    }
}

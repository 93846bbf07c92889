//! Objects tracked by the frame graph.
//!
//! Each type here maps to exactly one [`NodeType`]. Producers build these
//! plain descriptions, register them with a [`FrameGraph`](crate::FrameGraph)
//! and reference each other through [`Handle`](crate::Handle)s. The wiring
//! pass reads the referencing fields to derive dependency edges.

mod buffer;
mod command;
mod descriptor;
mod image;
mod pass;
mod pipeline;
mod presentation;

pub use buffer::*;
pub use command::*;
pub use descriptor::*;
pub use image::*;
pub use pass::*;
pub use pipeline::*;
pub use presentation::*;

use crate::frame_graph::{AnyHandle, Handle, NodeId, NodeType};

/// Contract for objects that can join a frame graph.
///
/// Implemented for every variant of [`Resource`]; the category is fixed per
/// type, so no runtime type inspection is needed.
pub trait Trackable: Into<Resource> + Sized + 'static {
    const NODE_TYPE: NodeType;

    fn from_resource(resource: &Resource) -> Option<&Self>;

    fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self>;
}

macro_rules! tracked_resources {
    ($($ty:ident),* $(,)?) => {
        /// Payload of one tracked node.
        #[derive(Debug)]
        pub enum Resource {
            $($ty($ty),)*
        }

        impl Resource {
            pub fn node_type(&self) -> NodeType {
                match self {
                    $(Resource::$ty(_) => NodeType::$ty,)*
                }
            }
        }

        $(
            impl From<$ty> for Resource {
                fn from(value: $ty) -> Self {
                    Resource::$ty(value)
                }
            }

            impl Trackable for $ty {
                const NODE_TYPE: NodeType = NodeType::$ty;

                fn from_resource(resource: &Resource) -> Option<&Self> {
                    match resource {
                        Resource::$ty(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self> {
                    match resource {
                        Resource::$ty(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

tracked_resources!(
    Buffer,
    BufferView,
    VertexBuffer,
    IndexBuffer,
    UniformBuffer,
    Image,
    ImageView,
    Texture,
    Sampler,
    DescriptorSetLayout,
    DescriptorPool,
    DescriptorSet,
    Pipeline,
    CommandBuffer,
    Attachment,
    RenderPass,
    ComputePass,
    PresentationMaster,
);

impl Resource {
    /// Debug label of the wrapped object, if it has one.
    pub fn label(&self) -> Option<&str> {
        match self {
            Resource::Buffer(b) => b.label(),
            Resource::Image(i) => i.label(),
            Resource::Sampler(s) => s.label(),
            Resource::DescriptorSetLayout(l) => l.label.as_deref(),
            Resource::DescriptorPool(p) => p.label.as_deref(),
            Resource::DescriptorSet(s) => s.label.as_deref(),
            Resource::Pipeline(p) => p.label.as_deref(),
            Resource::CommandBuffer(c) => c.label.as_deref(),
            Resource::Attachment(a) => a.label.as_deref(),
            Resource::RenderPass(p) => Some(&p.label),
            Resource::ComputePass(p) => Some(&p.label),
            _ => None,
        }
    }
}

impl Resource {
    /// Node ids of every handle stored in this payload, one entry per clone.
    ///
    /// Handles captured by command recorders are opaque and not listed.
    pub(crate) fn held_handles(&self) -> Vec<NodeId> {
        let mut held = Vec::new();
        match self {
            Resource::Buffer(_)
            | Resource::Image(_)
            | Resource::Sampler(_)
            | Resource::DescriptorSetLayout(_)
            | Resource::DescriptorPool(_) => {}
            Resource::BufferView(view) => held.push(view.buffer.id()),
            Resource::VertexBuffer(buffer) => held.push(buffer.view.id()),
            Resource::IndexBuffer(buffer) => held.push(buffer.view.id()),
            Resource::UniformBuffer(buffer) => held.push(buffer.view.id()),
            Resource::ImageView(view) => held.push(view.image.id()),
            Resource::Texture(texture) => {
                held.push(texture.view.id());
                held.extend(texture.sampler.as_ref().map(Handle::id));
            }
            Resource::DescriptorSet(set) => {
                held.extend(set.layout.as_ref().map(Handle::id));
                held.extend(set.pool.as_ref().map(Handle::id));
                held.extend(
                    set.descriptors
                        .iter()
                        .filter_map(|d| d.resource.as_ref())
                        .map(|r| r.node().id),
                );
            }
            Resource::Pipeline(pipeline) => held.extend(pipeline.layouts.iter().map(Handle::id)),
            Resource::CommandBuffer(commands) => {
                for command in &commands.commands {
                    command.held_handles(&mut held);
                }
            }
            Resource::Attachment(attachment) => {
                if let Some(target) = &attachment.target {
                    held.push(target.image.id());
                    held.push(target.view.id());
                }
            }
            Resource::RenderPass(pass) => {
                held.extend(pass.attachments.iter().map(Handle::id));
                held.extend(pass.commands.as_ref().map(Handle::id));
            }
            Resource::ComputePass(pass) => {
                held.extend(pass.writes.iter().map(AnyHandle::id));
                held.extend(pass.commands.as_ref().map(Handle::id));
            }
            Resource::PresentationMaster(master) => {
                held.extend(master.color_attachment.as_ref().map(Handle::id));
            }
        }
        held
    }
}

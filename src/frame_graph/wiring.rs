//! Automatic dependency wiring.
//!
//! Each category has at most one wiring rule, looked up in a table indexed by
//! [`NodeType`]. A rule inspects the current properties of one object and
//! emits the edges it implies. Wiring runs from scratch on every compile since
//! properties may have changed since the last one.
//!
//! | Category | Edges |
//! |----------|-------|
//! | PresentationMaster | color attachment -> master |
//! | RenderPass | pass -> each attachment, command buffer -> pass |
//! | ComputePass | pass -> each written resource, command buffer -> pass |
//! | CommandBuffer | each bound object -> command buffer |
//! | Vertex/Index/UniformBuffer | buffer view -> buffer |
//! | BufferView | buffer -> view |
//! | DescriptorSet | layout, pool and each bound object -> set |
//! | Attachment | attachment -> image -> image view |
//! | ImageView | image -> view |
//! | Texture | image view, sampler -> texture |
//! | Pipeline | each descriptor set layout -> pipeline |

use super::arena::ResourceArena;
use super::error::FrameGraphError;
use super::handle::Handle;
use super::node::{Node, NodeType};
use crate::resources::{
    Attachment, BufferView, CommandBuffer, ComputePass, DescriptorSet, DescriptorSetLayout,
    ImageView, IndexBuffer, Pipeline, PresentationMaster, RenderPass, Resource, Texture,
    Trackable, UniformBuffer, VertexBuffer,
};

/// Edge sink handed to wiring rules.
pub(crate) struct Wiring<'a> {
    arena: &'a ResourceArena,
    edges: Vec<(Node, Node)>,
}

impl<'a> Wiring<'a> {
    fn new(arena: &'a ResourceArena) -> Self {
        Self {
            arena,
            edges: Vec::new(),
        }
    }

    /// Record that `to` depends on `from`.
    pub fn connect(&mut self, from: Node, to: Node) {
        self.edges.push((from, to));
    }

    /// Resolve a handle to its payload.
    pub fn get<T: Trackable>(&self, handle: &Handle<T>) -> Option<&'a T> {
        self.arena.get(handle.id()).and_then(T::from_resource)
    }
}

pub(crate) type WireFn = fn(&mut Wiring<'_>, Node, &Resource) -> Result<(), FrameGraphError>;

/// Category -> wiring rule dispatch table.
#[derive(Clone)]
pub(crate) struct WiringTable {
    rules: [Option<WireFn>; NodeType::COUNT],
}

impl Default for WiringTable {
    fn default() -> Self {
        let mut table = Self {
            rules: [None; NodeType::COUNT],
        };
        table.set(NodeType::PresentationMaster, wire_presentation_master);
        table.set(NodeType::RenderPass, wire_render_pass);
        table.set(NodeType::ComputePass, wire_compute_pass);
        table.set(NodeType::CommandBuffer, wire_command_buffer);
        table.set(NodeType::VertexBuffer, wire_vertex_buffer);
        table.set(NodeType::IndexBuffer, wire_index_buffer);
        table.set(NodeType::UniformBuffer, wire_uniform_buffer);
        table.set(NodeType::BufferView, wire_buffer_view);
        table.set(NodeType::DescriptorSet, wire_descriptor_set);
        table.set(NodeType::Attachment, wire_attachment);
        table.set(NodeType::ImageView, wire_image_view);
        table.set(NodeType::Texture, wire_texture);
        table.set(NodeType::Pipeline, wire_pipeline);
        table
    }
}

impl WiringTable {
    pub fn set(&mut self, node_type: NodeType, rule: WireFn) {
        self.rules[node_type.index()] = Some(rule);
    }

    pub fn rule(&self, node_type: NodeType) -> Option<WireFn> {
        self.rules[node_type.index()]
    }

    /// Run every applicable rule over `nodes`, in order.
    pub fn wire(
        &self,
        arena: &ResourceArena,
        nodes: &[Node],
    ) -> Result<Vec<(Node, Node)>, FrameGraphError> {
        let mut wiring = Wiring::new(arena);
        for node in nodes {
            let Some(rule) = self.rule(node.node_type) else {
                continue;
            };
            let Some(resource) = arena.get(node.id) else {
                continue;
            };
            rule(&mut wiring, *node, resource)?;
        }
        Ok(wiring.edges)
    }
}

fn wire_presentation_master(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    let Some(master) = PresentationMaster::from_resource(resource) else {
        return Ok(());
    };
    if let Some(attachment) = &master.color_attachment {
        w.connect(attachment.node(), node);
    }
    Ok(())
}

fn wire_render_pass(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    let Some(pass) = RenderPass::from_resource(resource) else {
        return Ok(());
    };
    for attachment in &pass.attachments {
        w.connect(node, attachment.node());
    }
    if let Some(commands) = &pass.commands {
        w.connect(commands.node(), node);
    }
    Ok(())
}

fn wire_compute_pass(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    let Some(pass) = ComputePass::from_resource(resource) else {
        return Ok(());
    };
    for written in &pass.writes {
        w.connect(node, written.node());
    }
    if let Some(commands) = &pass.commands {
        w.connect(commands.node(), node);
    }
    Ok(())
}

fn wire_command_buffer(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    let Some(commands) = CommandBuffer::from_resource(resource) else {
        return Ok(());
    };
    for bound in commands.bound_nodes() {
        w.connect(bound, node);
    }
    Ok(())
}

fn wire_vertex_buffer(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    if let Some(buffer) = VertexBuffer::from_resource(resource) {
        w.connect(buffer.view.node(), node);
    }
    Ok(())
}

fn wire_index_buffer(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    if let Some(buffer) = IndexBuffer::from_resource(resource) {
        w.connect(buffer.view.node(), node);
    }
    Ok(())
}

fn wire_uniform_buffer(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    if let Some(buffer) = UniformBuffer::from_resource(resource) {
        w.connect(buffer.view.node(), node);
    }
    Ok(())
}

fn wire_buffer_view(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    if let Some(view) = BufferView::from_resource(resource) {
        w.connect(view.buffer.node(), node);
    }
    Ok(())
}

fn wire_descriptor_set(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    let Some(set) = DescriptorSet::from_resource(resource) else {
        return Ok(());
    };

    let layout: Option<&DescriptorSetLayout> = set.layout.as_ref().and_then(|l| w.get(l));
    if let Some(handle) = &set.layout {
        w.connect(handle.node(), node);
    }
    if let Some(pool) = &set.pool {
        w.connect(pool.node(), node);
    }

    for descriptor in &set.descriptors {
        let invalid = |reason: String| FrameGraphError::InvalidDescriptorBinding {
            set: node.id,
            binding: descriptor.binding,
            descriptor_type: descriptor.descriptor_type,
            reason,
        };

        if let Some(layout) = layout {
            match layout.binding(descriptor.binding) {
                None => return Err(invalid("binding is not declared by the layout".into())),
                Some(declared) if declared.descriptor_type != descriptor.descriptor_type => {
                    return Err(invalid(format!(
                        "layout declares {:?}, set uses {:?}",
                        declared.descriptor_type, descriptor.descriptor_type
                    )));
                }
                Some(_) => {}
            }
        }

        let Some(bound) = &descriptor.resource else {
            return Err(invalid("nothing bound".into()));
        };
        if !bound.matches(descriptor.descriptor_type) {
            return Err(invalid(format!(
                "{} cannot back a {:?} slot",
                bound.node().node_type,
                descriptor.descriptor_type
            )));
        }
        w.connect(bound.node(), node);
    }
    Ok(())
}

fn wire_attachment(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    let Some(attachment) = Attachment::from_resource(resource) else {
        return Ok(());
    };
    // Attachment -> Image -> ImageView, never Attachment -> ImageView.
    if let Some(target) = &attachment.target {
        w.connect(node, target.image.node());
        w.connect(target.image.node(), target.view.node());
    }
    Ok(())
}

fn wire_image_view(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    if let Some(view) = ImageView::from_resource(resource) {
        w.connect(view.image.node(), node);
    }
    Ok(())
}

fn wire_texture(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    let Some(texture) = Texture::from_resource(resource) else {
        return Ok(());
    };
    w.connect(texture.view.node(), node);
    if let Some(sampler) = &texture.sampler {
        w.connect(sampler.node(), node);
    }
    Ok(())
}

fn wire_pipeline(
    w: &mut Wiring<'_>,
    node: Node,
    resource: &Resource,
) -> Result<(), FrameGraphError> {
    if let Some(pipeline) = Pipeline::from_resource(resource) {
        for layout in &pipeline.layouts {
            w.connect(layout.node(), node);
        }
    }
    Ok(())
}

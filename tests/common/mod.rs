//! Shared helpers for frame graph integration tests.

#![allow(dead_code)]

use glam::{UVec2, Vec2};

use frame_graph::{
    Attachment, Buffer, BufferDescriptor, BufferUsage, BufferView, CommandBuffer, FrameGraph,
    Handle, Image, ImageDescriptor, ImageView, Node, Pipeline, PresentationMaster, RenderPass,
    TextureFormat, TextureUsage, VertexBuffer,
};

pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Handles of a single textured triangle rendered into the presented image.
pub struct TriangleScene {
    pub buffer: Handle<Buffer>,
    pub view: Handle<BufferView>,
    pub vertices: Handle<VertexBuffer>,
    pub pipeline: Handle<Pipeline>,
    pub commands: Handle<CommandBuffer>,
    pub image: Handle<Image>,
    pub image_view: Handle<ImageView>,
    pub color: Handle<Attachment>,
    pub pass: Handle<RenderPass>,
    pub master: Handle<PresentationMaster>,
}

impl TriangleScene {
    pub fn build(graph: &mut FrameGraph) -> Self {
        let buffer = graph.register(Buffer::new(
            BufferDescriptor::new(3 * 32, BufferUsage::VERTEX | BufferUsage::COPY_DST)
                .with_label("triangle vertices"),
        ));
        let view = graph.register(BufferView::whole(buffer.clone()));
        let vertices = graph.register(VertexBuffer::new(view.clone(), 32));
        let pipeline = graph.register(Pipeline::graphics().with_label("unlit"));

        let mut draws = CommandBuffer::with_label("triangle");
        draws
            .bind_graphics_pipeline(&pipeline)
            .bind_vertex_buffer(0, &vertices)
            .set_viewport(Vec2::ZERO, Vec2::new(WIDTH as f32, HEIGHT as f32))
            .draw(0..3, 0..1);
        let commands = graph.register(draws);

        let (image, image_view) = register_image(graph);
        let color = graph.register(
            Attachment::new(TextureFormat::Bgra8UnormSrgb)
                .with_label("backbuffer")
                .with_target(image.clone(), image_view.clone()),
        );
        let pass = graph.register(
            RenderPass::new("main")
                .with_attachment(color.clone())
                .with_commands(commands.clone()),
        );
        let master = graph.register(PresentationMaster::new(color.clone()));

        Self {
            buffer,
            view,
            vertices,
            pipeline,
            commands,
            image,
            image_view,
            color,
            pass,
            master,
        }
    }
}

pub fn register_image(graph: &mut FrameGraph) -> (Handle<Image>, Handle<ImageView>) {
    let image = graph.register(Image::new(ImageDescriptor::new(
        UVec2::new(WIDTH, HEIGHT),
        TextureFormat::Bgra8UnormSrgb,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )));
    let view = graph.register(ImageView::new(image.clone()));
    (image, view)
}

/// Position of `node` in a compiled order.
pub fn position(order: &[Node], node: Node) -> usize {
    order
        .iter()
        .position(|n| *n == node)
        .unwrap_or_else(|| panic!("{node} missing from compiled order"))
}

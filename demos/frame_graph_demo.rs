//! Headless frame graph demo.
//!
//! Builds a small deferred-style frame (scene pass, bloom compute pass,
//! optional debug overlay) and renders it against the dummy backend.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example frame_graph_demo -- --frames 4 --debug-overlay
//! ```

use clap::Parser;
use glam::{UVec2, UVec3, Vec2, Vec4};

use frame_graph::{
    Attachment, Buffer, BufferDescriptor, BufferUsage, BufferView, CommandBuffer, ComputePass,
    DummyBackend, FrameExecutor, FrameGraph, FrameGraphConfig, Image, ImageDescriptor, ImageView,
    Pipeline, PresentationMaster, RenderPass, TextureFormat, TextureUsage, VertexBuffer,
};

/// Frame graph demo arguments.
#[derive(Parser, Debug)]
#[command(name = "frame_graph_demo", about = "Render a few frames of a frame graph headlessly")]
struct Args {
    /// Number of frames to render.
    #[arg(long, default_value = "3")]
    frames: u64,

    /// Render target width in pixels.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Render target height in pixels.
    #[arg(long, default_value = "720")]
    height: u32,

    /// Register a debug overlay pass that nothing presents (gets pruned).
    #[arg(long)]
    debug_overlay: bool,

    /// Drop the bloom pass after this many frames.
    #[arg(long)]
    drop_bloom_after: Option<u64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    frame_graph::init();

    let args = Args::parse();
    let extent = UVec2::new(args.width, args.height);

    let mut graph = FrameGraph::with_config(FrameGraphConfig {
        label: "demo".to_string(),
        ..Default::default()
    });

    let vertex_data = graph.register(Buffer::new(
        BufferDescriptor::new(4096, BufferUsage::VERTEX | BufferUsage::STORAGE)
            .with_label("mesh vertices"),
    ));
    let vertex_view = graph.register(BufferView::whole(vertex_data.clone()));
    let vertices = graph.register(VertexBuffer::new(vertex_view, 32));
    let lit = graph.register(Pipeline::graphics().with_label("lit"));

    let hdr = graph.register(Image::new(
        ImageDescriptor::new(extent, TextureFormat::Rgba16Float, TextureUsage::RENDER_ATTACHMENT)
            .with_label("hdr"),
    ));
    let hdr_view = graph.register(ImageView::new(hdr.clone()));
    let backbuffer = graph.register(
        Attachment::new(TextureFormat::Bgra8UnormSrgb)
            .with_label("backbuffer")
            .with_target(hdr, hdr_view),
    );

    let viewport = Vec2::new(args.width as f32, args.height as f32);
    let scene_pipeline = lit.clone();
    let _scene = graph.register(
        RenderPass::new("scene")
            .with_attachment(backbuffer.clone())
            .with_clear_color(Vec4::new(0.1, 0.1, 0.12, 1.0))
            .with_recorder_fn(move |ctx| {
                let mut commands = CommandBuffer::with_label(ctx.label);
                commands
                    .bind_graphics_pipeline(&scene_pipeline)
                    .bind_vertex_buffer(0, &vertices)
                    .set_viewport(Vec2::ZERO, viewport)
                    .draw(0..36, 0..1);
                Ok(commands)
            }),
    );

    let blur = graph.register(Pipeline::compute().with_label("bloom blur"));
    let groups = UVec3::new(extent.x.div_ceil(8), extent.y.div_ceil(8), 1);
    let mut bloom = Some(graph.register(
        ComputePass::new("bloom")
            .with_write(vertex_data.clone())
            .with_recorder_fn(move |ctx| {
                let mut commands = CommandBuffer::with_label(ctx.label);
                commands.bind_compute_pipeline(&blur).dispatch(groups);
                Ok(commands)
            }),
    ));

    let _overlay = args.debug_overlay.then(|| {
        let target = graph.register(Attachment::new(TextureFormat::Rgba8Unorm).with_label("debug"));
        graph.register(RenderPass::new("debug overlay").with_attachment(target))
    });

    let _master = graph.register(PresentationMaster::new(backbuffer));

    let mut executor = FrameExecutor::new(DummyBackend::new());
    for frame in 0..args.frames {
        if args.drop_bloom_after == Some(frame) {
            if let Some(pass) = bloom.take() {
                log::info!("Dropping {}", pass.node());
            }
        }

        match executor.render_frame(&mut graph) {
            Ok(report) => log::info!(
                "Frame {}: {} pass(es) recorded, {} command(s), recompiled: {}",
                report.frame_index,
                report.passes_recorded,
                report.commands,
                report.recompiled
            ),
            Err(err) => log::warn!("Frame {} skipped: {}", frame, err),
        }
    }

    let stats = graph.stats();
    log::info!(
        "{} compilation(s), {} node(s), {} sorted, {} pruned, {} frame(s) submitted",
        stats.compilations,
        stats.nodes,
        stats.sorted,
        stats.pruned,
        executor.backend().submitted_frames()
    );
}

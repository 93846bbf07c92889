use glam::UVec2;

use super::*;
use crate::resources::{
    Attachment, Buffer, BufferDescriptor, BufferUsage, BufferView, CommandKind, Image,
    ImageDescriptor, ImageView, PresentationMaster, TextureFormat, TextureUsage, VertexBuffer,
};

fn buffer() -> Buffer {
    Buffer::new(BufferDescriptor::new(256, BufferUsage::VERTEX))
}

/// Attachment + presentation master, the minimal compilable graph.
fn presentable(graph: &mut FrameGraph) -> (Handle<Attachment>, Handle<PresentationMaster>) {
    let color = graph.register(Attachment::new(TextureFormat::Bgra8UnormSrgb));
    let master = graph.register(PresentationMaster::new(color.clone()));
    (color, master)
}

#[test]
fn register_and_get() {
    let mut graph = FrameGraph::new();
    let handle = graph.register(buffer());

    assert_eq!(graph.len(), 1);
    assert_eq!(handle.node().node_type, NodeType::Buffer);
    assert!(graph.contains(&handle.node()));
    assert_eq!(graph.get(&handle).map(Buffer::size), Some(256));
    assert_eq!(graph.nodes_of_type(NodeType::Buffer), &[handle.node()]);
    assert_eq!(graph.node(handle.id()), Some(handle.node()));
}

#[test]
fn dropping_last_handle_removes_node() {
    let mut graph = FrameGraph::new();
    let handle = graph.register(buffer());
    let node = handle.node();
    let clone = handle.clone();

    drop(handle);
    assert!(graph.contains(&node));

    drop(clone);
    assert!(!graph.contains(&node));
    assert!(graph.is_dirty());

    graph.collect_released();
    assert_eq!(graph.len(), 0);
    assert!(graph.node(node.id).is_none());
    assert!(graph.nodes_of_type(NodeType::Buffer).is_empty());
}

#[test]
fn release_cascades_through_payload_handles() {
    let mut graph = FrameGraph::new();
    let buffer = graph.register(buffer());
    let view = graph.register(BufferView::whole(buffer.clone()));
    let vertices = graph.register(VertexBuffer::new(view.clone(), 16));
    let buffer_node = buffer.node();
    let vertices_node = vertices.node();
    drop(buffer);
    drop(view);

    // The vertex buffer still holds the view, which holds the buffer.
    graph.collect_released();
    assert_eq!(graph.len(), 3);

    drop(vertices);
    // Only the vertex buffer is queued until its payload is dropped.
    assert!(!graph.contains(&vertices_node));
    assert!(graph.contains(&buffer_node));
    graph.collect_released();
    assert_eq!(graph.len(), 0);
    assert!(!graph.contains(&buffer_node));
}

#[test]
fn payload_held_nodes_survive_compile() {
    let mut graph = FrameGraph::new();
    let (_color, _master) = presentable(&mut graph);
    let buffer = graph.register(buffer());
    let view = graph.register(BufferView::whole(buffer.clone()));
    let buffer_node = buffer.node();
    drop(buffer);

    graph.compile().unwrap();
    assert_eq!(graph.len(), 4);
    assert!(graph.contains(&buffer_node));
    assert!(graph.contains(&view.node()));
}

#[test]
fn handle_cycle_held_from_outside_is_kept() {
    let mut graph = FrameGraph::new();
    let (_color, _master) = presentable(&mut graph);
    let inner = graph.register(CommandBuffer::with_label("inner"));
    let mut executing = CommandBuffer::with_label("outer");
    executing.execute(&inner);
    let outer = graph.register(executing);
    if let Some(commands) = graph.get_mut(&inner) {
        commands.execute(&outer);
    }
    let inner_node = inner.node();
    drop(inner);

    for _ in 0..2 {
        assert!(matches!(
            graph.compile(),
            Err(FrameGraphError::CycleDetected { .. })
        ));
        assert_eq!(graph.len(), 4);
        assert!(graph.contains(&inner_node));
    }

    drop(outer);
    graph.compile().unwrap();
    assert_eq!(graph.len(), 2);
    assert!(!graph.contains(&inner_node));
}

#[test]
fn compile_is_memoized_until_mutation() {
    let mut graph = FrameGraph::new();
    let (_color, _master) = presentable(&mut graph);

    graph.compile().unwrap();
    graph.compile().unwrap();
    assert_eq!(graph.stats().compilations, 1);
    assert_eq!(graph.state(), CompileState::Compiled);

    let _extra = graph.register(buffer());
    assert_eq!(graph.state(), CompileState::Dirty);
    assert_eq!(graph.sorted(), Err(FrameGraphError::NotCompiled));

    graph.compile().unwrap();
    assert_eq!(graph.stats().compilations, 2);
    assert_eq!(graph.stats().pruned, 1);
}

#[test]
fn get_mut_marks_dirty() {
    let mut graph = FrameGraph::new();
    let (color, _master) = presentable(&mut graph);
    graph.compile().unwrap();

    if let Some(attachment) = graph.get_mut(&color) {
        attachment.label = Some("swapchain".into());
    }
    assert!(graph.is_dirty());
    graph.compile().unwrap();
    assert_eq!(graph.stats().compilations, 2);
}

#[test]
fn failed_compile_leaves_graph_dirty() {
    let mut graph = FrameGraph::new();
    let _buffer = graph.register(buffer());

    assert_eq!(graph.compile(), Err(FrameGraphError::NoPresentationMaster));
    assert_eq!(graph.state(), CompileState::Dirty);
    assert_eq!(graph.stats().compilations, 0);
}

#[test]
fn explicit_edges_survive_rewiring_and_release() {
    let mut graph = FrameGraph::new();
    let (color, _master) = presentable(&mut graph);
    let pass = graph.register(RenderPass::new("main").with_attachment(color.clone()));
    let upload = graph.register(ComputePass::new("upload"));

    assert!(graph.connect(upload.node(), pass.node()));
    assert!(!graph.connect(upload.node(), pass.node()));
    assert!(!graph.connect(pass.node(), pass.node()));

    graph.compile().unwrap();
    assert!(graph.graph().has_edge(&upload.node(), &pass.node()));
    assert!(graph.sorted().unwrap().contains(&upload.node()));

    drop(upload);
    graph.compile().unwrap();
    assert_eq!(graph.explicit_edges.len(), 0);
    assert!(!graph.sorted().unwrap().iter().any(|n| n.node_type == NodeType::ComputePass));
}

#[test]
fn disconnect_removes_only_explicit_edges() {
    let mut graph = FrameGraph::new();
    let (color, master) = presentable(&mut graph);
    let pass = graph.register(ComputePass::new("sim"));
    graph.connect(pass.node(), color.node());

    graph.compile().unwrap();
    assert!(graph.sorted().unwrap().contains(&pass.node()));

    assert!(graph.disconnect(pass.node(), color.node()));
    assert!(!graph.disconnect(color.node(), master.node()));
    graph.compile().unwrap();
    assert!(!graph.sorted().unwrap().contains(&pass.node()));
    assert!(graph.contains(&pass.node()));
}

#[test]
fn install_recorded_creates_then_reuses_command_buffer() {
    let mut graph = FrameGraph::new();
    let (color, _master) = presentable(&mut graph);
    let pass = graph.register(RenderPass::new("main").with_attachment(color.clone()));
    graph.compile().unwrap();

    let mut recorded = CommandBuffer::with_label("main");
    recorded.draw(0..3, 0..1);

    assert!(graph.install_recorded(pass.node(), recorded.clone()).unwrap());
    assert_eq!(graph.nodes_of_type(NodeType::CommandBuffer).len(), 1);
    graph.compile().unwrap();

    assert!(!graph.install_recorded(pass.node(), recorded.clone()).unwrap());
    assert!(!graph.is_dirty());

    recorded.draw(3..6, 0..1);
    assert!(graph.install_recorded(pass.node(), recorded).unwrap());
    assert!(graph.is_dirty());
    assert_eq!(graph.nodes_of_type(NodeType::CommandBuffer).len(), 1);
}

#[test]
fn install_recorded_rejects_non_passes() {
    let mut graph = FrameGraph::new();
    let (color, master) = presentable(&mut graph);

    assert_eq!(
        graph.install_recorded(color.node(), CommandBuffer::new()),
        Err(FrameGraphError::NotAPass(color.node()))
    );

    let stale = color.node();
    drop(color);
    drop(master);
    assert_eq!(
        graph.install_recorded(stale, CommandBuffer::new()),
        Err(FrameGraphError::UnknownNode(stale.id))
    );
}

#[test]
fn pass_recorders_skip_pruned_passes() {
    let mut graph = FrameGraph::new();
    let (color, _master) = presentable(&mut graph);
    let _main = graph.register(
        RenderPass::new("main")
            .with_attachment(color.clone())
            .with_recorder_fn(|_| Ok(CommandBuffer::new())),
    );
    let _debug = graph.register(
        RenderPass::new("debug").with_recorder_fn(|_| Ok(CommandBuffer::new())),
    );
    graph.compile().unwrap();

    let recorders = graph.pass_recorders().unwrap();
    assert_eq!(recorders.len(), 1);
    assert_eq!(recorders[0].label, "main");
}

#[test]
fn record_commands_wraps_render_passes() {
    let mut graph = FrameGraph::new();
    let image = graph.register(Image::new(ImageDescriptor::new(
        UVec2::new(64, 64),
        TextureFormat::Rgba8Unorm,
        TextureUsage::RENDER_ATTACHMENT,
    )));
    let view = graph.register(ImageView::new(image.clone()));
    let color = graph.register(
        Attachment::new(TextureFormat::Rgba8Unorm).with_target(image.clone(), view.clone()),
    );
    let _master = graph.register(PresentationMaster::new(color.clone()));

    let mut draws = CommandBuffer::with_label("draws");
    draws.draw(0..3, 0..1);
    let draws = graph.register(draws);
    let _pass = graph.register(
        RenderPass::new("main")
            .with_attachment(color.clone())
            .with_commands(draws),
    );

    assert_eq!(graph.record_commands(), Err(FrameGraphError::NotCompiled));
    graph.compile().unwrap();

    let frame = graph.record_commands().unwrap();
    assert_eq!(frame.len(), 1);
    assert_eq!(
        frame[0].kinds().collect::<Vec<_>>(),
        vec![
            CommandKind::BeginRenderPass,
            CommandKind::ExecuteCommands,
            CommandKind::EndRenderPass
        ]
    );
}

#[test]
fn extra_presentation_masters_are_ignored() {
    let mut graph = FrameGraph::new();
    let (_color, first) = presentable(&mut graph);
    let other = graph.register(Attachment::new(TextureFormat::Rgba16Float));
    let _second = graph.register(PresentationMaster::new(other.clone()));

    graph.compile().unwrap();
    assert_eq!(graph.presentation_master(), Some(first.node()));
    assert!(!graph.sorted().unwrap().contains(&other.node()));
}

//! Frame graph: dependency tracking and compilation for one frame.
//!
//! Objects registered with a [`FrameGraph`] become nodes. Compilation wires
//! edges from the objects' current properties, sorts the graph topologically
//! and keeps only what the presentation master transitively depends on.
//!
//! # State machine
//!
//! `Dirty -> Compiling -> Compiled`, back to `Dirty` on any node or edge
//! mutation. Compiled results can only be read in the `Compiled` state, and
//! compiling a clean graph is a no-op.
//!
//! # Example
//!
//! ```ignore
//! let mut graph = FrameGraph::new();
//! let color = graph.register(Attachment::new(TextureFormat::Bgra8UnormSrgb));
//! let _pass = graph.register(RenderPass::new("main").with_attachment(color.clone()));
//! let _master = graph.register(PresentationMaster::new(color));
//!
//! graph.compile()?;
//! let frame = graph.record_commands()?;
//! backend.submit(&frame)?;
//! ```

mod arena;
mod error;
mod executor;
mod graph;
mod handle;
mod node;
mod wiring;

pub use error::FrameGraphError;
pub use executor::{FrameError, FrameExecutor, FrameReport};
pub use graph::{Cycle, Graph};
pub use handle::{AnyHandle, Handle};
pub use node::{Node, NodeId, NodeType};

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::resources::{
    Command, CommandBuffer, CommandRecorder, ComputePass, RenderPass, Resource, Trackable,
};
use crate::FrameGraphConfig;
use arena::ResourceArena;
use handle::{ReleaseQueue, Tracker};
use wiring::WiringTable;

/// Compilation state of a [`FrameGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileState {
    /// Nodes or edges changed since the last successful compile.
    Dirty,
    /// A compile is in progress.
    Compiling,
    /// Compiled results are valid.
    Compiled,
}

/// Counters describing the last successful compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Compiles that did real work since the graph was created.
    pub compilations: u64,
    /// Nodes in the graph.
    pub nodes: usize,
    /// Edges after wiring, explicit ones included.
    pub edges: usize,
    /// Edges contributed by the wiring rules.
    pub wired_edges: usize,
    /// Nodes kept in the compiled order.
    pub sorted: usize,
    /// Nodes dropped because the presentation master does not depend on them.
    pub pruned: usize,
}

/// A pass with a recorder, as seen by the render loop.
#[derive(Clone)]
pub struct PassRecorder {
    pub pass: Node,
    pub label: String,
    pub recorder: Arc<dyn CommandRecorder>,
}

impl fmt::Debug for PassRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassRecorder")
            .field("pass", &self.pass)
            .field("label", &self.label)
            .finish()
    }
}

/// Dependency graph of every GPU object used to build a frame.
pub struct FrameGraph {
    config: FrameGraphConfig,
    graph: Graph<Node>,
    arena: ResourceArena,
    /// Registered nodes per category, in registration order.
    by_type: HashMap<NodeType, Vec<Node>>,
    /// Edges added through [`FrameGraph::connect`]; they survive rewiring.
    explicit_edges: Vec<(Node, Node)>,
    wiring: WiringTable,
    releases: Arc<ReleaseQueue>,
    /// Live handle counts per node, without owning the handles.
    memberships: HashMap<NodeId, Tracker>,
    state: CompileState,
    sorted: Vec<Node>,
    sorted_by_type: HashMap<NodeType, Vec<Node>>,
    stats: CompileStats,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self::with_config(FrameGraphConfig::default())
    }

    pub fn with_config(config: FrameGraphConfig) -> Self {
        let capacity = config.node_capacity;
        Self {
            config,
            graph: Graph::with_capacity(capacity),
            arena: ResourceArena::with_capacity(capacity),
            by_type: HashMap::new(),
            explicit_edges: Vec::new(),
            wiring: WiringTable::default(),
            releases: Arc::new(Mutex::new(Vec::new())),
            memberships: HashMap::new(),
            state: CompileState::Dirty,
            sorted: Vec::new(),
            sorted_by_type: HashMap::new(),
            stats: CompileStats::default(),
        }
    }

    pub fn config(&self) -> &FrameGraphConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Register an object and return its membership handle.
    ///
    /// The object stays in the graph until every clone of the handle (including
    /// clones stored inside other registered objects) has been dropped.
    pub fn register<T: Trackable>(&mut self, object: T) -> Handle<T> {
        self.collect_released();

        let id = self.arena.insert(object.into());
        let node = Node::new(id, T::NODE_TYPE);
        self.graph.add_node(node);
        self.by_type.entry(T::NODE_TYPE).or_default().push(node);
        self.mark_dirty();

        log::trace!("{}: registered {}", self.config.label, node);
        let handle = Handle::new(id, &self.releases);
        self.memberships.insert(id, handle.tracker());
        handle
    }

    pub fn get<T: Trackable>(&self, handle: &Handle<T>) -> Option<&T> {
        self.arena.get(handle.id()).and_then(T::from_resource)
    }

    /// Mutable access to a registered object.
    ///
    /// Marks the graph dirty: wiring depends on object properties.
    pub fn get_mut<T: Trackable>(&mut self, handle: &Handle<T>) -> Option<&mut T> {
        self.collect_released();
        self.mark_dirty();
        self.arena.get_mut(handle.id()).and_then(T::from_resource_mut)
    }

    /// Payload of any node.
    pub fn resource(&self, id: NodeId) -> Option<&Resource> {
        self.arena.get(id)
    }

    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.arena
            .get(id)
            .map(|resource| Node::new(id, resource.node_type()))
    }

    /// Whether `node` is currently a member of the graph.
    ///
    /// Pruned nodes stay members; released ones do not. A node whose last
    /// handle is stored in the payload of another released node is only
    /// released once that payload is dropped, which happens on the next
    /// mutation or compile, so it reports `true` until then.
    pub fn contains(&self, node: &Node) -> bool {
        self.graph.contains(node) && !self.releases.lock().contains(&node.id)
    }

    /// Registered nodes of one category, in registration order.
    pub fn nodes_of_type(&self, node_type: NodeType) -> &[Node] {
        self.by_type
            .get(&node_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of registered nodes, including ones with a pending release.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// The underlying dependency graph as of the last compile.
    pub fn graph(&self) -> &Graph<Node> {
        &self.graph
    }

    // ------------------------------------------------------------------
    // Explicit dependencies
    // ------------------------------------------------------------------

    /// Declare that `to` depends on `from`, in addition to wired edges.
    ///
    /// Returns `false` for self edges, unknown nodes and duplicates.
    pub fn connect(&mut self, from: Node, to: Node) -> bool {
        self.collect_released();
        if from == to || !self.graph.contains(&from) || !self.graph.contains(&to) {
            log::warn!(
                "{}: rejected explicit edge {} -> {}",
                self.config.label,
                from,
                to
            );
            return false;
        }
        if self.explicit_edges.contains(&(from, to)) {
            return false;
        }
        self.explicit_edges.push((from, to));
        self.graph.connect(from, to);
        self.mark_dirty();
        true
    }

    /// Remove an explicit edge. Wired edges are rebuilt on every compile and
    /// cannot be removed this way.
    pub fn disconnect(&mut self, from: Node, to: Node) -> bool {
        self.collect_released();
        let Some(position) = self.explicit_edges.iter().position(|e| *e == (from, to)) else {
            return false;
        };
        self.explicit_edges.remove(position);
        self.graph.disconnect(&from, &to);
        self.mark_dirty();
        true
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    pub fn state(&self) -> CompileState {
        if self.has_pending_releases() {
            CompileState::Dirty
        } else {
            self.state
        }
    }

    /// True when compiled results are stale.
    pub fn is_dirty(&self) -> bool {
        self.state() != CompileState::Compiled
    }

    /// The first registered presentation master.
    pub fn presentation_master(&self) -> Option<Node> {
        self.nodes_of_type(NodeType::PresentationMaster)
            .iter()
            .copied()
            .find(|node| self.contains(node))
    }

    /// Compile the graph.
    ///
    /// Rewires all edges, sorts, and prunes everything the presentation
    /// master does not depend on. Does nothing if the graph is clean.
    ///
    /// Nodes only kept alive by handle cycles between payloads are released
    /// first.
    pub fn compile(&mut self) -> Result<(), FrameGraphError> {
        self.collect_released();
        if self.state == CompileState::Compiled {
            log::trace!("{}: graph is clean, skipping compile", self.config.label);
            return Ok(());
        }

        self.state = CompileState::Compiling;
        self.collect_orphaned();
        match self.compile_inner() {
            Ok(()) => {
                self.state = CompileState::Compiled;
                Ok(())
            }
            Err(err) => {
                self.state = CompileState::Dirty;
                self.sorted.clear();
                self.sorted_by_type.clear();
                log::error!("{}: compile failed: {}", self.config.label, err);
                Err(err)
            }
        }
    }

    fn compile_inner(&mut self) -> Result<(), FrameGraphError> {
        let wired_edges = self.verify_all_connections()?;

        let reversed = self.graph.reverse();
        let order = self
            .graph
            .sort()
            .map_err(|cycle| FrameGraphError::CycleDetected { nodes: cycle.nodes })?;

        let masters = self.nodes_of_type(NodeType::PresentationMaster);
        let master = *masters
            .first()
            .ok_or(FrameGraphError::NoPresentationMaster)?;
        if masters.len() > 1 {
            log::warn!(
                "{}: {} presentation masters registered, anchoring on {}",
                self.config.label,
                masters.len(),
                master
            );
        }

        let mut connected = reversed.connected(&master);
        connected.insert(master);

        let (sorted, pruned): (Vec<Node>, Vec<Node>) =
            order.into_iter().partition(|node| connected.contains(node));
        if self.config.log_pruned_nodes {
            for node in &pruned {
                log::debug!("{}: pruned unreachable {}", self.config.label, node);
            }
        }

        let mut sorted_by_type: HashMap<NodeType, Vec<Node>> = HashMap::new();
        for node in &sorted {
            sorted_by_type.entry(node.node_type).or_default().push(*node);
        }

        self.stats = CompileStats {
            compilations: self.stats.compilations + 1,
            nodes: self.graph.len(),
            edges: self.graph.edge_count(),
            wired_edges,
            sorted: sorted.len(),
            pruned: pruned.len(),
        };
        log::debug!(
            "{}: compiled {} of {} nodes ({} edges, {} pruned)",
            self.config.label,
            self.stats.sorted,
            self.stats.nodes,
            self.stats.edges,
            self.stats.pruned
        );

        self.sorted = sorted;
        self.sorted_by_type = sorted_by_type;
        Ok(())
    }

    /// Rebuild every edge: explicit edges first, then the wiring rules.
    ///
    /// Returns the number of wired edges added.
    fn verify_all_connections(&mut self) -> Result<usize, FrameGraphError> {
        let wired = self.wiring.wire(&self.arena, self.graph.nodes())?;

        self.graph.clear_edges();
        for (from, to) in &self.explicit_edges {
            self.graph.connect(*from, *to);
        }
        let added = wired
            .into_iter()
            .filter(|(from, to)| self.graph.connect(*from, *to))
            .count();
        Ok(added)
    }

    /// Compiled order, restricted to nodes the presentation master needs.
    pub fn sorted(&self) -> Result<&[Node], FrameGraphError> {
        if self.is_dirty() {
            return Err(FrameGraphError::NotCompiled);
        }
        Ok(&self.sorted)
    }

    /// Compiled order of one category.
    pub fn sorted_of_type(&self, node_type: NodeType) -> Result<&[Node], FrameGraphError> {
        if self.is_dirty() {
            return Err(FrameGraphError::NotCompiled);
        }
        Ok(self
            .sorted_by_type
            .get(&node_type)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    pub fn stats(&self) -> CompileStats {
        self.stats
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Linearize the compiled passes into one top-level command buffer.
    ///
    /// Each render pass becomes `BeginRenderPass`, its own command buffer (if
    /// any) as nested commands, then `EndRenderPass`. Compute passes only
    /// contribute their nested commands.
    pub fn record_commands(&self) -> Result<Vec<CommandBuffer>, FrameGraphError> {
        let order = self.sorted()?;
        let mut frame = CommandBuffer::with_label(format!("{} frame", self.config.label));

        for node in order {
            match node.node_type {
                NodeType::RenderPass => {
                    let pass: &RenderPass = self.payload(node.id)?;
                    frame.push(Command::BeginRenderPass {
                        pass: node.id,
                        label: pass.label.clone(),
                        attachments: pass.attachments.clone(),
                        clear_color: pass.clear_color,
                    });
                    if let Some(commands) = &pass.commands {
                        frame.execute(commands);
                    }
                    frame.push(Command::EndRenderPass);
                }
                NodeType::ComputePass => {
                    let pass: &ComputePass = self.payload(node.id)?;
                    if let Some(commands) = &pass.commands {
                        frame.execute(commands);
                    }
                }
                _ => {}
            }
        }

        log::trace!(
            "{}: recorded {} top-level command(s)",
            self.config.label,
            frame.len()
        );
        Ok(vec![frame])
    }

    /// Passes with a recorder, in compiled order.
    pub fn pass_recorders(&self) -> Result<Vec<PassRecorder>, FrameGraphError> {
        let mut recorders = Vec::new();
        for node in self.sorted()? {
            let (label, recorder) = match self.arena.get(node.id) {
                Some(Resource::RenderPass(pass)) => (&pass.label, &pass.recorder),
                Some(Resource::ComputePass(pass)) => (&pass.label, &pass.recorder),
                _ => continue,
            };
            if let Some(recorder) = recorder {
                recorders.push(PassRecorder {
                    pass: *node,
                    label: label.clone(),
                    recorder: Arc::clone(recorder),
                });
            }
        }
        Ok(recorders)
    }

    /// Store freshly recorded commands on a pass.
    ///
    /// Returns `true` if the graph changed. Re-recording identical commands
    /// into an existing command buffer keeps the graph clean.
    pub fn install_recorded(
        &mut self,
        pass: Node,
        recorded: CommandBuffer,
    ) -> Result<bool, FrameGraphError> {
        self.collect_released();

        let existing = match self.arena.get(pass.id) {
            Some(Resource::RenderPass(p)) => p.commands.clone(),
            Some(Resource::ComputePass(p)) => p.commands.clone(),
            Some(other) => {
                return Err(FrameGraphError::NotAPass(Node::new(
                    pass.id,
                    other.node_type(),
                )))
            }
            None => return Err(FrameGraphError::UnknownNode(pass.id)),
        };

        if let Some(handle) = existing {
            let current = self
                .arena
                .get_mut(handle.id())
                .and_then(CommandBuffer::from_resource_mut)
                .ok_or(FrameGraphError::UnknownNode(handle.id()))?;
            if *current == recorded {
                return Ok(false);
            }
            *current = recorded;
            self.mark_dirty();
            return Ok(true);
        }

        let handle = self.register(recorded);
        match self.arena.get_mut(pass.id) {
            Some(Resource::RenderPass(p)) => p.commands = Some(handle),
            Some(Resource::ComputePass(p)) => p.commands = Some(handle),
            _ => return Err(FrameGraphError::UnknownNode(pass.id)),
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn payload<T: Trackable>(&self, id: NodeId) -> Result<&T, FrameGraphError> {
        self.arena
            .get(id)
            .and_then(T::from_resource)
            .ok_or(FrameGraphError::UnknownNode(id))
    }

    fn mark_dirty(&mut self) {
        self.state = CompileState::Dirty;
    }

    fn has_pending_releases(&self) -> bool {
        !self.releases.lock().is_empty()
    }

    /// Remove every node whose last handle was dropped.
    fn collect_released(&mut self) {
        loop {
            let released = std::mem::take(&mut *self.releases.lock());
            if released.is_empty() {
                break;
            }
            for id in released {
                self.remove_node(id);
            }
        }
    }

    /// Release nodes that no handle outside the graph can reach.
    ///
    /// Handles stored in payloads may form cycles (a command buffer executing
    /// one that executes it back), which the release queue never sees. A node
    /// is held from outside when it has more live handles than payloads store;
    /// everything not reachable from such a node through stored handles is
    /// removed.
    fn collect_orphaned(&mut self) {
        let mut stored: HashMap<NodeId, usize> = HashMap::new();
        let mut held: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in self.graph.nodes() {
            let Some(resource) = self.arena.get(node.id) else {
                continue;
            };
            let handles = resource.held_handles();
            for id in &handles {
                *stored.entry(*id).or_default() += 1;
            }
            held.insert(node.id, handles);
        }

        let mut live: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = self
            .graph
            .nodes()
            .iter()
            .map(|node| node.id)
            .filter(|id| {
                let shares = self.memberships.get(id).map_or(0, Tracker::share_count);
                shares > stored.get(id).copied().unwrap_or(0)
            })
            .collect();
        while let Some(id) = queue.pop_front() {
            if !live.insert(id) {
                continue;
            }
            if let Some(handles) = held.get(&id) {
                queue.extend(handles.iter().filter(|h| !live.contains(*h)));
            }
        }

        let orphaned: Vec<NodeId> = self
            .graph
            .nodes()
            .iter()
            .map(|node| node.id)
            .filter(|id| !live.contains(id))
            .collect();
        for id in orphaned {
            log::debug!(
                "{}: releasing {} held only by a handle cycle",
                self.config.label,
                id
            );
            self.remove_node(id);
        }
        self.collect_released();
    }

    fn remove_node(&mut self, id: NodeId) {
        self.memberships.remove(&id);
        let Some(resource) = self.arena.remove(id) else {
            return;
        };
        let node = Node::new(id, resource.node_type());

        self.graph.remove_node(&node);
        if let Some(nodes) = self.by_type.get_mut(&node.node_type) {
            nodes.retain(|n| *n != node);
        }
        self.explicit_edges
            .retain(|(from, to)| *from != node && *to != node);
        self.mark_dirty();
        log::trace!("{}: released {}", self.config.label, node);

        // Dropping the payload may release the handles it held.
        drop(resource);
    }
}

impl Default for FrameGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameGraph")
            .field("label", &self.config.label)
            .field("nodes", &self.graph.len())
            .field("edges", &self.graph.edge_count())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests;

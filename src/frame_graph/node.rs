//! Node identity and the closed set of node categories.

use std::fmt;

/// Category of a graph-tracked object.
///
/// The set is closed: wiring rules are written against these categories,
/// so compilation behavior never depends on user-provided dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
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
}

impl NodeType {
    /// Number of categories.
    pub const COUNT: usize = 18;

    /// Every category, in declaration order.
    pub const ALL: [NodeType; Self::COUNT] = [
        NodeType::Buffer,
        NodeType::BufferView,
        NodeType::VertexBuffer,
        NodeType::IndexBuffer,
        NodeType::UniformBuffer,
        NodeType::Image,
        NodeType::ImageView,
        NodeType::Texture,
        NodeType::Sampler,
        NodeType::DescriptorSetLayout,
        NodeType::DescriptorPool,
        NodeType::DescriptorSet,
        NodeType::Pipeline,
        NodeType::CommandBuffer,
        NodeType::Attachment,
        NodeType::RenderPass,
        NodeType::ComputePass,
        NodeType::PresentationMaster,
    ];

    /// Position of this category in [`NodeType::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether nodes of this category carry recorded GPU work.
    pub fn is_pass(self) -> bool {
        matches!(self, NodeType::RenderPass | NodeType::ComputePass)
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Buffer => "Buffer",
            NodeType::BufferView => "BufferView",
            NodeType::VertexBuffer => "VertexBuffer",
            NodeType::IndexBuffer => "IndexBuffer",
            NodeType::UniformBuffer => "UniformBuffer",
            NodeType::Image => "Image",
            NodeType::ImageView => "ImageView",
            NodeType::Texture => "Texture",
            NodeType::Sampler => "Sampler",
            NodeType::DescriptorSetLayout => "DescriptorSetLayout",
            NodeType::DescriptorPool => "DescriptorPool",
            NodeType::DescriptorSet => "DescriptorSet",
            NodeType::Pipeline => "Pipeline",
            NodeType::CommandBuffer => "CommandBuffer",
            NodeType::Attachment => "Attachment",
            NodeType::RenderPass => "RenderPass",
            NodeType::ComputePass => "ComputePass",
            NodeType::PresentationMaster => "PresentationMaster",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable identity of a tracked object.
///
/// Layout: `u32 index` + `u32 generation`. A slot index is recycled once its
/// object is released; the generation is bumped on release so stale ids never
/// alias a newer object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of this node.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this node was allocated.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A graph vertex: the identity of a tracked object plus its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
}

impl Node {
    pub fn new(id: NodeId, node_type: NodeType) -> Self {
        Self { id, node_type }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.node_type, self.id)
    }
}

/// Allocates and recycles node ids.
///
/// Released slots go on a LIFO free list and come back with a bumped
/// generation.
#[derive(Debug, Default)]
pub(crate) struct NodeAllocator {
    /// Current generation for each slot. Index = node index.
    generations: Vec<u32>,
    /// Alive flag per slot.
    alive: Vec<bool>,
    /// Free list of recyclable indices.
    free_list: Vec<u32>,
    count: usize,
}

impl NodeAllocator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            count: 0,
        }
    }

    pub fn allocate(&mut self) -> NodeId {
        self.count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.alive[idx] = true;
            NodeId::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            NodeId::new(index, 0)
        }
    }

    /// Releases a node id. Returns false if it is already dead or stale.
    pub fn deallocate(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let idx = id.index() as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(id.index());
        self.count -= 1;
        true
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        let idx = id.index() as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == id.generation()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

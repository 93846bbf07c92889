//! Buffers, buffer views and the typed buffer bindings built on them.

use bitflags::bitflags;

use crate::frame_graph::Handle;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const COPY_SRC = 1 << 0;
        const COPY_DST = 1 << 1;
        const INDEX = 1 << 2;
        const VERTEX = 1 << 3;
        const UNIFORM = 1 << 4;
        const STORAGE = 1 << 5;
        const INDIRECT = 1 << 6;
    }
}

/// Buffer descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    pub size: u64,
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A block of GPU memory. Leaf of every buffer dependency chain.
#[derive(Debug, Clone)]
pub struct Buffer {
    descriptor: BufferDescriptor,
}

impl Buffer {
    pub fn new(descriptor: BufferDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    pub fn usage(&self) -> BufferUsage {
        self.descriptor.usage
    }

    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

/// A byte range of a [`Buffer`]. Depends on the buffer.
#[derive(Debug, Clone)]
pub struct BufferView {
    pub buffer: Handle<Buffer>,
    pub offset: u64,
    /// `None` covers the rest of the buffer.
    pub size: Option<u64>,
}

impl BufferView {
    /// A view over the whole buffer.
    pub fn whole(buffer: Handle<Buffer>) -> Self {
        Self {
            buffer,
            offset: 0,
            size: None,
        }
    }

    pub fn range(buffer: Handle<Buffer>, offset: u64, size: u64) -> Self {
        Self {
            buffer,
            offset,
            size: Some(size),
        }
    }
}

/// Vertex data bound through a [`BufferView`]. Depends on the view.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    pub view: Handle<BufferView>,
    /// Distance in bytes between consecutive vertices.
    pub stride: u32,
}

impl VertexBuffer {
    pub fn new(view: Handle<BufferView>, stride: u32) -> Self {
        Self { view, stride }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    pub fn size(&self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// Index data bound through a [`BufferView`]. Depends on the view.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    pub view: Handle<BufferView>,
    pub format: IndexFormat,
}

impl IndexBuffer {
    pub fn new(view: Handle<BufferView>, format: IndexFormat) -> Self {
        Self { view, format }
    }
}

/// Uniform data bound through a [`BufferView`]. Depends on the view.
#[derive(Debug, Clone)]
pub struct UniformBuffer {
    pub view: Handle<BufferView>,
}

impl UniformBuffer {
    pub fn new(view: Handle<BufferView>) -> Self {
        Self { view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_flags_combine() {
        let usage = BufferUsage::VERTEX | BufferUsage::COPY_DST;
        assert!(usage.contains(BufferUsage::VERTEX));
        assert!(usage.contains(BufferUsage::COPY_DST));
        assert!(!usage.contains(BufferUsage::INDEX));
    }

    #[test]
    fn buffer_accessors() {
        let buffer = Buffer::new(
            BufferDescriptor::new(2048, BufferUsage::UNIFORM).with_label("camera"),
        );
        assert_eq!(buffer.size(), 2048);
        assert_eq!(buffer.label(), Some("camera"));
        assert!(buffer.usage().contains(BufferUsage::UNIFORM));
    }

    #[test]
    fn index_format_size() {
        assert_eq!(IndexFormat::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint32.size(), 4);
    }
}

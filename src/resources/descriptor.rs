//! Descriptor set layouts, pools and sets.

use crate::frame_graph::{Handle, Node};

use super::{Buffer, Sampler, Texture, UniformBuffer};

/// Binding type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    UniformBuffer,
    StorageBuffer,
    SampledImage,
    StorageImage,
    CombinedImageSampler,
    Sampler,
}

/// One binding slot declared by a [`DescriptorSetLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
}

/// Shape of a descriptor set.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSetLayout {
    pub label: Option<String>,
    pub bindings: Vec<LayoutBinding>,
}

impl DescriptorSetLayout {
    pub fn new(bindings: Vec<LayoutBinding>) -> Self {
        Self {
            label: None,
            bindings,
        }
    }

    pub fn binding(&self, binding: u32) -> Option<&LayoutBinding> {
        self.bindings.iter().find(|b| b.binding == binding)
    }
}

/// Pool descriptor sets are allocated from.
#[derive(Debug, Clone)]
pub struct DescriptorPool {
    pub label: Option<String>,
    pub max_sets: u32,
}

impl DescriptorPool {
    pub fn new(max_sets: u32) -> Self {
        Self {
            label: None,
            max_sets,
        }
    }
}

/// Object bound to a descriptor slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorResource {
    Buffer(Handle<Buffer>),
    UniformBuffer(Handle<UniformBuffer>),
    Texture(Handle<Texture>),
    Sampler(Handle<Sampler>),
}

impl DescriptorResource {
    pub fn node(&self) -> Node {
        match self {
            DescriptorResource::Buffer(h) => h.node(),
            DescriptorResource::UniformBuffer(h) => h.node(),
            DescriptorResource::Texture(h) => h.node(),
            DescriptorResource::Sampler(h) => h.node(),
        }
    }

    /// Whether this object can back a slot of the given type.
    pub fn matches(&self, descriptor_type: DescriptorType) -> bool {
        match self {
            DescriptorResource::UniformBuffer(_) => {
                descriptor_type == DescriptorType::UniformBuffer
            }
            DescriptorResource::Buffer(_) => matches!(
                descriptor_type,
                DescriptorType::UniformBuffer | DescriptorType::StorageBuffer
            ),
            DescriptorResource::Texture(_) => matches!(
                descriptor_type,
                DescriptorType::SampledImage
                    | DescriptorType::StorageImage
                    | DescriptorType::CombinedImageSampler
            ),
            DescriptorResource::Sampler(_) => descriptor_type == DescriptorType::Sampler,
        }
    }
}

/// One populated slot of a [`DescriptorSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub resource: Option<DescriptorResource>,
}

impl Descriptor {
    pub fn new(binding: u32, descriptor_type: DescriptorType, resource: DescriptorResource) -> Self {
        Self {
            binding,
            descriptor_type,
            resource: Some(resource),
        }
    }

    /// A declared slot with nothing bound yet.
    pub fn empty(binding: u32, descriptor_type: DescriptorType) -> Self {
        Self {
            binding,
            descriptor_type,
            resource: None,
        }
    }
}

/// A set of resource bindings. Depends on every bound object.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    pub label: Option<String>,
    pub layout: Option<Handle<DescriptorSetLayout>>,
    pub pool: Option<Handle<DescriptorPool>>,
    pub descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: Handle<DescriptorSetLayout>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_pool(mut self, pool: Handle<DescriptorPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_binding_lookup() {
        let layout = DescriptorSetLayout::new(vec![
            LayoutBinding {
                binding: 0,
                descriptor_type: DescriptorType::UniformBuffer,
            },
            LayoutBinding {
                binding: 2,
                descriptor_type: DescriptorType::CombinedImageSampler,
            },
        ]);
        assert_eq!(
            layout.binding(2).map(|b| b.descriptor_type),
            Some(DescriptorType::CombinedImageSampler)
        );
        assert!(layout.binding(1).is_none());
    }

    #[test]
    fn empty_descriptor_has_no_resource() {
        let descriptor = Descriptor::empty(3, DescriptorType::StorageBuffer);
        assert!(descriptor.resource.is_none());
        assert_eq!(descriptor.binding, 3);
    }
}

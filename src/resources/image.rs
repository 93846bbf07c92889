//! Images, views, textures, samplers and render pass attachments.

use bitflags::bitflags;
use glam::{UVec2, Vec4};

use crate::frame_graph::Handle;

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    Depth32Float,
    Depth24PlusStencil8,
    R32Float,
    Rg32Float,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        const COPY_SRC = 1 << 0;
        const COPY_DST = 1 << 1;
        const TEXTURE_BINDING = 1 << 2;
        const STORAGE_BINDING = 1 << 3;
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

/// Image descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    pub label: Option<String>,
    pub extent: UVec2,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl ImageDescriptor {
    pub fn new(extent: UVec2, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            extent,
            format,
            usage,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// GPU image storage.
#[derive(Debug, Clone)]
pub struct Image {
    descriptor: ImageDescriptor,
}

impl Image {
    pub fn new(descriptor: ImageDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    pub fn extent(&self) -> UVec2 {
        self.descriptor.extent
    }

    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

/// A view of an [`Image`]. Depends on the image.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub image: Handle<Image>,
}

impl ImageView {
    pub fn new(image: Handle<Image>) -> Self {
        Self { image }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SamplerDescriptor {
    pub label: Option<String>,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub address_mode: AddressMode,
}

/// Sampling state, shareable between textures.
#[derive(Debug, Clone)]
pub struct Sampler {
    descriptor: SamplerDescriptor,
}

impl Sampler {
    pub fn new(descriptor: SamplerDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }

    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

/// A sampled image: an [`ImageView`] plus an optional [`Sampler`].
#[derive(Debug, Clone)]
pub struct Texture {
    pub view: Handle<ImageView>,
    pub sampler: Option<Handle<Sampler>>,
}

impl Texture {
    pub fn new(view: Handle<ImageView>) -> Self {
        Self {
            view,
            sampler: None,
        }
    }

    pub fn with_sampler(mut self, sampler: Handle<Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp {
    Clear(Vec4),
    Load,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    DontCare,
}

/// Storage a render pass attachment writes into.
///
/// Wired as `Attachment -> Image -> ImageView`: the image must exist before
/// either the attachment logic or the view is valid.
#[derive(Debug, Clone)]
pub struct AttachmentTarget {
    pub image: Handle<Image>,
    pub view: Handle<ImageView>,
}

/// An output slot of a render pass.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub label: Option<String>,
    pub format: TextureFormat,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    /// `None` for attachments backed by the swapchain.
    pub target: Option<AttachmentTarget>,
}

impl Attachment {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            label: None,
            format,
            load_op: LoadOp::Clear(Vec4::ZERO),
            store_op: StoreOp::Store,
            target: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_target(mut self, image: Handle<Image>, view: Handle<ImageView>) -> Self {
        self.target = Some(AttachmentTarget { image, view });
        self
    }

    pub fn with_load_op(mut self, load_op: LoadOp) -> Self {
        self.load_op = load_op;
        self
    }

    pub fn is_depth(&self) -> bool {
        self.format.is_depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_formats() {
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(!TextureFormat::Rgba8Unorm.is_depth());
        assert!(Attachment::new(TextureFormat::Depth24PlusStencil8).is_depth());
    }

    #[test]
    fn usage_flags_combine() {
        let desc = ImageDescriptor::new(
            UVec2::new(4, 2),
            TextureFormat::Rgba16Float,
            TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        );
        assert!(desc.usage.contains(TextureUsage::TEXTURE_BINDING));
        assert!(!desc.usage.contains(TextureUsage::STORAGE_BINDING));
        assert_eq!(desc.usage.bits(), 0b10100);
    }

    #[test]
    fn attachment_defaults_to_clear_and_store() {
        let attachment = Attachment::new(TextureFormat::Bgra8UnormSrgb).with_label("swapchain");
        assert_eq!(attachment.load_op, LoadOp::Clear(Vec4::ZERO));
        assert_eq!(attachment.store_op, StoreOp::Store);
        assert!(attachment.target.is_none());
        assert_eq!(attachment.label.as_deref(), Some("swapchain"));
    }
}

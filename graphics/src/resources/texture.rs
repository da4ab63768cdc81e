//! GPU texture resource.

use crate::backend::{Backend, BackendError, RawResource};
use crate::types::{Extent3d, ResourceKind, TextureDescriptor, TextureFormat};

use super::{PhysicalId, PhysicalResource};

/// A GPU texture resource.
///
/// Transient textures are created by the pools on a realize miss and handed
/// to pass callbacks through [`PassContext::texture`](crate::graph::PassContext::texture).
///
/// # Example
///
/// ```ignore
/// let hdr = ctx.texture(hdr_handle)?;
/// log::trace!("tonemapping {}x{} ({})", hdr.width(), hdr.height(), hdr.id());
/// ```
pub struct Texture {
    id: PhysicalId,
    raw: RawResource,
    descriptor: TextureDescriptor,
}

impl Texture {
    /// Wrap a natively created texture, such as a swap-chain image.
    ///
    /// The graph never destroys wrapped textures; import them with
    /// [`RenderGraph::import_texture`](crate::graph::RenderGraph::import_texture).
    pub fn from_raw(raw: RawResource, descriptor: TextureDescriptor) -> Self {
        Self {
            id: PhysicalId::next(),
            raw,
            descriptor,
        }
    }

    /// Identity of this texture.
    pub fn id(&self) -> PhysicalId {
        self.id
    }

    /// Backend-native handle.
    pub fn raw(&self) -> RawResource {
        self.raw
    }

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Get the texture size.
    pub fn size(&self) -> Extent3d {
        self.descriptor.size
    }

    /// Get the texture width.
    pub fn width(&self) -> u32 {
        self.descriptor.size.width
    }

    /// Get the texture height.
    pub fn height(&self) -> u32 {
        self.descriptor.size.height
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Get the texture label, if set.
    ///
    /// Pooled textures keep the label of the descriptor they were first
    /// created with.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl PhysicalResource for Texture {
    const KIND: ResourceKind = ResourceKind::Texture;
    type Descriptor = TextureDescriptor;

    fn create<B: Backend>(
        backend: &mut B,
        descriptor: &TextureDescriptor,
    ) -> Result<Self, BackendError> {
        let raw = backend.create_texture(descriptor)?;
        Ok(Self::from_raw(raw, descriptor.clone()))
    }

    fn destroy<B: Backend>(self, backend: &mut B) {
        backend.destroy_texture(self.raw);
    }

    fn id(&self) -> PhysicalId {
        self.id
    }

    fn raw(&self) -> RawResource {
        self.raw
    }

    fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("size", &self.descriptor.size)
            .field("format", &self.descriptor.format)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Texture is Send + Sync
static_assertions::assert_impl_all!(Texture: Send, Sync);

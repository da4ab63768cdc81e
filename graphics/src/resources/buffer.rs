//! GPU buffer resource.

use crate::backend::{Backend, BackendError, RawResource};
use crate::types::{BufferDescriptor, BufferUsage, ResourceKind};

use super::{PhysicalId, PhysicalResource};

/// A GPU buffer resource.
pub struct Buffer {
    id: PhysicalId,
    raw: RawResource,
    descriptor: BufferDescriptor,
}

impl Buffer {
    /// Wrap a natively created buffer owned outside the graph.
    pub fn from_raw(raw: RawResource, descriptor: BufferDescriptor) -> Self {
        Self {
            id: PhysicalId::next(),
            raw,
            descriptor,
        }
    }

    /// Identity of this buffer.
    pub fn id(&self) -> PhysicalId {
        self.id
    }

    /// Backend-native handle.
    pub fn raw(&self) -> RawResource {
        self.raw
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    /// Get the buffer usage flags.
    pub fn usage(&self) -> BufferUsage {
        self.descriptor.usage
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl PhysicalResource for Buffer {
    const KIND: ResourceKind = ResourceKind::Buffer;
    type Descriptor = BufferDescriptor;

    fn create<B: Backend>(backend: &mut B, descriptor: &BufferDescriptor) -> Result<Self, BackendError> {
        let raw = backend.create_buffer(descriptor)?;
        Ok(Self::from_raw(raw, descriptor.clone()))
    }

    fn destroy<B: Backend>(self, backend: &mut B) {
        backend.destroy_buffer(self.raw);
    }

    fn id(&self) -> PhysicalId {
        self.id
    }

    fn raw(&self) -> RawResource {
        self.raw
    }

    fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("size", &self.descriptor.size)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);

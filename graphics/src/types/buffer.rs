//! Buffer types and descriptors.

use bitflags::bitflags;
use rdg_core::hash::HashCombiner;

use super::DescriptorHash;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Buffer can be used as a storage buffer.
        const STORAGE = 1 << 3;
        /// Buffer can be used as an indirect buffer.
        const INDIRECT = 1 << 4;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 5;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 6;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for a buffer.
///
/// `stride` is the element size for structured buffers, or 0 for raw byte
/// buffers. The label is cosmetic and never affects pooling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Element stride in bytes (0 for raw buffers).
    pub stride: u32,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new raw buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            stride: 0,
            usage,
        }
    }

    /// Create a structured buffer descriptor holding `count` elements of `stride` bytes.
    pub fn structured(count: u32, stride: u32, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size: count as u64 * stride as u64,
            stride,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Number of elements for structured buffers, `None` for raw buffers.
    pub fn element_count(&self) -> Option<u64> {
        (self.stride > 0).then(|| self.size / self.stride as u64)
    }
}

impl DescriptorHash for BufferDescriptor {
    fn descriptor_hash(&self) -> u64 {
        HashCombiner::new()
            .add(self.size)
            .add(self.stride as u64)
            .add(self.usage.bits() as u64)
            .finish()
    }

    fn is_compatible(&self, other: &Self) -> bool {
        self.size == other.size && self.stride == other.stride && self.usage == other.usage
    }

    fn estimated_size_bytes(&self) -> u64 {
        self.size
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_size() {
        let desc = BufferDescriptor::structured(1024, 16, BufferUsage::STORAGE);
        assert_eq!(desc.size, 16 * 1024);
        assert_eq!(desc.element_count(), Some(1024));
        assert_eq!(BufferDescriptor::new(64, BufferUsage::UNIFORM).element_count(), None);
    }

    #[test]
    fn test_hash_ignores_label() {
        let a = BufferDescriptor::new(4096, BufferUsage::STORAGE).with_label("light_list");
        let b = BufferDescriptor::new(4096, BufferUsage::STORAGE).with_label("cluster_grid");
        assert_eq!(a.descriptor_hash(), b.descriptor_hash());
        assert!(a.is_compatible(&b));
    }

    #[test]
    fn test_hash_distinguishes_fields() {
        let base = BufferDescriptor::new(4096, BufferUsage::STORAGE);
        let bigger = BufferDescriptor::new(8192, BufferUsage::STORAGE);
        let strided = BufferDescriptor::structured(256, 16, BufferUsage::STORAGE);
        let uniform = BufferDescriptor::new(4096, BufferUsage::UNIFORM);

        for other in [&bigger, &strided, &uniform] {
            assert_ne!(base.descriptor_hash(), other.descriptor_hash());
            assert!(!base.is_compatible(other));
        }
    }
}

//! Structural descriptor hashing shared by every resource kind.

use super::{BufferDescriptor, TextureDescriptor};

/// The kind of a graph resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A texture resource.
    Texture,
    /// A buffer resource.
    Buffer,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Texture => write!(f, "texture"),
            Self::Buffer => write!(f, "buffer"),
        }
    }
}

/// Pooling key and compatibility check for a resource descriptor.
///
/// `descriptor_hash` folds every field that affects physical compatibility, in
/// a fixed order, through [`HashCombiner`](rdg_core::hash::HashCombiner).
/// Cosmetic fields such as the label are excluded. Because the combination can
/// collide, pools confirm hash matches with [`is_compatible`](Self::is_compatible).
pub trait DescriptorHash {
    /// Deterministic structural hash used as the pool key.
    fn descriptor_hash(&self) -> u64;

    /// Whether a resource created from `other` can stand in for one created from `self`.
    fn is_compatible(&self, other: &Self) -> bool;

    /// Approximate GPU memory footprint in bytes.
    fn estimated_size_bytes(&self) -> u64;

    /// Debug label, if any.
    fn label(&self) -> Option<&str>;
}

/// A texture or buffer descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceDescriptor {
    /// Texture descriptor.
    Texture(TextureDescriptor),
    /// Buffer descriptor.
    Buffer(BufferDescriptor),
}

impl ResourceDescriptor {
    /// The kind of resource this descriptor creates.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Texture(_) => ResourceKind::Texture,
            Self::Buffer(_) => ResourceKind::Buffer,
        }
    }

    /// Debug label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Texture(desc) => desc.label(),
            Self::Buffer(desc) => desc.label(),
        }
    }

    /// Structural hash of the wrapped descriptor.
    pub fn descriptor_hash(&self) -> u64 {
        match self {
            Self::Texture(desc) => desc.descriptor_hash(),
            Self::Buffer(desc) => desc.descriptor_hash(),
        }
    }

    /// Approximate GPU memory footprint in bytes.
    pub fn estimated_size_bytes(&self) -> u64 {
        match self {
            Self::Texture(desc) => desc.estimated_size_bytes(),
            Self::Buffer(desc) => desc.estimated_size_bytes(),
        }
    }
}

impl From<TextureDescriptor> for ResourceDescriptor {
    fn from(desc: TextureDescriptor) -> Self {
        Self::Texture(desc)
    }
}

impl From<BufferDescriptor> for ResourceDescriptor {
    fn from(desc: BufferDescriptor) -> Self {
        Self::Buffer(desc)
    }
}

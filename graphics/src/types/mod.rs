//! Common types and descriptors for graph resources.
//!
//! This module contains format enums, usage flags, and the descriptor structs
//! whose structural hash keys the transient resource pools.

mod buffer;
mod common;
mod descriptor;
mod texture;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use common::Extent3d;
pub use descriptor::{DescriptorHash, ResourceDescriptor, ResourceKind};
pub use texture::{TextureDescriptor, TextureDimension, TextureFormat, TextureUsage};

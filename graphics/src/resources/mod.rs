//! Physical GPU resources.
//!
//! This module contains the resource types that back logical graph handles:
//! - [`Texture`] - GPU texture/image
//! - [`Buffer`] - GPU memory buffer
//!
//! A transient physical resource is owned by exactly one place at a time:
//! either a free-list entry in a [`ResourcePool`](crate::pool::ResourcePool) or
//! the registry slot it is checked out to. Neither type is `Clone`, so that
//! rule is enforced by ownership. Externally owned resources (swap-chain images)
//! are wrapped with `from_raw` and shared with the graph through [`Arc`].
//!
//! Every resource carries a process-unique [`PhysicalId`], which makes pool
//! reuse observable: two handles resolved to the same id share one native object.
//!
//! [`Arc`]: std::sync::Arc

mod buffer;
mod texture;

pub use buffer::Buffer;
pub use texture::Texture;

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::{Backend, BackendError, RawResource};
use crate::types::{DescriptorHash, ResourceKind};

static NEXT_PHYSICAL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a physical resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysicalId(u64);

impl PhysicalId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PHYSICAL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PhysicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capabilities the generic resource pool needs from a resource kind.
pub trait PhysicalResource: Debug + Send + Sync + Sized + 'static {
    /// The graph resource kind this type backs.
    const KIND: ResourceKind;

    /// Descriptor the resource is created from.
    type Descriptor: DescriptorHash + Clone + Debug + Send + Sync;

    /// Allocate a new resource through the backend.
    fn create<B: Backend>(backend: &mut B, descriptor: &Self::Descriptor)
    -> Result<Self, BackendError>;

    /// Free the native object.
    fn destroy<B: Backend>(self, backend: &mut B);

    /// Identity of this resource.
    fn id(&self) -> PhysicalId;

    /// Backend-native handle.
    fn raw(&self) -> RawResource;

    /// The descriptor the resource was created from.
    fn descriptor(&self) -> &Self::Descriptor;

    /// Whether this resource can satisfy a request for `descriptor`.
    fn is_compatible(&self, descriptor: &Self::Descriptor) -> bool {
        self.descriptor().is_compatible(descriptor)
    }
}

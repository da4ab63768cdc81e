//! Handles into a render graph.

pub use crate::types::ResourceKind;

/// Handle to a pass in the render graph.
///
/// `PassHandle` is `Copy` and cheap to pass around. It is only valid within
/// the `RenderGraph` that created it. Handles are issued in recording order,
/// so comparing two handles compares their execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassHandle(u32);

impl PassHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position of the pass in recording order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque logical resource identifier.
///
/// A handle is a weak reference: it names a registry slot of one frame's
/// graph, never owns the physical resource behind it, and must not be used
/// with another graph or after [`RenderGraph::clear`](super::RenderGraph::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    kind: ResourceKind,
    index: u32,
}

impl ResourceHandle {
    /// The null handle. Never issued by a registry.
    pub const NULL: Self = Self {
        kind: ResourceKind::Texture,
        index: u32::MAX,
    };

    pub(crate) fn new(kind: ResourceKind, index: u32) -> Self {
        debug_assert!(index != u32::MAX, "resource index overflow");
        Self { kind, index }
    }

    /// Whether this is [`ResourceHandle::NULL`].
    pub fn is_null(self) -> bool {
        self.index == u32::MAX
    }

    /// The resource kind.
    pub fn kind(self) -> ResourceKind {
        self.kind
    }

    /// Slot index within the kind's registry array.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl Default for ResourceHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}#{}", self.kind, self.index)
        }
    }
}

/// Lifetime state of a resource slot within one frame.
///
/// Transitions only move forward: `Unrealized → Realized → Released`.
/// Imported resources are always `Realized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// No physical resource bound yet.
    Unrealized,
    /// Bound to a physical resource.
    Realized,
    /// The physical resource went back to the pool. Terminal for this frame.
    Released,
}

//! GPU backend abstraction layer.
//!
//! The render graph decides *which* physical resource a pass gets and *when*
//! it is allocated or recycled. Creating and destroying the native objects is
//! delegated to a [`Backend`]. The graph never records draw or dispatch
//! commands; pass callbacks do that with the resources they are handed.
//!
//! # Available Backends
//!
//! - [`DummyBackend`]: No-op backend for tests and tools. It hands out
//!   sequential native ids and counts every creation and destruction.

pub mod dummy;
mod error;

pub use dummy::DummyBackend;
pub use error::BackendError;

use crate::types::{BufferDescriptor, TextureDescriptor};

/// Opaque backend-native object handle.
///
/// The meaning of the value is private to the backend that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawResource(pub u64);

/// Creation and destruction of native GPU resources.
///
/// Implementations must be `Send` so the transient pools that own them can be
/// shared between frames in flight behind a mutex.
pub trait Backend: Send + 'static {
    /// Human readable backend name.
    fn name(&self) -> &'static str;

    /// Allocate a native texture.
    fn create_texture(&mut self, descriptor: &TextureDescriptor)
    -> Result<RawResource, BackendError>;

    /// Allocate a native buffer.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<RawResource, BackendError>;

    /// Free a native texture previously returned by [`create_texture`](Self::create_texture).
    fn destroy_texture(&mut self, raw: RawResource);

    /// Free a native buffer previously returned by [`create_buffer`](Self::create_buffer).
    fn destroy_buffer(&mut self, raw: RawResource);
}

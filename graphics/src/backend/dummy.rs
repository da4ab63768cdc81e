//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations but provides
//! a valid implementation for exercising the render graph without
//! requiring GPU hardware.

use crate::types::{BufferDescriptor, TextureDescriptor};

use super::{Backend, BackendError, RawResource};

/// Dummy GPU backend.
///
/// Native handles are sequential integers. Counters record every creation and
/// destruction so tests can check that the pools neither leak nor double-free.
#[derive(Debug, Default)]
pub struct DummyBackend {
    next_raw: u64,
    textures_created: u64,
    textures_destroyed: u64,
    buffers_created: u64,
    buffers_destroyed: u64,
    fail_allocations: bool,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent allocation fail with [`BackendError::OutOfMemory`].
    pub fn set_fail_allocations(&mut self, fail: bool) {
        self.fail_allocations = fail;
    }

    /// Total textures created.
    pub fn textures_created(&self) -> u64 {
        self.textures_created
    }

    /// Total textures destroyed.
    pub fn textures_destroyed(&self) -> u64 {
        self.textures_destroyed
    }

    /// Total buffers created.
    pub fn buffers_created(&self) -> u64 {
        self.buffers_created
    }

    /// Total buffers destroyed.
    pub fn buffers_destroyed(&self) -> u64 {
        self.buffers_destroyed
    }

    /// Native objects currently alive (created but not destroyed).
    pub fn live_objects(&self) -> u64 {
        (self.textures_created - self.textures_destroyed)
            + (self.buffers_created - self.buffers_destroyed)
    }

    fn next_raw(&mut self) -> RawResource {
        self.next_raw += 1;
        RawResource(self.next_raw)
    }
}

impl Backend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<RawResource, BackendError> {
        if self.fail_allocations {
            return Err(BackendError::OutOfMemory);
        }
        if descriptor.size.texel_count() == 0 {
            return Err(BackendError::ResourceCreationFailed(format!(
                "texture {:?} has a zero-sized extent",
                descriptor.label
            )));
        }
        let raw = self.next_raw();
        self.textures_created += 1;
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{}x{}) as {:?}",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height,
            descriptor.size.depth,
            raw
        );
        Ok(raw)
    }

    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<RawResource, BackendError> {
        if self.fail_allocations {
            return Err(BackendError::OutOfMemory);
        }
        if descriptor.size == 0 {
            return Err(BackendError::ResourceCreationFailed(format!(
                "buffer {:?} has zero size",
                descriptor.label
            )));
        }
        let raw = self.next_raw();
        self.buffers_created += 1;
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {}) as {:?}",
            descriptor.label,
            descriptor.size,
            raw
        );
        Ok(raw)
    }

    fn destroy_texture(&mut self, raw: RawResource) {
        self.textures_destroyed += 1;
        log::trace!("DummyBackend: destroying texture {:?}", raw);
    }

    fn destroy_buffer(&mut self, raw: RawResource) {
        self.buffers_destroyed += 1;
        log::trace!("DummyBackend: destroying buffer {:?}", raw);
    }
}

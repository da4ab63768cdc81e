//! Per-kind pools plus the backend that fills them.

use std::sync::Arc;

use parking_lot::Mutex;
use rdg_core::profiling::{profile_plot, profile_scope};

use crate::backend::{Backend, BackendError};
use crate::config::FrameGraphConfig;
use crate::error::GraphicsError;
use crate::resources::{Buffer, PhysicalResource, Texture};
use crate::types::{BufferDescriptor, DescriptorHash, TextureDescriptor};

use super::{PoolStats, ResourcePool};

/// Transient pools shared by every frame graph that renders with them.
///
/// The pools persist across frames. When several frames are in flight each
/// [`FrameGraph`](crate::FrameGraph) holds a clone of the same `Arc`, and every
/// realize or release takes the lock only for that single operation.
pub type SharedPools<B> = Arc<Mutex<TransientPools<B>>>;

/// Statistics for both resource kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransientPoolStats {
    /// Texture pool counters.
    pub textures: PoolStats,
    /// Buffer pool counters.
    pub buffers: PoolStats,
}

/// The backend together with one [`ResourcePool`] per resource kind.
///
/// Acquisition tries the pool first and falls back to a backend allocation.
/// Every acquired resource is counted as checked out until it is released, so
/// [`teardown`](Self::teardown) can refuse to run while a frame still holds
/// resources.
#[derive(Debug)]
pub struct TransientPools<B: Backend> {
    backend: B,
    textures: ResourcePool<Texture>,
    buffers: ResourcePool<Buffer>,
    checked_out: usize,
    checked_out_bytes: u64,
    config: FrameGraphConfig,
}

impl<B: Backend> TransientPools<B> {
    /// Create empty pools around `backend`.
    pub fn new(backend: B, config: &FrameGraphConfig) -> Self {
        log::debug!(
            "Transient pools created on {} (retention: {} frames)",
            backend.name(),
            config.retention_frames
        );
        Self {
            backend,
            textures: ResourcePool::new(config),
            buffers: ResourcePool::new(config),
            checked_out: 0,
            checked_out_bytes: 0,
            config: *config,
        }
    }

    /// Retention, bucket and budget settings the pools were created with.
    pub fn config(&self) -> &FrameGraphConfig {
        &self.config
    }

    /// Wrap the pools for sharing between frame graphs.
    pub fn into_shared(self) -> SharedPools<B> {
        Arc::new(Mutex::new(self))
    }

    /// The backend resources are created with.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The texture pool.
    pub fn textures(&self) -> &ResourcePool<Texture> {
        &self.textures
    }

    /// The buffer pool.
    pub fn buffers(&self) -> &ResourcePool<Buffer> {
        &self.buffers
    }

    /// Take a texture matching `descriptor` from the pool, or create one.
    pub fn acquire_texture(&mut self, descriptor: &TextureDescriptor) -> Result<Texture, BackendError> {
        let texture = acquire_from(&mut self.textures, &mut self.backend, descriptor)?;
        self.check_out(descriptor);
        Ok(texture)
    }

    /// Take a buffer matching `descriptor` from the pool, or create one.
    pub fn acquire_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<Buffer, BackendError> {
        let buffer = acquire_from(&mut self.buffers, &mut self.backend, descriptor)?;
        self.check_out(descriptor);
        Ok(buffer)
    }

    /// Return a texture to its bucket, tagged with `frame`.
    pub fn release_texture(&mut self, texture: Texture, frame: u64) {
        self.check_in(texture.descriptor());
        let hash = texture.descriptor().descriptor_hash();
        self.textures.release(hash, texture, frame);
    }

    /// Return a buffer to its bucket, tagged with `frame`.
    pub fn release_buffer(&mut self, buffer: Buffer, frame: u64) {
        self.check_in(buffer.descriptor());
        let hash = buffer.descriptor().descriptor_hash();
        self.buffers.release(hash, buffer, frame);
    }

    /// Destroy pooled resources that have been idle longer than the retention window.
    ///
    /// Returns the number of destroyed resources.
    pub fn evict_stale(&mut self, current_frame: u64) -> usize {
        profile_scope!("evict_stale");

        let evicted = self.textures.evict_stale(current_frame, &mut self.backend)
            + self.buffers.evict_stale(current_frame, &mut self.backend);
        if evicted > 0 {
            log::debug!("Frame {}: evicted {} stale pooled resources", current_frame, evicted);
        }

        profile_plot!("rdg free textures", self.textures.free_count());
        profile_plot!("rdg free buffers", self.buffers.free_count());
        evicted
    }

    /// Destroy every pooled resource.
    ///
    /// Refused while any resource is checked out, because the registry slot
    /// holding it would otherwise outlive its pool.
    pub fn teardown(&mut self) -> Result<usize, GraphicsError> {
        if self.checked_out > 0 {
            log::error!(
                "Refusing pool teardown: {} transient resources are still checked out",
                self.checked_out
            );
            return Err(GraphicsError::Configuration(format!(
                "pool teardown with {} resources still checked out",
                self.checked_out
            )));
        }
        let destroyed =
            self.textures.teardown(&mut self.backend) + self.buffers.teardown(&mut self.backend);
        log::debug!("Transient pools torn down ({} resources destroyed)", destroyed);
        Ok(destroyed)
    }

    /// Number of transient resources currently checked out to registries.
    pub fn live_transient_count(&self) -> usize {
        self.checked_out
    }

    /// Estimated bytes currently checked out to registries.
    pub fn checked_out_bytes(&self) -> u64 {
        self.checked_out_bytes
    }

    /// Number of free resources across both pools.
    pub fn free_count(&self) -> usize {
        self.textures.free_count() + self.buffers.free_count()
    }

    /// Usage counters of both pools.
    pub fn stats(&self) -> TransientPoolStats {
        TransientPoolStats {
            textures: self.textures.stats(),
            buffers: self.buffers.stats(),
        }
    }

    fn check_out<D: DescriptorHash>(&mut self, descriptor: &D) {
        let bytes = descriptor.estimated_size_bytes();
        self.checked_out += 1;
        self.checked_out_bytes += bytes;
        let budget = self.config.transient_budget_bytes;
        if self.checked_out_bytes > budget {
            log::warn!(
                "Transient budget exceeded by {:?} ({} bytes, {} of {} bytes checked out)",
                descriptor.label(),
                bytes,
                self.checked_out_bytes,
                budget
            );
        }
    }

    fn check_in<D: DescriptorHash>(&mut self, descriptor: &D) {
        self.checked_out = self.checked_out.saturating_sub(1);
        self.checked_out_bytes = self
            .checked_out_bytes
            .saturating_sub(descriptor.estimated_size_bytes());
    }
}

/// Pool hit or fresh allocation.
fn acquire_from<R: PhysicalResource, B: Backend>(
    pool: &mut ResourcePool<R>,
    backend: &mut B,
    descriptor: &R::Descriptor,
) -> Result<R, BackendError> {
    let hash = descriptor.descriptor_hash();
    if let Some(resource) = pool.try_acquire(hash, descriptor) {
        return Ok(resource);
    }
    let resource = R::create(backend, descriptor)?;
    log::trace!(
        "Created {} {} for {:?} (hash {:#x})",
        R::KIND,
        resource.id(),
        descriptor.label(),
        hash
    );
    Ok(resource)
}

static_assertions::assert_impl_all!(TransientPools<crate::backend::DummyBackend>: Send);

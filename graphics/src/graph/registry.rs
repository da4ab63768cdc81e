//! Logical resource table of one frame.

use std::sync::Arc;

use rdg_core::profiling::profile_function;

use crate::backend::{Backend, BackendError};
use crate::error::GraphicsError;
use crate::pool::TransientPools;
use crate::resources::{Buffer, PhysicalId, PhysicalResource, Texture};
use crate::types::{BufferDescriptor, DescriptorHash, ResourceDescriptor, TextureDescriptor};

use super::handle::{ResourceHandle, ResourceKind, ResourceState};

const UNNAMED: &str = "<unnamed>";

#[derive(Debug)]
enum Backing<R> {
    Unrealized,
    Realized(R),
    Released,
    Imported(Arc<R>),
}

#[derive(Debug)]
struct Slot<R: PhysicalResource> {
    descriptor: R::Descriptor,
    hash: u64,
    backing: Backing<R>,
}

impl<R: PhysicalResource> Slot<R> {
    fn name(&self) -> String {
        self.descriptor.label().unwrap_or(UNNAMED).to_string()
    }

    fn state(&self) -> ResourceState {
        match self.backing {
            Backing::Unrealized => ResourceState::Unrealized,
            Backing::Realized(_) | Backing::Imported(_) => ResourceState::Realized,
            Backing::Released => ResourceState::Released,
        }
    }
}

/// Slot array for one resource kind.
#[derive(Debug)]
struct SlotArray<R: PhysicalResource> {
    slots: Vec<Slot<R>>,
}

impl<R: PhysicalResource> SlotArray<R> {
    fn new() -> Self {
        Self { slots: Vec::new() }
    }

    fn push(&mut self, descriptor: R::Descriptor, backing: Backing<R>) -> ResourceHandle {
        let index = self.slots.len() as u32;
        let hash = descriptor.descriptor_hash();
        self.slots.push(Slot {
            descriptor,
            hash,
            backing,
        });
        ResourceHandle::new(R::KIND, index)
    }

    fn slot(&self, handle: ResourceHandle) -> Result<&Slot<R>, GraphicsError> {
        if handle.kind() != R::KIND {
            return Err(GraphicsError::InvalidHandle(handle));
        }
        self.slots
            .get(handle.index())
            .ok_or(GraphicsError::InvalidHandle(handle))
    }

    fn slot_mut(&mut self, handle: ResourceHandle) -> Result<&mut Slot<R>, GraphicsError> {
        if handle.kind() != R::KIND {
            return Err(GraphicsError::InvalidHandle(handle));
        }
        self.slots
            .get_mut(handle.index())
            .ok_or(GraphicsError::InvalidHandle(handle))
    }

    fn realize(
        &mut self,
        handle: ResourceHandle,
        acquire: impl FnOnce(&R::Descriptor) -> Result<R, BackendError>,
    ) -> Result<PhysicalId, GraphicsError> {
        let slot = self.slot_mut(handle)?;
        if let Backing::Unrealized = slot.backing {
            let resource = acquire(&slot.descriptor)?;
            let id = resource.id();
            log::trace!("Realized {} '{}' as {}", handle, slot.name(), id);
            slot.backing = Backing::Realized(resource);
            return Ok(id);
        }
        match &slot.backing {
            Backing::Realized(resource) => Ok(resource.id()),
            Backing::Imported(resource) => Ok(resource.id()),
            _ => Err(GraphicsError::UseAfterRelease {
                handle,
                name: slot.name(),
            }),
        }
    }

    /// Move a realized transient resource out of its slot.
    fn take(&mut self, handle: ResourceHandle) -> Result<Option<R>, GraphicsError> {
        let slot = self.slot_mut(handle)?;
        match std::mem::replace(&mut slot.backing, Backing::Released) {
            Backing::Realized(resource) => Ok(Some(resource)),
            other => {
                slot.backing = other;
                Ok(None)
            }
        }
    }

    fn resource(&self, handle: ResourceHandle) -> Result<&R, GraphicsError> {
        let slot = self.slot(handle)?;
        match &slot.backing {
            Backing::Realized(resource) => Ok(resource),
            Backing::Imported(resource) => Ok(resource.as_ref()),
            Backing::Unrealized => Err(GraphicsError::UnrealizedResource {
                handle,
                name: slot.name(),
            }),
            Backing::Released => Err(GraphicsError::UseAfterRelease {
                handle,
                name: slot.name(),
            }),
        }
    }

    fn realized_handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            matches!(slot.backing, Backing::Realized(_))
                .then(|| ResourceHandle::new(R::KIND, index as u32))
        })
    }

    fn realized_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.backing, Backing::Realized(_)))
            .count()
    }
}

/// Per-frame table mapping logical handles to descriptors and physical backing.
///
/// The registry exclusively owns the handle → descriptor mapping. Physical
/// realization is lazy: [`create_texture`](Self::create_texture) only records
/// the descriptor, [`realize`](Self::realize) binds a pooled or freshly
/// created resource, and [`release_to_pool`](Self::release_to_pool) hands it
/// back. A resource therefore occupies memory only between its first realize
/// and its release.
///
/// # Example
///
/// ```
/// use rdg_graphics::backend::DummyBackend;
/// use rdg_graphics::graph::{ResourceRegistry, ResourceState};
/// use rdg_graphics::pool::TransientPools;
/// use rdg_graphics::{FrameGraphConfig, TextureDescriptor, TextureFormat, TextureUsage};
///
/// let mut pools = TransientPools::new(DummyBackend::new(), &FrameGraphConfig::default());
/// let mut registry = ResourceRegistry::new();
///
/// let handle = registry.create_texture(TextureDescriptor::new_2d(
///     256, 256, TextureFormat::Rgba8Unorm, TextureUsage::RENDER_ATTACHMENT,
/// ));
/// assert_eq!(registry.state(handle).unwrap(), ResourceState::Unrealized);
///
/// let id = registry.realize(handle, &mut pools).unwrap();
/// assert_eq!(registry.realize(handle, &mut pools).unwrap(), id);
///
/// assert!(registry.release_to_pool(handle, &mut pools, 0).unwrap());
/// assert_eq!(registry.state(handle).unwrap(), ResourceState::Released);
/// ```
#[derive(Debug)]
pub struct ResourceRegistry {
    textures: SlotArray<Texture>,
    buffers: SlotArray<Buffer>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            textures: SlotArray::new(),
            buffers: SlotArray::new(),
        }
    }

    /// Register a transient texture. No physical resource is allocated.
    ///
    /// Every call yields a distinct handle, even for identical descriptors.
    pub fn create_texture(&mut self, descriptor: TextureDescriptor) -> ResourceHandle {
        self.textures.push(descriptor, Backing::Unrealized)
    }

    /// Register a transient buffer. No physical resource is allocated.
    pub fn create_buffer(&mut self, descriptor: BufferDescriptor) -> ResourceHandle {
        self.buffers.push(descriptor, Backing::Unrealized)
    }

    /// Register an externally owned texture. It is never returned to a pool.
    pub fn import_texture(&mut self, texture: Arc<Texture>) -> ResourceHandle {
        let descriptor = texture.descriptor().clone();
        self.textures.push(descriptor, Backing::Imported(texture))
    }

    /// Register an externally owned buffer. It is never returned to a pool.
    pub fn import_buffer(&mut self, buffer: Arc<Buffer>) -> ResourceHandle {
        let descriptor = buffer.descriptor().clone();
        self.buffers.push(descriptor, Backing::Imported(buffer))
    }

    /// Bind a physical resource to `handle` if it has none yet.
    ///
    /// Idempotent: a realized handle returns its current resource without
    /// touching the pool. Realizing a released handle fails with
    /// [`GraphicsError::UseAfterRelease`].
    pub fn realize<B: Backend>(
        &mut self,
        handle: ResourceHandle,
        pools: &mut TransientPools<B>,
    ) -> Result<PhysicalId, GraphicsError> {
        match handle.kind() {
            ResourceKind::Texture => self
                .textures
                .realize(handle, |descriptor| pools.acquire_texture(descriptor)),
            ResourceKind::Buffer => self
                .buffers
                .realize(handle, |descriptor| pools.acquire_buffer(descriptor)),
        }
    }

    /// Return the physical resource of `handle` to the pool.
    ///
    /// Returns `false` without side effects for unrealized, already released
    /// and imported handles.
    pub fn release_to_pool<B: Backend>(
        &mut self,
        handle: ResourceHandle,
        pools: &mut TransientPools<B>,
        frame: u64,
    ) -> Result<bool, GraphicsError> {
        let released = match handle.kind() {
            ResourceKind::Texture => self
                .textures
                .take(handle)?
                .map(|texture| pools.release_texture(texture, frame))
                .is_some(),
            ResourceKind::Buffer => self
                .buffers
                .take(handle)?
                .map(|buffer| pools.release_buffer(buffer, frame))
                .is_some(),
        };
        if released {
            log::trace!("Released {} to pool on frame {}", handle, frame);
        }
        Ok(released)
    }

    /// Release every still-realized transient resource.
    ///
    /// This is the abort path: it keeps the pools whole when a frame is
    /// abandoned mid-execution. Returns the number of released resources.
    pub fn release_all<B: Backend>(&mut self, pools: &mut TransientPools<B>, frame: u64) -> usize {
        profile_function!();
        let mut released = 0;
        for index in 0..self.textures.slots.len() {
            let handle = ResourceHandle::new(ResourceKind::Texture, index as u32);
            if let Ok(Some(texture)) = self.textures.take(handle) {
                pools.release_texture(texture, frame);
                released += 1;
            }
        }
        for index in 0..self.buffers.slots.len() {
            let handle = ResourceHandle::new(ResourceKind::Buffer, index as u32);
            if let Ok(Some(buffer)) = self.buffers.take(handle) {
                pools.release_buffer(buffer, frame);
                released += 1;
            }
        }
        released
    }

    /// The physical texture behind `handle`.
    ///
    /// Fails with [`GraphicsError::UnrealizedResource`] before realization and
    /// with [`GraphicsError::UseAfterRelease`] after release.
    pub fn texture(&self, handle: ResourceHandle) -> Result<&Texture, GraphicsError> {
        self.textures.resource(handle)
    }

    /// The physical buffer behind `handle`.
    pub fn buffer(&self, handle: ResourceHandle) -> Result<&Buffer, GraphicsError> {
        self.buffers.resource(handle)
    }

    /// Physical identity behind `handle`, whatever its kind.
    pub fn physical_id(&self, handle: ResourceHandle) -> Result<PhysicalId, GraphicsError> {
        match handle.kind() {
            ResourceKind::Texture => self.texture(handle).map(Texture::id),
            ResourceKind::Buffer => self.buffer(handle).map(Buffer::id),
        }
    }

    /// Lifetime state of `handle`.
    pub fn state(&self, handle: ResourceHandle) -> Result<ResourceState, GraphicsError> {
        match handle.kind() {
            ResourceKind::Texture => self.textures.slot(handle).map(Slot::state),
            ResourceKind::Buffer => self.buffers.slot(handle).map(Slot::state),
        }
    }

    /// Whether `handle` wraps an externally owned resource.
    pub fn is_imported(&self, handle: ResourceHandle) -> bool {
        match handle.kind() {
            ResourceKind::Texture => self
                .textures
                .slot(handle)
                .is_ok_and(|slot| matches!(slot.backing, Backing::Imported(_))),
            ResourceKind::Buffer => self
                .buffers
                .slot(handle)
                .is_ok_and(|slot| matches!(slot.backing, Backing::Imported(_))),
        }
    }

    /// Structural hash of the descriptor behind `handle`.
    pub fn descriptor_hash(&self, handle: ResourceHandle) -> Result<u64, GraphicsError> {
        match handle.kind() {
            ResourceKind::Texture => self.textures.slot(handle).map(|slot| slot.hash),
            ResourceKind::Buffer => self.buffers.slot(handle).map(|slot| slot.hash),
        }
    }

    /// Copy of the descriptor `handle` was declared or imported with.
    pub fn descriptor(&self, handle: ResourceHandle) -> Result<ResourceDescriptor, GraphicsError> {
        match handle.kind() {
            ResourceKind::Texture => self
                .textures
                .slot(handle)
                .map(|slot| slot.descriptor.clone().into()),
            ResourceKind::Buffer => self
                .buffers
                .slot(handle)
                .map(|slot| slot.descriptor.clone().into()),
        }
    }

    /// Debug label of `handle`, if the descriptor has one.
    pub fn label(&self, handle: ResourceHandle) -> Option<&str> {
        match handle.kind() {
            ResourceKind::Texture => self
                .textures
                .slot(handle)
                .ok()
                .and_then(|slot| slot.descriptor.label()),
            ResourceKind::Buffer => self
                .buffers
                .slot(handle)
                .ok()
                .and_then(|slot| slot.descriptor.label()),
        }
    }

    /// Whether `handle` was issued by this registry.
    pub fn contains(&self, handle: ResourceHandle) -> bool {
        match handle.kind() {
            ResourceKind::Texture => self.textures.slot(handle).is_ok(),
            ResourceKind::Buffer => self.buffers.slot(handle).is_ok(),
        }
    }

    /// Number of transient resources currently bound to a physical resource.
    pub fn realized_count(&self) -> usize {
        self.textures.realized_count() + self.buffers.realized_count()
    }

    /// Handles of every transient resource currently bound.
    pub fn realized_handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.textures
            .realized_handles()
            .chain(self.buffers.realized_handles())
    }

    /// Number of texture slots.
    pub fn texture_count(&self) -> usize {
        self.textures.slots.len()
    }

    /// Number of buffer slots.
    pub fn buffer_count(&self) -> usize {
        self.buffers.slots.len()
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.texture_count() + self.buffer_count()
    }

    /// Whether no resource has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every slot, keeping the allocations.
    ///
    /// Call [`release_all`](Self::release_all) first. Resources still realized
    /// here never reach a pool and their native objects leak.
    pub fn clear(&mut self) {
        let leaked = self.realized_count();
        if leaked > 0 {
            log::error!("Clearing registry with {} realized resources; they leak", leaked);
        }
        self.textures.slots.clear();
        self.buffers.slots.clear();
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Common utilities for frame graph integration tests.
//!
//! Tests run against the dummy backend, which tracks how many physical
//! resources were created and destroyed without touching a GPU.

use std::sync::Arc;

use parking_lot::Mutex;

use rdg_graphics::backend::DummyBackend;
use rdg_graphics::pool::{SharedPools, TransientPools};
use rdg_graphics::{
    BufferDescriptor, BufferUsage, FrameGraph, FrameGraphConfig, PassContext, PassError,
    PhysicalId, ResourceHandle, TextureDescriptor, TextureFormat, TextureUsage,
};

/// Install the test logger once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A frame graph with its own pools and the given retention window.
pub fn frame_graph(retention_frames: u64) -> FrameGraph<DummyBackend> {
    init_logging();
    FrameGraph::new(
        DummyBackend::new(),
        FrameGraphConfig::default().with_retention_frames(retention_frames),
    )
}

/// Pools that several frame graphs can share.
pub fn shared_pools(retention_frames: u64) -> SharedPools<DummyBackend> {
    init_logging();
    let config = FrameGraphConfig::default().with_retention_frames(retention_frames);
    TransientPools::new(DummyBackend::new(), &config).into_shared()
}

/// 2D RGBA8 render target usable as a shader input.
pub fn rgba(width: u32, height: u32) -> TextureDescriptor {
    TextureDescriptor::new_2d(
        width,
        height,
        TextureFormat::Rgba8Unorm,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

/// 2D single-channel 16-bit render target.
pub fn r16(width: u32, height: u32) -> TextureDescriptor {
    TextureDescriptor::new_2d(
        width,
        height,
        TextureFormat::R16Float,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

/// Storage buffer of `size` bytes.
pub fn storage(size: u64) -> BufferDescriptor {
    BufferDescriptor::new(size, BufferUsage::STORAGE | BufferUsage::COPY_DST)
}

/// Events observed by pass callbacks, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A pass callback started.
    Ran(String),
    /// A pass saw the physical texture behind a handle.
    Texture(String, PhysicalId),
    /// A pass saw the number of transient resources checked out of the pools.
    CheckedOut(String, usize),
}

/// Shared, cloneable event log for pass callbacks.
#[derive(Debug, Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<Event>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    /// Names of the passes that ran, in order.
    pub fn ran(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Ran(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Physical ids seen for textures, in order.
    pub fn texture_ids(&self) -> Vec<PhysicalId> {
        self.0
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Texture(_, id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Callback that logs the pass name and the textures behind `handles`.
    pub fn recorder(
        &self,
        handles: Vec<ResourceHandle>,
    ) -> impl FnOnce(&PassContext<'_>) -> Result<(), PassError> + Send + 'static {
        let trace = self.clone();
        move |ctx| {
            trace.push(Event::Ran(ctx.pass_name().to_string()));
            for handle in handles {
                let texture = ctx.texture(handle)?;
                trace.push(Event::Texture(ctx.pass_name().to_string(), texture.id()));
            }
            Ok(())
        }
    }

    /// Callback that logs the pass name and the pools' checked-out count.
    pub fn checked_out_recorder(
        &self,
        pools: SharedPools<DummyBackend>,
    ) -> impl FnOnce(&PassContext<'_>) -> Result<(), PassError> + Send + 'static {
        let trace = self.clone();
        move |ctx| {
            let name = ctx.pass_name().to_string();
            trace.push(Event::Ran(name.clone()));
            let live = pools.lock().live_transient_count();
            trace.push(Event::CheckedOut(name, live));
            Ok(())
        }
    }
}

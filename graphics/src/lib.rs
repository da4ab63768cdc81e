//! # rdg graphics
//!
//! Frame-scoped render dependency graph with pooled transient GPU resources.
//!
//! ## Overview
//!
//! Rendering code records named passes together with the textures and
//! buffers they read, write and create. At the end of the frame the graph:
//!
//! - Culls passes whose results nobody consumes
//! - Realizes each transient resource just before its first use, reusing a
//!   pooled physical resource with an identical descriptor when one is free
//! - Returns each resource to the pool right after its last use
//!
//! This crate provides:
//! - [`FrameGraph`] - Begin/end frame context, the main entry point
//! - [`RenderGraph`] - Passes and logical resources of one frame
//! - [`TransientPools`](pool::TransientPools) - Cross-frame resource pools keyed by descriptor hash
//! - [`Backend`] - Trait for the GPU API that actually creates resources
//! - [`DummyBackend`] - Backend without a GPU, for tests and tools
//!
//! ## Example
//!
//! ```
//! use rdg_graphics::backend::DummyBackend;
//! use rdg_graphics::{FrameGraph, FrameGraphConfig, TextureDescriptor, TextureFormat, TextureUsage};
//!
//! let mut frames = FrameGraph::new(DummyBackend::new(), FrameGraphConfig::default());
//! let desc = TextureDescriptor::new_2d(256, 256, TextureFormat::Rgba8Unorm, TextureUsage::RENDER_ATTACHMENT);
//!
//! frames.begin_frame(1).unwrap();
//! let unused = frames.create_texture(desc.clone()).unwrap();
//! let color = frames.create_texture(desc).unwrap();
//! let debug = frames.pass("debug").with_create(unused);
//! frames.add_pass(debug).unwrap();
//! let main = frames.pass("main").with_create(color).as_frame_output();
//! frames.add_pass(main).unwrap();
//! frames.end_frame().unwrap();
//!
//! assert_eq!(frames.culled_pass_names(), &["debug"]);
//! ```

pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod frame;
pub mod graph;
pub mod pool;
pub mod resources;
pub mod types;

// Re-export main types for convenience
pub use backend::{Backend, BackendError, DummyBackend};
pub use compiler::{CompiledGraph, ResourceLifetime};
pub use config::FrameGraphConfig;
pub use error::{GraphicsError, PassError};
pub use executor::{ExecutionReport, GraphExecutor};
pub use frame::{FrameGraph, FrameReport};
pub use graph::{PassContext, PassHandle, PassNode, RenderGraph, ResourceHandle, ResourceState};
pub use resources::{Buffer, PhysicalId, PhysicalResource, Texture};
pub use types::{
    BufferDescriptor, BufferUsage, DescriptorHash, Extent3d, ResourceDescriptor, ResourceKind,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsage,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library versions.
///
/// Optional; nothing in the crate depends on it having been called.
pub fn init() {
    rdg_core::init();
    log::info!("rdg graphics v{} initialized", VERSION);
}

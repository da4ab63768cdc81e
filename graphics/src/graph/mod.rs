//! Render graph infrastructure.
//!
//! The render graph records one frame's passes together with the resources
//! each of them reads, writes and creates. Compilation then decides:
//!
//! - Which passes are culled because nobody consumes their results
//! - When each transient resource is first needed and last used
//!
//! Passes always run in recording order. The graph never reorders them.
//!
//! # Architecture
//!
//! | Layer | Type | Purpose |
//! |-------|------|---------|
//! | Frame | [`FrameGraph`](crate::FrameGraph) | Begin/end frame, shared pools |
//! | **Graph** | [`RenderGraph`] | Passes and logical resources (this module) |
//! | Registry | [`ResourceRegistry`] | Handle → descriptor → physical resource |
//! | Pass | [`PassNode`] | Single unit of GPU work |
//!
//! # Example
//!
//! ```
//! use rdg_graphics::graph::{PassNode, RenderGraph};
//! use rdg_graphics::{TextureDescriptor, TextureFormat, TextureUsage};
//!
//! let mut graph = RenderGraph::new();
//! let color = graph.create_texture(TextureDescriptor::new_2d(
//!     1280, 720, TextureFormat::Rgba16Float, TextureUsage::RENDER_ATTACHMENT,
//! ));
//!
//! graph.add_pass(PassNode::new("opaque").with_create(color)).unwrap();
//! graph
//!     .add_pass(PassNode::new("present").with_read(color).as_frame_output())
//!     .unwrap();
//!
//! let compiled = graph.compile();
//! assert_eq!(compiled.pass_count(), 2);
//! ```

mod handle;
mod pass;
mod registry;

pub use handle::{PassHandle, ResourceHandle, ResourceKind, ResourceState};
pub use pass::{PassCallback, PassContext, PassNode};
pub use registry::ResourceRegistry;

use std::collections::HashMap;
use std::sync::Arc;

use crate::compiler::{self, CompiledGraph};
use crate::error::GraphicsError;
use crate::resources::{Buffer, Texture};
use crate::types::{BufferDescriptor, TextureDescriptor};

/// The render graph describes a frame's rendering operations.
///
/// # Construction
///
/// Declare resources, then add passes in execution order:
///
/// ```ignore
/// let mut graph = RenderGraph::new();
/// let depth = graph.create_texture(depth_desc);
/// let backbuffer = graph.import_texture(swapchain_image);
/// graph.add_pass(PassNode::new("depth_prepass").with_create(depth))?;
/// graph.add_pass(PassNode::new("forward").with_read(depth).with_write(backbuffer))?;
/// ```
///
/// # Validation
///
/// [`add_pass`](Self::add_pass) rejects a pass immediately when it names a
/// handle this graph never issued, creates a handle another pass already
/// produced, creates an imported handle, or reads a transient handle no
/// earlier pass has created or written.
#[derive(Debug, Default)]
pub struct RenderGraph {
    passes: Vec<PassNode>,
    registry: ResourceRegistry,
    /// Resources marked as frame outputs.
    outputs: Vec<ResourceHandle>,
    /// First pass that created or wrote each transient handle.
    producers: HashMap<ResourceHandle, PassHandle>,
}

impl RenderGraph {
    /// Create a new empty render graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a transient texture. Nothing is allocated until a pass needs it.
    pub fn create_texture(&mut self, descriptor: TextureDescriptor) -> ResourceHandle {
        self.registry.create_texture(descriptor)
    }

    /// Declare a transient buffer. Nothing is allocated until a pass needs it.
    pub fn create_buffer(&mut self, descriptor: BufferDescriptor) -> ResourceHandle {
        self.registry.create_buffer(descriptor)
    }

    /// Wrap an externally owned texture, such as the swap-chain image.
    ///
    /// Imported resources are never returned to a pool, and passes writing
    /// them are never culled.
    pub fn import_texture(&mut self, texture: Arc<Texture>) -> ResourceHandle {
        self.registry.import_texture(texture)
    }

    /// Wrap an externally owned buffer.
    pub fn import_buffer(&mut self, buffer: Arc<Buffer>) -> ResourceHandle {
        self.registry.import_buffer(buffer)
    }

    /// Mark a resource as a final result of the frame.
    ///
    /// The passes producing it are kept alive, and a transient output is only
    /// released after the last pass of the frame.
    pub fn mark_output(&mut self, handle: ResourceHandle) -> Result<(), GraphicsError> {
        if handle.is_null() || !self.registry.contains(handle) {
            return Err(GraphicsError::InvalidHandle(handle));
        }
        if !self.outputs.contains(&handle) {
            self.outputs.push(handle);
        }
        Ok(())
    }

    /// Whether `handle` was marked with [`mark_output`](Self::mark_output).
    pub fn is_output(&self, handle: ResourceHandle) -> bool {
        self.outputs.contains(&handle)
    }

    /// Resources marked as frame outputs.
    pub fn outputs(&self) -> &[ResourceHandle] {
        &self.outputs
    }

    /// Add a pass to the graph.
    ///
    /// The pass should be fully configured before adding. Returns a
    /// `PassHandle` for referencing this pass.
    pub fn add_pass(&mut self, pass: PassNode) -> Result<PassHandle, GraphicsError> {
        let handle = PassHandle::new(self.passes.len() as u32);
        self.validate(&pass)?;

        for resource in pass.output_handles() {
            if !self.registry.is_imported(resource) {
                self.producers.entry(resource).or_insert(handle);
            }
        }

        log::trace!(
            "Recorded pass '{}' ({} reads, {} writes, {} creates)",
            pass.name(),
            pass.reads().len(),
            pass.writes().len(),
            pass.creates().len()
        );
        self.passes.push(pass);
        Ok(handle)
    }

    fn validate(&self, pass: &PassNode) -> Result<(), GraphicsError> {
        for resource in pass.handles() {
            if resource.is_null() || !self.registry.contains(resource) {
                log::error!("Pass '{}' declares unknown handle {}", pass.name(), resource);
                return Err(GraphicsError::InvalidHandle(resource));
            }
        }

        for &resource in pass.creates() {
            if self.registry.is_imported(resource) {
                return Err(self.configuration_error(format!(
                    "pass '{}' creates imported resource {}",
                    pass.name(),
                    self.describe(resource)
                )));
            }
            if let Some(&producer) = self.producers.get(&resource) {
                return Err(self.configuration_error(format!(
                    "pass '{}' creates {} which pass '{}' already produced",
                    pass.name(),
                    self.describe(resource),
                    self.passes[producer.index()].name()
                )));
            }
        }

        for &resource in pass.reads() {
            let produced = self.registry.is_imported(resource)
                || self.producers.contains_key(&resource)
                || pass.writes().contains(&resource)
                || pass.creates().contains(&resource);
            if !produced {
                return Err(self.configuration_error(format!(
                    "pass '{}' reads {} before any pass created or wrote it",
                    pass.name(),
                    self.describe(resource)
                )));
            }
        }

        Ok(())
    }

    fn describe(&self, handle: ResourceHandle) -> String {
        let Ok(descriptor) = self.registry.descriptor(handle) else {
            return handle.to_string();
        };
        let size = descriptor.estimated_size_bytes();
        match descriptor.label() {
            Some(label) => format!("'{}' ({}, {} bytes)", label, handle, size),
            None => format!("{} ({} bytes)", handle, size),
        }
    }

    fn configuration_error(&self, message: String) -> GraphicsError {
        log::error!("{}", message);
        GraphicsError::Configuration(message)
    }

    /// Get a pass by handle.
    pub fn pass(&self, handle: PassHandle) -> Option<&PassNode> {
        self.passes.get(handle.index())
    }

    /// Get all passes in recording order.
    pub fn passes(&self) -> &[PassNode] {
        &self.passes
    }

    /// Get the number of passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// The resource table of this graph.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    /// Passes and registry borrowed together, for the executor.
    pub(crate) fn parts_mut(&mut self) -> (&mut [PassNode], &mut ResourceRegistry) {
        (&mut self.passes, &mut self.registry)
    }

    /// Names of the passes the last compilation culled.
    pub fn culled_pass_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.passes
            .iter()
            .filter(|pass| pass.is_culled())
            .map(PassNode::name)
    }

    /// Compile the graph into an execution plan.
    ///
    /// Updates each pass's culled flag and reference count.
    pub fn compile(&mut self) -> CompiledGraph {
        let mut compiled = CompiledGraph::default();
        self.compile_into(&mut compiled);
        compiled
    }

    /// Compile into an existing [`CompiledGraph`], reusing its allocations.
    pub fn compile_into(&mut self, target: &mut CompiledGraph) {
        compiler::compile_into(self, target);
        for (index, pass) in self.passes.iter_mut().enumerate() {
            let handle = PassHandle::new(index as u32);
            pass.set_compiled(target.is_culled(handle), target.pass_ref_count(handle));
        }
    }

    /// Remove all passes and resources, keeping allocations.
    ///
    /// Release realized resources first with
    /// [`ResourceRegistry::release_all`]; clearing a registry with realized
    /// resources leaks them.
    pub fn clear(&mut self) {
        self.passes.clear();
        self.registry.clear();
        self.outputs.clear();
        self.producers.clear();
    }

    /// Remove all passes, handing each to `recycle`, then clear the graph.
    pub(crate) fn clear_with(&mut self, mut recycle: impl FnMut(PassNode)) {
        for pass in self.passes.drain(..) {
            recycle(pass);
        }
        self.clear();
    }
}

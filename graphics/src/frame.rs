//! Frame-scoped render graph context.
//!
//! [`FrameGraph`] is the entry point for rendering code. It brackets one
//! frame's recording window, owns the per-frame [`RenderGraph`], and on
//! [`end_frame`](FrameGraph::end_frame) compiles, executes and evicts stale
//! pool entries in one step.
//!
//! Several frame graphs may share one set of [`TransientPools`] through
//! [`FrameGraph::with_shared_pools`], which is how frames in flight reuse each
//! other's transient resources.
//!
//! # Example
//!
//! ```
//! use rdg_graphics::backend::DummyBackend;
//! use rdg_graphics::{FrameGraph, FrameGraphConfig, TextureDescriptor, TextureFormat, TextureUsage};
//!
//! let mut frames = FrameGraph::new(DummyBackend::new(), FrameGraphConfig::default());
//!
//! frames.begin_frame(1).unwrap();
//! let color = frames
//!     .create_texture(TextureDescriptor::new_2d(
//!         640, 480, TextureFormat::Rgba8Unorm, TextureUsage::RENDER_ATTACHMENT,
//!     ))
//!     .unwrap();
//! let pass = frames.pass("draw").with_create(color).as_frame_output();
//! frames.add_pass(pass).unwrap();
//!
//! let report = frames.end_frame().unwrap();
//! assert_eq!(report.executed_passes, 1);
//! assert_eq!(frames.executed_pass_names(), &["draw"]);
//! ```

use std::sync::Arc;

use rdg_core::pool::{Pooled, VecPool};
use rdg_core::profiling::{frame_mark, profile_scope};

use crate::backend::Backend;
use crate::compiler::CompiledGraph;
use crate::config::FrameGraphConfig;
use crate::error::GraphicsError;
use crate::executor::GraphExecutor;
use crate::graph::{PassHandle, PassNode, RenderGraph, ResourceHandle};
use crate::pool::{SharedPools, TransientPools};
use crate::resources::{Buffer, Texture};
use crate::types::{BufferDescriptor, TextureDescriptor};

/// Summary of a completed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Index passed to [`FrameGraph::begin_frame`].
    pub frame_index: u64,
    /// Passes that ran.
    pub executed_passes: usize,
    /// Passes removed by culling.
    pub culled_passes: usize,
    /// Handles bound to physical resources.
    pub realized: usize,
    /// Physical resources returned to the pool.
    pub released: usize,
    /// Stale pool entries destroyed after execution.
    pub evicted: usize,
}

/// Records, compiles and executes one render graph per frame.
pub struct FrameGraph<B: Backend> {
    pools: SharedPools<B>,
    config: FrameGraphConfig,
    graph: RenderGraph,
    compiled: Pooled<CompiledGraph>,
    handle_lists: VecPool<ResourceHandle>,
    executor: GraphExecutor,
    frame_index: u64,
    recording: bool,
    executed_names: Vec<String>,
    culled_names: Vec<String>,
}

impl<B: Backend> FrameGraph<B> {
    /// Create a frame graph with its own transient pools around `backend`.
    pub fn new(backend: B, config: FrameGraphConfig) -> Self {
        Self::with_shared_pools(TransientPools::new(backend, &config).into_shared())
    }

    /// Create a frame graph drawing from pools shared with other frame graphs.
    ///
    /// The frame graph adopts the configuration the pools were created with.
    pub fn with_shared_pools(pools: SharedPools<B>) -> Self {
        let (config, backend_name) = {
            let pools = pools.lock();
            (*pools.config(), pools.backend().name())
        };
        log::debug!(
            "Created frame graph on '{}' backend (retention {} frames)",
            backend_name,
            config.retention_frames
        );
        Self {
            pools,
            config,
            graph: RenderGraph::new(),
            compiled: Pooled::default(),
            handle_lists: VecPool::new(),
            executor: GraphExecutor::new(),
            frame_index: 0,
            recording: false,
            executed_names: Vec::new(),
            culled_names: Vec::new(),
        }
    }

    /// Open the recording window for `frame_index`.
    pub fn begin_frame(&mut self, frame_index: u64) -> Result<(), GraphicsError> {
        if self.recording {
            log::error!(
                "begin_frame({}) called while frame {} is still recording",
                frame_index,
                self.frame_index
            );
            return Err(GraphicsError::FrameInProgress(self.frame_index));
        }
        self.frame_index = frame_index;
        self.recording = true;
        self.executed_names.clear();
        self.culled_names.clear();
        log::trace!("Begin frame {}", frame_index);
        Ok(())
    }

    /// Declare a transient texture for this frame.
    pub fn create_texture(
        &mut self,
        descriptor: TextureDescriptor,
    ) -> Result<ResourceHandle, GraphicsError> {
        self.ensure_recording()?;
        Ok(self.graph.create_texture(descriptor))
    }

    /// Declare a transient buffer for this frame.
    pub fn create_buffer(
        &mut self,
        descriptor: BufferDescriptor,
    ) -> Result<ResourceHandle, GraphicsError> {
        self.ensure_recording()?;
        Ok(self.graph.create_buffer(descriptor))
    }

    /// Wrap an externally owned texture. It never enters the pool.
    pub fn import_texture(&mut self, texture: Arc<Texture>) -> Result<ResourceHandle, GraphicsError> {
        self.ensure_recording()?;
        Ok(self.graph.import_texture(texture))
    }

    /// Wrap an externally owned buffer. It never enters the pool.
    pub fn import_buffer(&mut self, buffer: Arc<Buffer>) -> Result<ResourceHandle, GraphicsError> {
        self.ensure_recording()?;
        Ok(self.graph.import_buffer(buffer))
    }

    /// Mark `handle` as a final result of this frame.
    pub fn mark_output(&mut self, handle: ResourceHandle) -> Result<(), GraphicsError> {
        self.ensure_recording()?;
        self.graph.mark_output(handle)
    }

    /// Start building a pass whose handle lists come from the scratch pool.
    pub fn pass(&mut self, name: impl Into<String>) -> PassNode {
        PassNode::with_lists(
            name,
            self.handle_lists.acquire(),
            self.handle_lists.acquire(),
            self.handle_lists.acquire(),
        )
    }

    /// Record a pass. Validation errors are reported immediately.
    pub fn add_pass(&mut self, pass: PassNode) -> Result<PassHandle, GraphicsError> {
        self.ensure_recording()?;
        self.graph.add_pass(pass)
    }

    /// Close the recording window: compile, execute, then evict stale pool
    /// entries.
    ///
    /// On failure the frame is abandoned, every resource it realized is back in
    /// the pool, and the frame graph is ready for the next
    /// [`begin_frame`](Self::begin_frame).
    pub fn end_frame(&mut self) -> Result<FrameReport, GraphicsError> {
        self.ensure_recording()?;
        profile_scope!("end_frame");
        self.recording = false;

        let compiled = self.compiled.activate();
        self.graph.compile_into(compiled);
        for &pass in compiled.execution_order() {
            if let Some(node) = self.graph.pass(pass) {
                self.executed_names.push(node.name().to_string());
            }
        }
        self.culled_names
            .extend(self.graph.culled_pass_names().map(str::to_string));

        let result = self
            .executor
            .execute(&mut self.graph, compiled, &*self.pools, self.frame_index);
        let evicted = self.pools.lock().evict_stale(self.frame_index);

        self.recycle();
        frame_mark!();

        let execution = result?;
        Ok(FrameReport {
            frame_index: self.frame_index,
            executed_passes: execution.executed_passes,
            culled_passes: execution.culled_passes,
            realized: execution.realized,
            released: execution.released,
            evicted,
        })
    }

    /// Abandon the frame being recorded without executing it.
    ///
    /// Does nothing when no frame is recording.
    pub fn abort_frame(&mut self) {
        if !self.recording {
            return;
        }
        let reclaimed = self
            .graph
            .registry_mut()
            .release_all(&mut self.pools.lock(), self.frame_index);
        log::warn!(
            "Frame {} aborted with {} recorded passes ({} resources returned to pool)",
            self.frame_index,
            self.graph.pass_count(),
            reclaimed
        );
        self.recording = false;
        self.recycle();
    }

    /// Names of the passes culled in the last completed frame.
    pub fn culled_pass_names(&self) -> &[String] {
        &self.culled_names
    }

    /// Names of the live passes of the last completed frame, in execution order.
    pub fn executed_pass_names(&self) -> &[String] {
        &self.executed_names
    }

    /// The transient pools this frame graph draws from.
    pub fn pools(&self) -> &SharedPools<B> {
        &self.pools
    }

    /// The graph being recorded.
    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    /// Configuration of the pools this frame graph draws from.
    pub fn config(&self) -> &FrameGraphConfig {
        &self.config
    }

    /// Index of the current (or last) frame.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether a frame is between `begin_frame` and `end_frame`.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Abort any recording frame and destroy every pooled resource.
    ///
    /// Fails if another frame graph sharing the pools still holds resources.
    pub fn shutdown(&mut self) -> Result<usize, GraphicsError> {
        self.abort_frame();
        self.handle_lists.clear();
        let destroyed = self.pools.lock().teardown()?;
        log::debug!("Frame graph shut down, {} pooled resources destroyed", destroyed);
        Ok(destroyed)
    }

    fn ensure_recording(&self) -> Result<(), GraphicsError> {
        if self.recording {
            Ok(())
        } else {
            Err(GraphicsError::NotRecording)
        }
    }

    fn recycle(&mut self) {
        let lists = &mut self.handle_lists;
        self.graph.clear_with(|pass| {
            for list in pass.into_lists() {
                lists.release(list);
            }
        });
        self.compiled.release();
    }
}

impl<B: Backend> std::fmt::Debug for FrameGraph<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGraph")
            .field("frame_index", &self.frame_index)
            .field("recording", &self.recording)
            .field("passes", &self.graph.pass_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(FrameGraph<crate::backend::DummyBackend>: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::resources::PhysicalResource;
    use crate::types::{TextureFormat, TextureUsage};

    fn frame_graph() -> FrameGraph<DummyBackend> {
        FrameGraph::new(DummyBackend::new(), FrameGraphConfig::default())
    }

    fn color() -> TextureDescriptor {
        TextureDescriptor::new_2d(
            256,
            256,
            TextureFormat::Rgba8Unorm,
            TextureUsage::RENDER_ATTACHMENT,
        )
    }

    #[test]
    fn test_recording_requires_begin_frame() {
        let mut frames = frame_graph();
        assert!(matches!(
            frames.create_texture(color()),
            Err(GraphicsError::NotRecording)
        ));
        let pass = frames.pass("early");
        assert!(matches!(frames.add_pass(pass), Err(GraphicsError::NotRecording)));
        assert!(matches!(frames.end_frame(), Err(GraphicsError::NotRecording)));
    }

    #[test]
    fn test_nested_begin_frame_is_rejected() {
        let mut frames = frame_graph();
        frames.begin_frame(4).unwrap();
        assert!(matches!(
            frames.begin_frame(5),
            Err(GraphicsError::FrameInProgress(4))
        ));
        assert_eq!(frames.frame_index(), 4);
    }

    #[test]
    fn test_pass_lists_are_recycled() {
        let mut frames = frame_graph();
        for frame in 1..=3 {
            frames.begin_frame(frame).unwrap();
            let t = frames.create_texture(color()).unwrap();
            let pass = frames.pass("draw").with_create(t).as_frame_output();
            frames.add_pass(pass).unwrap();
            frames.end_frame().unwrap();
            assert_eq!(frames.handle_lists.free_count(), 3);
        }
        assert!(frames.compiled.is_pooled());
    }

    #[test]
    fn test_second_frame_reuses_texture() {
        let mut frames = frame_graph();
        let mut seen = Vec::new();

        for frame in 1..=2 {
            frames.begin_frame(frame).unwrap();
            let t = frames.create_texture(color()).unwrap();
            let (sender, receiver) = std::sync::mpsc::channel();
            let pass = frames
                .pass("draw")
                .with_create(t)
                .as_frame_output()
                .with_callback(move |ctx| {
                    sender.send(ctx.texture(t)?.id())?;
                    Ok(())
                });
            frames.add_pass(pass).unwrap();
            frames.end_frame().unwrap();
            seen.push(receiver.recv().unwrap());
        }

        assert_eq!(seen[0], seen[1]);
        assert_eq!(frames.pools().lock().backend().textures_created(), 1);
    }

    #[test]
    fn test_shared_pools_config_is_adopted() {
        let config = FrameGraphConfig::default()
            .with_retention_frames(3)
            .with_transient_budget_bytes(4096);
        let pools = TransientPools::new(DummyBackend::new(), &config).into_shared();

        let frames = FrameGraph::with_shared_pools(Arc::clone(&pools));
        assert_eq!(frames.config(), &config);
        assert_eq!(frames.config(), pools.lock().config());
        assert_eq!(pools.lock().textures().retention_frames(), 3);
    }

    #[test]
    fn test_abort_frame_discards_recording() {
        let mut frames = frame_graph();
        frames.begin_frame(1).unwrap();
        let t = frames.create_texture(color()).unwrap();
        let pass = frames.pass("draw").with_create(t).as_frame_output();
        frames.add_pass(pass).unwrap();

        frames.abort_frame();
        assert!(!frames.is_recording());
        assert_eq!(frames.graph().pass_count(), 0);
        assert_eq!(frames.pools().lock().backend().textures_created(), 0);
        frames.begin_frame(2).unwrap();
    }

    #[test]
    fn test_shutdown_destroys_pooled_resources() {
        let mut frames = frame_graph();
        frames.begin_frame(1).unwrap();
        let t = frames.create_texture(color()).unwrap();
        let pass = frames.pass("draw").with_create(t).as_frame_output();
        frames.add_pass(pass).unwrap();
        frames.end_frame().unwrap();

        assert_eq!(frames.shutdown().unwrap(), 1);
        let pools = frames.pools().lock();
        assert_eq!(pools.backend().textures_destroyed(), 1);
        assert_eq!(pools.free_count(), 0);
    }

    #[test]
    fn test_imported_texture_survives_frame() {
        let mut frames = frame_graph();
        let backbuffer = {
            let mut pools = frames.pools().lock();
            Arc::new(Texture::create(pools.backend_mut(), &color()).unwrap())
        };

        frames.begin_frame(1).unwrap();
        let target = frames.import_texture(Arc::clone(&backbuffer)).unwrap();
        let pass = frames.pass("present").with_write(target);
        frames.add_pass(pass).unwrap();
        let report = frames.end_frame().unwrap();

        assert_eq!(report.executed_passes, 1);
        assert_eq!(report.released, 0);
        assert_eq!(Arc::strong_count(&backbuffer), 1);
        assert_eq!(frames.pools().lock().free_count(), 0);
    }
}

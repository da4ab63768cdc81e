//! Render pass nodes.

use crate::error::{GraphicsError, PassError};
use crate::resources::{Buffer, Texture};

use super::handle::{PassHandle, ResourceHandle};
use super::registry::ResourceRegistry;

/// Body of a pass, run once by the executor if the pass survives culling.
///
/// The callback records GPU work with the physical resources it fetches from
/// the [`PassContext`]. Returning an error aborts the frame.
pub type PassCallback = Box<dyn FnOnce(&PassContext<'_>) -> Result<(), PassError> + Send>;

/// One recorded unit of GPU work.
///
/// A pass declares which handles it reads, writes and creates. The compiler
/// uses these lists to cull passes whose results nobody consumes and to decide
/// when each resource can be released. Duplicate entries in a list are ignored.
///
/// # Example
///
/// ```ignore
/// let blur = PassNode::new("blur")
///     .with_read(scene_color)
///     .with_create(blurred)
///     .with_callback(move |ctx| {
///         let src = ctx.texture(scene_color)?;
///         let dst = ctx.texture(blurred)?;
///         encoder.blur(src.raw(), dst.raw());
///         Ok(())
///     });
/// graph.add_pass(blur)?;
/// ```
pub struct PassNode {
    name: String,
    reads: Vec<ResourceHandle>,
    writes: Vec<ResourceHandle>,
    creates: Vec<ResourceHandle>,
    frame_output: bool,
    callback: Option<PassCallback>,
    culled: bool,
    ref_count: u32,
}

impl PassNode {
    /// Create a new pass with no resource usage.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_lists(name, Vec::new(), Vec::new(), Vec::new())
    }

    /// Create a pass around recycled handle lists.
    pub(crate) fn with_lists(
        name: impl Into<String>,
        mut reads: Vec<ResourceHandle>,
        mut writes: Vec<ResourceHandle>,
        mut creates: Vec<ResourceHandle>,
    ) -> Self {
        reads.clear();
        writes.clear();
        creates.clear();
        Self {
            name: name.into(),
            reads,
            writes,
            creates,
            frame_output: false,
            callback: None,
            culled: false,
            ref_count: 0,
        }
    }

    /// Give the handle lists back for reuse.
    pub(crate) fn into_lists(self) -> [Vec<ResourceHandle>; 3] {
        [self.reads, self.writes, self.creates]
    }

    /// Declare a read of `handle`.
    pub fn with_read(mut self, handle: ResourceHandle) -> Self {
        push_unique(&mut self.reads, handle);
        self
    }

    /// Declare reads of several handles.
    pub fn with_reads(mut self, handles: impl IntoIterator<Item = ResourceHandle>) -> Self {
        for handle in handles {
            push_unique(&mut self.reads, handle);
        }
        self
    }

    /// Declare a write to `handle`.
    pub fn with_write(mut self, handle: ResourceHandle) -> Self {
        push_unique(&mut self.writes, handle);
        self
    }

    /// Declare writes to several handles.
    pub fn with_writes(mut self, handles: impl IntoIterator<Item = ResourceHandle>) -> Self {
        for handle in handles {
            push_unique(&mut self.writes, handle);
        }
        self
    }

    /// Declare that this pass first produces `handle`.
    pub fn with_create(mut self, handle: ResourceHandle) -> Self {
        push_unique(&mut self.creates, handle);
        self
    }

    /// Declare several handles first produced by this pass.
    pub fn with_creates(mut self, handles: impl IntoIterator<Item = ResourceHandle>) -> Self {
        for handle in handles {
            push_unique(&mut self.creates, handle);
        }
        self
    }

    /// Mark the pass as producing the frame's visible result. It is never culled.
    pub fn as_frame_output(mut self) -> Self {
        self.frame_output = true;
        self
    }

    /// Set the pass body.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&PassContext<'_>) -> Result<(), PassError> + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Get the pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handles read by this pass.
    pub fn reads(&self) -> &[ResourceHandle] {
        &self.reads
    }

    /// Handles written by this pass.
    pub fn writes(&self) -> &[ResourceHandle] {
        &self.writes
    }

    /// Handles first produced by this pass.
    pub fn creates(&self) -> &[ResourceHandle] {
        &self.creates
    }

    /// Whether the pass is exempt from culling.
    pub fn is_frame_output(&self) -> bool {
        self.frame_output
    }

    /// Whether the last compilation culled this pass.
    pub fn is_culled(&self) -> bool {
        self.culled
    }

    /// Number of consuming accesses of this pass's outputs by later live passes,
    /// as computed by the last compilation.
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    /// Whether the pass declared `handle` in any list.
    pub fn accesses(&self, handle: ResourceHandle) -> bool {
        self.reads.contains(&handle) || self.writes.contains(&handle) || self.creates.contains(&handle)
    }

    /// Whether a callback is set and not yet consumed.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Every declared handle, once per list it appears in.
    pub fn handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.reads
            .iter()
            .chain(&self.writes)
            .chain(&self.creates)
            .copied()
    }

    /// Handles this pass reads or writes, each exactly once.
    pub(crate) fn consumed_handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.reads.iter().copied().chain(
            self.writes
                .iter()
                .copied()
                .filter(|handle| !self.reads.contains(handle)),
        )
    }

    /// Handles this pass writes or creates, each exactly once.
    pub(crate) fn output_handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.writes.iter().copied().chain(
            self.creates
                .iter()
                .copied()
                .filter(|handle| !self.writes.contains(handle)),
        )
    }

    pub(crate) fn set_compiled(&mut self, culled: bool, ref_count: u32) {
        self.culled = culled;
        self.ref_count = ref_count;
    }

    pub(crate) fn take_callback(&mut self) -> Option<PassCallback> {
        self.callback.take()
    }
}

impl std::fmt::Debug for PassNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassNode")
            .field("name", &self.name)
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .field("creates", &self.creates)
            .field("frame_output", &self.frame_output)
            .field("culled", &self.culled)
            .field("ref_count", &self.ref_count)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

fn push_unique(list: &mut Vec<ResourceHandle>, handle: ResourceHandle) {
    if !list.contains(&handle) {
        list.push(handle);
    }
}

/// What a pass callback sees while it runs.
///
/// Resource lookups are checked against the pass's declarations: using a
/// handle the pass never declared is a [`GraphicsError::Configuration`] error,
/// since it means the graph's dependency tracking is wrong.
pub struct PassContext<'a> {
    pass: &'a PassNode,
    handle: PassHandle,
    registry: &'a ResourceRegistry,
    frame_index: u64,
}

impl<'a> PassContext<'a> {
    pub(crate) fn new(
        pass: &'a PassNode,
        handle: PassHandle,
        registry: &'a ResourceRegistry,
        frame_index: u64,
    ) -> Self {
        Self {
            pass,
            handle,
            registry,
            frame_index,
        }
    }

    /// The physical texture behind a declared handle.
    pub fn texture(&self, handle: ResourceHandle) -> Result<&'a Texture, GraphicsError> {
        self.check_declared(handle)?;
        self.registry
            .texture(handle)
            .inspect_err(|err| log::error!("Pass '{}': {}", self.pass.name(), err))
    }

    /// The physical buffer behind a declared handle.
    pub fn buffer(&self, handle: ResourceHandle) -> Result<&'a Buffer, GraphicsError> {
        self.check_declared(handle)?;
        self.registry
            .buffer(handle)
            .inspect_err(|err| log::error!("Pass '{}': {}", self.pass.name(), err))
    }

    /// Name of the running pass.
    pub fn pass_name(&self) -> &str {
        self.pass.name()
    }

    /// Handle of the running pass.
    pub fn pass_handle(&self) -> PassHandle {
        self.handle
    }

    /// Index of the frame being executed.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn check_declared(&self, handle: ResourceHandle) -> Result<(), GraphicsError> {
        if self.pass.accesses(handle) {
            return Ok(());
        }
        let message = format!(
            "pass '{}' used {} ('{}') without declaring it",
            self.pass.name(),
            handle,
            self.registry.label(handle).unwrap_or("<unnamed>")
        );
        log::error!("{}", message);
        Err(GraphicsError::Configuration(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResourceKind;

    fn texture(index: u32) -> ResourceHandle {
        ResourceHandle::new(ResourceKind::Texture, index)
    }

    #[test]
    fn test_builder_collects_handles() {
        let pass = PassNode::new("lighting")
            .with_reads([texture(0), texture(1)])
            .with_write(texture(2))
            .with_create(texture(3))
            .as_frame_output();

        assert_eq!(pass.name(), "lighting");
        assert_eq!(pass.reads(), &[texture(0), texture(1)]);
        assert_eq!(pass.writes(), &[texture(2)]);
        assert_eq!(pass.creates(), &[texture(3)]);
        assert!(pass.is_frame_output());
        assert!(!pass.has_callback());
        assert!(pass.accesses(texture(3)));
        assert!(!pass.accesses(texture(4)));
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let pass = PassNode::new("dup")
            .with_read(texture(0))
            .with_read(texture(0))
            .with_writes([texture(1), texture(1)]);
        assert_eq!(pass.reads().len(), 1);
        assert_eq!(pass.writes().len(), 1);
    }

    #[test]
    fn test_read_write_counts_once() {
        let pass = PassNode::new("rmw")
            .with_read(texture(0))
            .with_write(texture(0))
            .with_write(texture(1));
        let consumed: Vec<_> = pass.consumed_handles().collect();
        assert_eq!(consumed, vec![texture(0), texture(1)]);
    }

    #[test]
    fn test_take_callback_once() {
        let mut pass = PassNode::new("once").with_callback(|_| Ok(()));
        assert!(pass.take_callback().is_some());
        assert!(pass.take_callback().is_none());
    }

    #[test]
    fn test_recycled_lists_are_cleared() {
        let lists = PassNode::new("first")
            .with_read(texture(0))
            .with_create(texture(1))
            .into_lists();
        let [reads, writes, creates] = lists;
        let pass = PassNode::with_lists("second", reads, writes, creates);
        assert!(pass.reads().is_empty());
        assert!(pass.creates().is_empty());
    }

    #[test]
    fn test_context_rejects_undeclared_handle() {
        let registry = ResourceRegistry::new();
        let pass = PassNode::new("sneaky").with_read(texture(0));
        let ctx = PassContext::new(&pass, PassHandle::new(0), &registry, 1);

        assert!(matches!(
            ctx.texture(texture(5)),
            Err(GraphicsError::Configuration(_))
        ));
        assert_eq!(ctx.pass_name(), "sneaky");
        assert_eq!(ctx.frame_index(), 1);
    }
}

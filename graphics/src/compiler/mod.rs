//! Render graph compilation.
//!
//! This module turns a recorded [`RenderGraph`] into an execution plan
//! ([`CompiledGraph`]).
//!
//! # Design Philosophy
//!
//! The compiler is intentionally simple. Passes run in the order they were
//! recorded, so compilation never sorts or reorders. It performs two linear
//! sweeps:
//!
//! 1. **Culling** (backward) - A pass is live if it is a frame-output pass, or
//!    if any resource it writes or creates is imported, marked as a frame
//!    output, or read or written by a later live pass. Walking backwards means
//!    every consumer is decided before its producers.
//! 2. **Lifetimes** (forward, live passes only) - For every resource record
//!    its creating pass, first and last use, and its reference count: the
//!    number of live passes other than the creator that read or write it. A
//!    pass that both reads and writes a resource counts once.
//!
//! From the lifetimes the compiler derives the release schedule: each
//! transient resource goes back to the pool right after its last use, except
//! frame outputs, which are released after the final pass. Resources only
//! touched by culled passes get no lifetime and are never realized.
//!
//! # Example
//!
//! ```
//! use rdg_graphics::graph::{PassNode, RenderGraph};
//! use rdg_graphics::{TextureDescriptor, TextureFormat, TextureUsage};
//!
//! let desc = TextureDescriptor::new_2d(64, 64, TextureFormat::Rgba8Unorm, TextureUsage::RENDER_ATTACHMENT);
//! let mut graph = RenderGraph::new();
//! let debug_view = graph.create_texture(desc.clone());
//! let color = graph.create_texture(desc);
//!
//! let debug = graph.add_pass(PassNode::new("debug").with_create(debug_view)).unwrap();
//! let main = graph.add_pass(PassNode::new("main").with_create(color).as_frame_output()).unwrap();
//!
//! let compiled = graph.compile();
//! assert!(compiled.is_culled(debug));
//! assert_eq!(compiled.execution_order(), &[main]);
//! assert!(compiled.lifetime(debug_view).is_none());
//! ```

use rdg_core::pool::Poolable;
use rdg_core::profiling::profile_scope;

use crate::graph::{PassHandle, RenderGraph, ResourceHandle, ResourceKind};

/// Lifetime of one resource within a compiled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLifetime {
    /// The live pass that created the resource, if any.
    pub producer: Option<PassHandle>,
    /// First live pass that touches the resource.
    pub first_use: PassHandle,
    /// Last live pass that touches the resource.
    pub last_use: PassHandle,
    /// Live passes other than the producer that read or write the resource.
    pub ref_count: u32,
}

/// A compiled render graph ready for execution.
///
/// Contains the execution order (recording order minus culled passes), the
/// per-resource lifetimes and the release schedule. Reused across frames
/// through [`Pooled`](rdg_core::pool::Pooled) to avoid reallocating.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CompiledGraph {
    execution_order: Vec<PassHandle>,
    culled: Vec<bool>,
    pass_ref_counts: Vec<u32>,
    /// Indexed by dense slot: textures first, then buffers.
    lifetimes: Vec<Option<ResourceLifetime>>,
    texture_slots: usize,
    /// Handles released after each pass, grouped by pass.
    releases: Vec<ResourceHandle>,
    /// `releases[release_offsets[i]..release_offsets[i + 1]]` belong to pass `i`.
    release_offsets: Vec<u32>,
    /// Transient frame outputs, released after the final pass.
    deferred_releases: Vec<ResourceHandle>,
    /// Backward-sweep scratch: live consumers seen so far per slot.
    consumers: Vec<u32>,
}

impl CompiledGraph {
    /// Live passes in execution order.
    pub fn execution_order(&self) -> &[PassHandle] {
        &self.execution_order
    }

    /// Get the number of passes that will execute.
    pub fn pass_count(&self) -> usize {
        self.execution_order.len()
    }

    /// Check if no pass will execute.
    pub fn is_empty(&self) -> bool {
        self.execution_order.is_empty()
    }

    /// Whether `pass` was culled. Unknown passes count as culled.
    pub fn is_culled(&self, pass: PassHandle) -> bool {
        self.culled.get(pass.index()).copied().unwrap_or(true)
    }

    /// Culled passes in recording order.
    pub fn culled_passes(&self) -> impl Iterator<Item = PassHandle> + '_ {
        self.culled
            .iter()
            .enumerate()
            .filter(|(_, culled)| **culled)
            .map(|(index, _)| PassHandle::new(index as u32))
    }

    /// Consuming accesses of `pass`'s outputs by later live passes.
    pub fn pass_ref_count(&self, pass: PassHandle) -> u32 {
        self.pass_ref_counts.get(pass.index()).copied().unwrap_or(0)
    }

    /// Lifetime of `handle`, or `None` if no live pass touches it.
    pub fn lifetime(&self, handle: ResourceHandle) -> Option<&ResourceLifetime> {
        self.slot_of(handle)
            .and_then(|slot| self.lifetimes.get(slot))
            .and_then(Option::as_ref)
    }

    /// Transient resources to release right after `pass`.
    pub fn releases_after(&self, pass: PassHandle) -> &[ResourceHandle] {
        let index = pass.index();
        match (
            self.release_offsets.get(index),
            self.release_offsets.get(index + 1),
        ) {
            (Some(&start), Some(&end)) => &self.releases[start as usize..end as usize],
            _ => &[],
        }
    }

    /// Transient frame outputs, released once every pass has run.
    pub fn deferred_releases(&self) -> &[ResourceHandle] {
        &self.deferred_releases
    }

    /// Number of dense resource slots.
    pub(crate) fn slot_count(&self) -> usize {
        self.lifetimes.len()
    }

    /// Reference count per dense slot, 0 for slots without a lifetime.
    pub(crate) fn slot_ref_counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.lifetimes
            .iter()
            .map(|lifetime| lifetime.map_or(0, |lifetime| lifetime.ref_count))
    }

    /// Dense slot index of `handle`.
    pub(crate) fn slot_of(&self, handle: ResourceHandle) -> Option<usize> {
        if handle.is_null() {
            return None;
        }
        let slot = match handle.kind() {
            ResourceKind::Texture if handle.index() < self.texture_slots => handle.index(),
            ResourceKind::Texture => return None,
            ResourceKind::Buffer => self.texture_slots + handle.index(),
        };
        (slot < self.lifetimes.len()).then_some(slot)
    }

    fn handle_of(&self, slot: usize) -> ResourceHandle {
        if slot < self.texture_slots {
            ResourceHandle::new(ResourceKind::Texture, slot as u32)
        } else {
            ResourceHandle::new(ResourceKind::Buffer, (slot - self.texture_slots) as u32)
        }
    }
}

impl Poolable for CompiledGraph {
    fn new_empty() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.execution_order.clear();
        self.culled.clear();
        self.pass_ref_counts.clear();
        self.lifetimes.clear();
        self.texture_slots = 0;
        self.releases.clear();
        self.release_offsets.clear();
        self.deferred_releases.clear();
        self.consumers.clear();
    }
}

/// Compile a render graph into a new execution plan.
///
/// Pass flags on the graph are not updated; use
/// [`RenderGraph::compile`](crate::graph::RenderGraph::compile) for that.
pub fn compile(graph: &RenderGraph) -> CompiledGraph {
    let mut result = CompiledGraph::default();
    compile_into(graph, &mut result);
    result
}

/// Compile a render graph into an existing [`CompiledGraph`], reusing its allocation.
///
/// This is the in-place variant of [`compile`]. It clears the target and
/// fills it with the cull decisions, lifetimes and release schedule.
pub fn compile_into(graph: &RenderGraph, target: &mut CompiledGraph) {
    profile_scope!("compile_graph");

    target.reset();
    let passes = graph.passes();
    let registry = graph.registry();
    let pass_count = passes.len();

    target.texture_slots = registry.texture_count();
    target.lifetimes.resize(registry.len(), None);
    target.consumers.resize(registry.len(), 0);
    target.culled.resize(pass_count, true);
    target.pass_ref_counts.resize(pass_count, 0);

    // Backward sweep: decide culling.
    for (index, pass) in passes.iter().enumerate().rev() {
        let mut ref_count = 0;
        let mut pinned = pass.is_frame_output();
        for handle in pass.output_handles() {
            if let Some(slot) = target.slot_of(handle) {
                ref_count += target.consumers[slot];
            }
            pinned |= registry.is_imported(handle) || graph.is_output(handle);
        }
        target.pass_ref_counts[index] = ref_count;

        let live = pinned || ref_count > 0;
        target.culled[index] = !live;
        if live {
            for handle in pass.consumed_handles() {
                if let Some(slot) = target.slot_of(handle) {
                    target.consumers[slot] += 1;
                }
            }
        } else {
            log::trace!("Culled pass '{}'", pass.name());
        }
    }

    // Forward sweep: lifetimes over live passes.
    for (index, pass) in passes.iter().enumerate() {
        if target.culled[index] {
            continue;
        }
        let pass_handle = PassHandle::new(index as u32);
        target.execution_order.push(pass_handle);

        for &handle in pass.creates() {
            if let Some(slot) = target.slot_of(handle) {
                let lifetime = touch(&mut target.lifetimes[slot], pass_handle);
                lifetime.producer = Some(pass_handle);
            }
        }
        for handle in pass.consumed_handles() {
            if let Some(slot) = target.slot_of(handle) {
                let lifetime = touch(&mut target.lifetimes[slot], pass_handle);
                if !pass.creates().contains(&handle) {
                    lifetime.ref_count += 1;
                }
            }
        }
    }

    build_release_schedule(graph, target);

    log::debug!(
        "Compiled graph: {} of {} passes live, {} resources",
        target.execution_order.len(),
        pass_count,
        target.lifetimes.iter().flatten().count()
    );
}

/// Get or start the lifetime of a slot, extending it to `pass`.
fn touch(lifetime: &mut Option<ResourceLifetime>, pass: PassHandle) -> &mut ResourceLifetime {
    let lifetime = lifetime.get_or_insert(ResourceLifetime {
        producer: None,
        first_use: pass,
        last_use: pass,
        ref_count: 0,
    });
    lifetime.last_use = pass;
    lifetime
}

fn build_release_schedule(graph: &RenderGraph, target: &mut CompiledGraph) {
    let registry = graph.registry();
    target.release_offsets.resize(graph.pass_count() + 1, 0);

    for slot in 0..target.lifetimes.len() {
        let Some(lifetime) = target.lifetimes[slot] else {
            continue;
        };
        let handle = target.handle_of(slot);
        if registry.is_imported(handle) {
            continue;
        }
        if graph.is_output(handle) {
            target.deferred_releases.push(handle);
        } else {
            target.releases.push(handle);
            target.release_offsets[lifetime.last_use.index() + 1] += 1;
        }
    }

    for index in 1..target.release_offsets.len() {
        target.release_offsets[index] += target.release_offsets[index - 1];
    }

    // Group by releasing pass; stable, so slot order is kept within a pass.
    let lifetimes = &target.lifetimes;
    let texture_slots = target.texture_slots;
    target.releases.sort_by_key(|handle| {
        let slot = match handle.kind() {
            ResourceKind::Texture => handle.index(),
            ResourceKind::Buffer => texture_slots + handle.index(),
        };
        lifetimes[slot].map_or(0, |lifetime| lifetime.last_use.index())
    });
}

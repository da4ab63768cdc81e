//! Frame execution.
//!
//! The executor walks a [`CompiledGraph`] in order. For each live pass it:
//!
//! 1. Realizes every handle the pass declares, acquiring physical resources
//!    from the shared [`TransientPools`]
//! 2. Runs the pass callback with a [`PassContext`]
//! 3. Returns the resources whose last use was this pass to the pool
//!
//! Transient frame outputs go back to the pool after the final pass.
//!
//! If realization or a callback fails, every resource realized so far is
//! returned to the pool before the error is reported, so the pools never
//! lose track of a resource. The pool lock is held only for the duration of
//! a single acquire or release, never across a pass callback.

use parking_lot::Mutex;
use rdg_core::pool::VecPool;
use rdg_core::profiling::{profile_message, profile_scope, profile_scope_dynamic};

use crate::backend::Backend;
use crate::compiler::CompiledGraph;
use crate::error::GraphicsError;
use crate::graph::{PassContext, PassNode, RenderGraph, ResourceRegistry, ResourceState};
use crate::pool::TransientPools;

/// Summary of one executed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Passes whose callbacks ran (or would have, for passes without one).
    pub executed_passes: usize,
    /// Passes skipped by culling.
    pub culled_passes: usize,
    /// Handles bound to a physical resource during the frame.
    pub realized: usize,
    /// Physical resources returned to the pool during the frame.
    pub released: usize,
}

/// Runs compiled graphs against shared transient pools.
///
/// Keeps a scratch allocation for per-resource bookkeeping that is reused
/// from frame to frame.
#[derive(Debug, Default)]
pub struct GraphExecutor {
    remaining_uses: VecPool<u32>,
}

impl GraphExecutor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute `compiled` over `graph`.
    ///
    /// On failure, all resources realized by this frame have already been
    /// returned to `pools` when the error is returned.
    pub fn execute<B: Backend>(
        &mut self,
        graph: &mut RenderGraph,
        compiled: &CompiledGraph,
        pools: &Mutex<TransientPools<B>>,
        frame_index: u64,
    ) -> Result<ExecutionReport, GraphicsError> {
        profile_scope!("execute_graph");

        let mut remaining = self.remaining_uses.acquire();
        remaining.extend(compiled.slot_ref_counts());

        let mut report = ExecutionReport {
            culled_passes: compiled.culled_passes().count(),
            ..ExecutionReport::default()
        };

        let (passes, registry) = graph.parts_mut();
        let result = run_passes(
            passes,
            registry,
            compiled,
            pools,
            frame_index,
            &mut remaining,
            &mut report,
        );
        self.remaining_uses.release(remaining);

        match result {
            Ok(()) => {
                log::debug!(
                    "Frame {}: {} passes executed, {} culled, {} realized, {} released",
                    frame_index,
                    report.executed_passes,
                    report.culled_passes,
                    report.realized,
                    report.released
                );
                Ok(report)
            }
            Err(err) => {
                profile_message!("frame aborted");
                let reclaimed = graph
                    .registry_mut()
                    .release_all(&mut pools.lock(), frame_index);
                log::error!(
                    "Frame {} aborted after {} passes: {} ({} resources returned to pool)",
                    frame_index,
                    report.executed_passes,
                    err,
                    reclaimed
                );
                Err(err)
            }
        }
    }
}

fn run_passes<B: Backend>(
    passes: &mut [PassNode],
    registry: &mut ResourceRegistry,
    compiled: &CompiledGraph,
    pools: &Mutex<TransientPools<B>>,
    frame_index: u64,
    remaining: &mut [u32],
    report: &mut ExecutionReport,
) -> Result<(), GraphicsError> {
    let pass_count = passes.len();
    for &pass_handle in compiled.execution_order() {
        let pass = passes.get_mut(pass_handle.index()).ok_or_else(|| {
            GraphicsError::Configuration(format!(
                "compiled graph names pass {} but the graph has {} passes",
                pass_handle.index(),
                pass_count
            ))
        })?;

        for handle in pass.handles() {
            if registry.state(handle)? != ResourceState::Realized {
                let id = registry
                    .realize(handle, &mut pools.lock())
                    .inspect_err(|err| {
                        log::error!("Pass '{}' could not realize {}: {}", pass.name(), handle, err)
                    })?;
                log::trace!("Pass '{}' realized {} as {}", pass.name(), handle, id);
                report.realized += 1;
            }
        }

        if let Some(callback) = pass.take_callback() {
            profile_scope_dynamic!(pass.name());
            log::trace!("Executing pass '{}'", pass.name());
            let ctx = PassContext::new(pass, pass_handle, registry, frame_index);
            callback(&ctx).map_err(|source| GraphicsError::PassFailed {
                pass: pass.name().to_string(),
                source,
            })?;
        }
        report.executed_passes += 1;

        for handle in pass.consumed_handles() {
            if pass.creates().contains(&handle) {
                continue;
            }
            if let Some(slot) = compiled.slot_of(handle) {
                remaining[slot] = remaining[slot].saturating_sub(1);
            }
        }

        for &handle in compiled.releases_after(pass_handle) {
            if let Some(slot) = compiled.slot_of(handle)
                && remaining[slot] != 0
            {
                log::warn!(
                    "{} still has {} pending uses after pass '{}', keeping it until frame end",
                    handle,
                    remaining[slot],
                    pass.name()
                );
                continue;
            }
            if registry.release_to_pool(handle, &mut pools.lock(), frame_index)? {
                report.released += 1;
            }
        }
    }

    for &handle in compiled.deferred_releases() {
        if registry.release_to_pool(handle, &mut pools.lock(), frame_index)? {
            report.released += 1;
        }
    }

    let leftover = registry.release_all(&mut pools.lock(), frame_index);
    if leftover > 0 {
        log::warn!(
            "Frame {}: {} resources were still realized after the last pass",
            frame_index,
            leftover
        );
        report.released += leftover;
    }

    Ok(())
}

//! Transient resource pooling.
//!
//! Physical resources outlive the frame that created them. When a handle's
//! last consumer finishes, its texture or buffer goes back to a pool keyed by
//! the descriptor's structural hash, and the next request for an equivalent
//! descriptor (this frame or a later one) reuses it instead of allocating.
//!
//! # Design
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 ResourcePool<R>                         │
//! │                                                        │
//! │  buckets: HashMap<hash, Vec<(R, freed_frame)>>         │
//! │                                                        │
//! │  try_acquire(hash, desc) → Option<R>   (LIFO pop)      │
//! │  release(hash, R, frame)               (push)          │
//! │  evict_stale(frame, backend)           (age-based)     │
//! │  teardown(backend)                     (destroy all)   │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! - Removal always takes the most recently freed compatible entry.
//! - The hash is only a bucket key. Two incompatible descriptors can share a
//!   bucket after a hash collision, so acquisition confirms every candidate
//!   with [`PhysicalResource::is_compatible`].
//! - A miss is a normal outcome, never an error. [`TransientPools`] turns a
//!   miss into a fresh backend allocation.

mod transient;

pub use transient::{SharedPools, TransientPoolStats, TransientPools};

use std::collections::HashMap;

use crate::backend::Backend;
use crate::config::FrameGraphConfig;
use crate::resources::PhysicalResource;

/// A free physical resource waiting for reuse.
#[derive(Debug)]
struct PoolEntry<R> {
    resource: R,
    freed_frame: u64,
}

/// Counters describing how a [`ResourcePool`] has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Calls to [`ResourcePool::try_acquire`].
    pub acquire_attempts: u64,
    /// Acquisitions satisfied from a bucket.
    pub hits: u64,
    /// Acquisitions that found no compatible entry.
    pub misses: u64,
    /// Resources returned to the pool.
    pub releases: u64,
    /// Resources destroyed by [`ResourcePool::evict_stale`].
    pub evictions: u64,
}

/// Free list of physical resources of one kind, bucketed by descriptor hash.
#[derive(Debug)]
pub struct ResourcePool<R: PhysicalResource> {
    buckets: HashMap<u64, Vec<PoolEntry<R>>>,
    retention_frames: u64,
    initial_bucket_capacity: usize,
    stats: PoolStats,
}

impl<R: PhysicalResource> ResourcePool<R> {
    /// Create an empty pool using the retention and bucket settings of `config`.
    pub fn new(config: &FrameGraphConfig) -> Self {
        Self {
            buckets: HashMap::new(),
            retention_frames: config.retention_frames,
            initial_bucket_capacity: config.initial_bucket_capacity,
            stats: PoolStats::default(),
        }
    }

    /// Pop the most recently freed entry under `hash` compatible with `descriptor`.
    ///
    /// Returns `None` when the bucket is absent or holds nothing compatible.
    pub fn try_acquire(&mut self, hash: u64, descriptor: &R::Descriptor) -> Option<R> {
        self.stats.acquire_attempts += 1;

        let found = self.buckets.get_mut(&hash).and_then(|bucket| {
            bucket
                .iter()
                .rposition(|entry| entry.resource.is_compatible(descriptor))
                .map(|index| bucket.remove(index).resource)
        });

        match &found {
            Some(resource) => {
                self.stats.hits += 1;
                log::trace!("{:?} pool hit {} (hash {:#x})", R::KIND, resource.id(), hash);
            }
            None => self.stats.misses += 1,
        }
        found
    }

    /// Return a resource to the bucket for `hash`, tagged with `frame`.
    pub fn release(&mut self, hash: u64, resource: R, frame: u64) {
        let capacity = self.initial_bucket_capacity;
        self.stats.releases += 1;
        self.buckets
            .entry(hash)
            .or_insert_with(|| Vec::with_capacity(capacity))
            .push(PoolEntry {
                resource,
                freed_frame: frame,
            });
    }

    /// Destroy every entry freed more than `retention_frames` frames before
    /// `current_frame`. Empty buckets are dropped.
    ///
    /// Returns the number of destroyed resources. Safe to call every frame.
    pub fn evict_stale<B: Backend>(&mut self, current_frame: u64, backend: &mut B) -> usize {
        let retention = self.retention_frames;
        let mut evicted = 0;

        self.buckets.retain(|_, bucket| {
            if bucket
                .iter()
                .any(|entry| current_frame.saturating_sub(entry.freed_frame) > retention)
            {
                let entries = std::mem::take(bucket);
                let mut kept = Vec::with_capacity(entries.len());
                for entry in entries {
                    if current_frame.saturating_sub(entry.freed_frame) > retention {
                        entry.resource.destroy(backend);
                        evicted += 1;
                    } else {
                        kept.push(entry);
                    }
                }
                *bucket = kept;
            }
            !bucket.is_empty()
        });

        self.stats.evictions += evicted as u64;
        evicted
    }

    /// Destroy every pooled resource.
    ///
    /// Returns the number of destroyed resources.
    pub fn teardown<B: Backend>(&mut self, backend: &mut B) -> usize {
        let mut destroyed = 0;
        for (_, bucket) in self.buckets.drain() {
            for entry in bucket {
                entry.resource.destroy(backend);
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Number of free resources across all buckets.
    pub fn free_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of free resources under one hash.
    pub fn free_count_for(&self, hash: u64) -> usize {
        self.buckets.get(&hash).map_or(0, Vec::len)
    }

    /// Retention window this pool evicts with.
    pub fn retention_frames(&self) -> u64 {
        self.retention_frames
    }

    /// Usage counters since the pool was created.
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<R: PhysicalResource> Default for ResourcePool<R> {
    fn default() -> Self {
        Self::new(&FrameGraphConfig::default())
    }
}

static_assertions::assert_impl_all!(ResourcePool<crate::resources::Texture>: Send, Sync);

//! Object pooling utilities for allocation reuse.
//!
//! Frame-based rendering rebuilds the same bookkeeping structures every frame
//! (pass lists, handle lists, compiled graphs). This module keeps their
//! allocations alive between frames instead of freeing and reallocating them.
//!
//! - [`Pooled<T>`] holds a single value that alternates between an active
//!   state and a cleared-but-allocated state.
//! - [`ObjectPool<T>`] is a free list of cleared values handed out on demand.
//!   [`VecPool<T>`] is the scratch-array flavour used for per-frame vectors.
//!
//! Pools are explicit instances owned by whoever uses them. There is no global
//! per-type pool.
//!
//! # Example
//!
//! ```
//! use rdg_core::pool::{Poolable, Pooled};
//!
//! #[derive(Debug, Default)]
//! struct PassList {
//!     names: Vec<String>,
//! }
//!
//! impl Poolable for PassList {
//!     fn new_empty() -> Self {
//!         Self::default()
//!     }
//!     fn reset(&mut self) {
//!         self.names.clear();
//!     }
//! }
//!
//! let mut slot = Pooled::<PassList>::default();
//! slot.activate().names.push("gbuffer".to_string());
//! assert!(slot.is_active());
//!
//! slot.release();
//! assert!(slot.is_pooled());
//! assert!(slot.inner().names.is_empty());
//! assert!(slot.inner().names.capacity() >= 1);
//! ```

/// Trait for types that can be pooled and reused.
///
/// Implementors must be able to create an empty instance and clear their
/// contents while preserving allocated capacity.
pub trait Poolable {
    /// Create a new empty instance for pool initialization.
    fn new_empty() -> Self;

    /// Reset the value to an empty state, preserving allocated capacity.
    ///
    /// For example, call `Vec::clear()` rather than replacing with a new `Vec`.
    fn reset(&mut self);
}

impl<T> Poolable for Vec<T> {
    fn new_empty() -> Self {
        Vec::new()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// One value that is either in use or parked with its allocation intact.
///
/// Used for per-frame structures that are rebuilt every frame: releasing
/// resets the value instead of dropping it, and activating hands the reset
/// value back out.
#[derive(Debug)]
pub enum Pooled<T: Poolable> {
    /// In use.
    Active(T),
    /// Reset, waiting for the next [`activate`](Pooled::activate).
    Pooled(T),
}

impl<T: Poolable> Pooled<T> {
    /// Wrap a value that is already in use.
    pub fn new(value: T) -> Self {
        Self::Active(value)
    }

    /// Whether the value is in use.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Whether the value is parked.
    pub fn is_pooled(&self) -> bool {
        matches!(self, Self::Pooled(_))
    }

    /// Reset the value and park it. Parking a parked value does nothing.
    pub fn release(&mut self) {
        if let Self::Active(value) = self {
            value.reset();
            *self = match std::mem::replace(self, Self::Pooled(T::new_empty())) {
                Self::Active(value) | Self::Pooled(value) => Self::Pooled(value),
            };
        }
    }

    /// Mark the value as in use and return it.
    ///
    /// A parked value comes back empty; an active one is returned unchanged.
    pub fn activate(&mut self) -> &mut T {
        if self.is_pooled() {
            *self = match std::mem::replace(self, Self::Active(T::new_empty())) {
                Self::Active(value) | Self::Pooled(value) => Self::Active(value),
            };
        }
        self.inner_mut()
    }

    /// The value, whatever its state.
    pub fn inner(&self) -> &T {
        match self {
            Self::Active(value) | Self::Pooled(value) => value,
        }
    }

    /// The value, whatever its state.
    pub fn inner_mut(&mut self) -> &mut T {
        match self {
            Self::Active(value) | Self::Pooled(value) => value,
        }
    }
}

impl<T: Poolable> Default for Pooled<T> {
    fn default() -> Self {
        Self::Pooled(T::new_empty())
    }
}

/// Counters describing how an [`ObjectPool`] has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectPoolStats {
    /// Objects constructed because the free list was empty.
    pub created: u64,
    /// Objects handed out from the free list.
    pub reused: u64,
    /// Objects returned to the pool.
    pub released: u64,
}

/// A free list of reusable objects.
///
/// [`acquire`](Self::acquire) pops a previously released object (already
/// reset) or constructs a new one; [`release`](Self::release) resets an object
/// and keeps it for the next caller.
///
/// # Example
///
/// ```
/// use rdg_core::pool::VecPool;
///
/// let mut pool = VecPool::<u32>::new();
/// let mut list = pool.acquire();
/// list.extend([1, 2, 3]);
/// pool.release(list);
///
/// let list = pool.acquire();
/// assert!(list.is_empty());
/// assert!(list.capacity() >= 3);
/// ```
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    free: Vec<T>,
    stats: ObjectPoolStats,
}

/// Pool of reusable scratch vectors.
pub type VecPool<T> = ObjectPool<Vec<T>>;

impl<T: Poolable> ObjectPool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            free: Vec::new(),
            stats: ObjectPoolStats::default(),
        }
    }

    /// Create an empty pool with room for `capacity` free objects.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            stats: ObjectPoolStats::default(),
        }
    }

    /// Take an object from the pool, constructing one if none is free.
    pub fn acquire(&mut self) -> T {
        match self.free.pop() {
            Some(object) => {
                self.stats.reused += 1;
                object
            }
            None => {
                self.stats.created += 1;
                T::new_empty()
            }
        }
    }

    /// Reset an object and return it to the pool.
    pub fn release(&mut self, mut object: T) {
        object.reset();
        self.stats.released += 1;
        self.free.push(object);
    }

    /// Number of objects waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Usage counters since the pool was created.
    pub fn stats(&self) -> ObjectPoolStats {
        self.stats
    }

    /// Drop every retained object.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Scratch {
        slots: Vec<u32>,
    }

    impl Poolable for Scratch {
        fn new_empty() -> Self {
            Self::default()
        }
        fn reset(&mut self) {
            self.slots.clear();
        }
    }

    #[test]
    fn test_pooled_starts_parked() {
        let slot = Pooled::<Scratch>::default();
        assert!(slot.is_pooled());
        assert!(!slot.is_active());
    }

    #[test]
    fn test_pooled_release_keeps_capacity() {
        let mut slot = Pooled::new(Scratch {
            slots: (0..32).collect(),
        });
        slot.release();
        slot.release();

        assert!(slot.is_pooled());
        assert!(slot.inner().slots.is_empty());
        assert!(slot.inner().slots.capacity() >= 32);
    }

    #[test]
    fn test_pooled_activate_hands_back_same_allocation() {
        let mut slot = Pooled::new(Scratch {
            slots: vec![7; 10],
        });
        slot.release();
        let capacity = slot.inner().slots.capacity();

        let scratch = slot.activate();
        assert!(scratch.slots.is_empty());
        assert_eq!(scratch.slots.capacity(), capacity);
        scratch.slots.push(3);

        // Activating an active value leaves it alone.
        assert_eq!(slot.activate().slots, vec![3]);
    }

    #[test]
    fn test_object_pool_creates_when_empty() {
        let mut pool = ObjectPool::<Scratch>::new();
        let scratch = pool.acquire();
        assert!(scratch.slots.is_empty());
        assert_eq!(pool.stats().created, 1);
        assert_eq!(pool.stats().reused, 0);
    }

    #[test]
    fn test_object_pool_reuses_released() {
        let mut pool = ObjectPool::<Scratch>::with_capacity(2);
        let mut scratch = pool.acquire();
        scratch.slots.extend(0..16);
        pool.release(scratch);
        assert_eq!(pool.free_count(), 1);

        let scratch = pool.acquire();
        assert!(scratch.slots.is_empty());
        assert!(scratch.slots.capacity() >= 16);
        assert_eq!(pool.free_count(), 0);

        let stats = pool.stats();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.released, 1);
    }

    #[test]
    fn test_vec_pool_round_trip() {
        let mut pool = VecPool::<u64>::new();
        for i in 0..3 {
            let mut list = pool.acquire();
            list.extend((0..8).map(|j| i * 8 + j));
            assert_eq!(list.len(), 8);
            pool.release(list);
        }
        assert_eq!(pool.stats().created, 1);
        assert_eq!(pool.stats().reused, 2);
    }

    #[test]
    fn test_object_pool_clear() {
        let mut pool = VecPool::<u8>::new();
        pool.release(vec![1, 2, 3]);
        pool.release(vec![4]);
        assert_eq!(pool.free_count(), 2);
        pool.clear();
        assert_eq!(pool.free_count(), 0);
    }
}

//! Frame graph configuration.

/// Tunables for the transient resource pools.
///
/// # Example
///
/// ```
/// use rdg_graphics::FrameGraphConfig;
///
/// // Keep freed resources for two extra frames (three frames in flight).
/// let config = FrameGraphConfig::default().with_retention_frames(2);
/// assert_eq!(config.retention_frames, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGraphConfig {
    /// How many frames a freed resource may sit unused before it is destroyed.
    ///
    /// A pooled entry freed on frame `f` is evicted at frame `c` when
    /// `c - f > retention_frames`. The default of 0 keeps only resources freed
    /// during the current frame.
    pub retention_frames: u64,
    /// Initial capacity of a newly created pool bucket.
    pub initial_bucket_capacity: usize,
    /// Checked-out transient memory above which a warning is logged.
    ///
    /// Exceeding the budget never fails an allocation.
    pub transient_budget_bytes: u64,
}

impl FrameGraphConfig {
    /// Default warning threshold for checked-out transient memory (512 MiB).
    pub const DEFAULT_TRANSIENT_BUDGET_BYTES: u64 = 512 * 1024 * 1024;

    /// Set the eviction retention window in frames.
    pub fn with_retention_frames(mut self, frames: u64) -> Self {
        self.retention_frames = frames;
        self
    }

    /// Set the initial capacity of new pool buckets.
    pub fn with_initial_bucket_capacity(mut self, capacity: usize) -> Self {
        self.initial_bucket_capacity = capacity;
        self
    }

    /// Set the transient memory warning threshold.
    pub fn with_transient_budget_bytes(mut self, bytes: u64) -> Self {
        self.transient_budget_bytes = bytes;
        self
    }
}

impl Default for FrameGraphConfig {
    fn default() -> Self {
        Self {
            retention_frames: 0,
            initial_bucket_capacity: 4,
            transient_budget_bytes: Self::DEFAULT_TRANSIENT_BUDGET_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FrameGraphConfig::default();
        assert_eq!(config.retention_frames, 0);
        assert_eq!(config.initial_bucket_capacity, 4);
        assert_eq!(config.transient_budget_bytes, 512 * 1024 * 1024);
    }

    #[test]
    fn test_builders() {
        let config = FrameGraphConfig::default()
            .with_retention_frames(3)
            .with_initial_bucket_capacity(1)
            .with_transient_budget_bytes(1024);
        assert_eq!(config.retention_frames, 3);
        assert_eq!(config.initial_bucket_capacity, 1);
        assert_eq!(config.transient_budget_bytes, 1024);
    }
}

//! Graphics error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::graph::ResourceHandle;

/// Error type returned by pass callbacks.
///
/// Callbacks may fail with any error; [`GraphicsError`] converts into it, so
/// `ctx.texture(handle)?` works inside a callback.
pub type PassError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while recording, compiling or executing a frame.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// The graph was declared incorrectly, e.g. a pass used an undeclared handle.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A handle that this graph never issued (or the null handle) was used.
    #[error("invalid resource handle {0}")]
    InvalidHandle(ResourceHandle),
    /// A resource was accessed before the executor realized it.
    #[error("resource {name} ({handle}) was used before it was realized")]
    UnrealizedResource {
        /// The offending handle.
        handle: ResourceHandle,
        /// The resource label, or `<unnamed>`.
        name: String,
    },
    /// A resource was accessed after its physical backing went back to the pool.
    #[error("resource {name} ({handle}) was used after it was released")]
    UseAfterRelease {
        /// The offending handle.
        handle: ResourceHandle,
        /// The resource label, or `<unnamed>`.
        name: String,
    },
    /// A pass callback returned an error. The frame was aborted.
    #[error("pass '{pass}' failed: {source}")]
    PassFailed {
        /// Name of the failing pass.
        pass: String,
        /// The callback's error.
        #[source]
        source: PassError,
    },
    /// The backend failed to allocate a resource.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// A recording operation was called outside `begin_frame`/`end_frame`.
    #[error("no frame is being recorded")]
    NotRecording,
    /// `begin_frame` was called while a frame is still being recorded.
    #[error("frame {0} is still being recorded")]
    FrameInProgress(u64),
}

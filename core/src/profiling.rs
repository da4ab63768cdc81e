//! Tracy instrumentation for the render graph.
//!
//! Built with the `profiling` feature, these macros emit
//! [Tracy](https://github.com/wolfpld/tracy) zones, plots and messages.
//! Without it they expand to nothing (or to a discarded evaluation of their
//! arguments), so call sites never need their own `cfg`.
//!
//! ```toml
//! [dependencies]
//! rdg-core = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! ```ignore
//! use rdg_core::profiling::{frame_mark, profile_plot, profile_scope, profile_scope_dynamic};
//!
//! fn run_pass(name: &str, free_textures: usize) {
//!     profile_scope!("execute_graph");
//!     profile_scope_dynamic!(name);
//!     profile_plot!("rdg free textures", free_textures);
//!     frame_mark!();
//! }
//! ```

#[cfg(feature = "profiling")]
pub use tracy_client::{
    self, Client, Span, frame_mark as tracy_frame_mark, plot as tracy_plot, span,
};

/// End the current frame in Tracy's frame view.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! frame_mark {
    () => {
        $crate::profiling::tracy_frame_mark()
    };
}

/// End the current frame (disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! frame_mark {
    () => {};
}

/// Open a zone with a static name that closes at the end of the scope.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _rdg_zone = $crate::profiling::span!($name);
    };
}

/// Open a zone with a static name (disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Open a zone named after the enclosing function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _rdg_zone = $crate::profiling::span!();
    };
}

/// Open a zone named after the enclosing function (disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Record a sample on a named Tracy plot.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Record a plot sample (disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

/// Append a line to Tracy's message log.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_message {
    ($msg:expr) => {
        if let Some(client) = $crate::profiling::Client::running() {
            client.message($msg, 0);
        }
    };
}

/// Append a log message (disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_message {
    ($msg:expr) => {
        let _ = $msg;
    };
}

/// Open a zone whose name is only known at runtime, such as a pass name.
///
/// Tracy copies the name, so prefer [`profile_scope!`] when it is static.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope_dynamic {
    ($name:expr) => {
        let _rdg_zone = $crate::profiling::Client::running()
            .map(|client| client.span_alloc(Some($name), "", file!(), line!(), 0));
    };
}

/// Open a runtime-named zone (disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope_dynamic {
    ($name:expr) => {
        let _ = $name;
    };
}

pub use frame_mark;
pub use profile_function;
pub use profile_message;
pub use profile_plot;
pub use profile_scope;
pub use profile_scope_dynamic;

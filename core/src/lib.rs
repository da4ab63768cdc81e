//! # rdg core
//!
//! Basic utilities shared by the render graph crates: allocation reuse
//! ([`pool`]), deterministic structural hashing ([`hash`]) and optional Tracy
//! instrumentation ([`profiling`]).

pub mod hash;
pub mod pool;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core library version.
pub fn init() {
    log::info!("rdg core v{} initialized", VERSION);
}

//! Rallycast Common Utilities
//!
//! Shared infrastructure for all Rallycast crates:
//! - Error types and result aliases
//! - Frame clock for converting between frame indices and seconds
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;

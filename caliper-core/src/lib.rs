//! Shared primitives for the Caliper classifier-evaluation toolkit.
//!
//! `caliper-core` provides the foundation the metric crates build on:
//!
//! - **Error types** — [`CaliperError`] and [`Result`] for structured error handling
//! - **Traits** — [`Summarizable`] for one-line displays of computed results

pub mod error;
pub mod traits;

pub use error::{CaliperError, Result};
pub use traits::*;

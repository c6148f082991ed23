//! A probabilistic inference engine for modeling lymphatic tumor spread.
//!
//! This crate re-exports the `lymph-*` family: the dense tensor primitives,
//! the shared error type, and the graph/matrix/model layers that make up the
//! inference engine itself.

pub use lymph_core::*;
pub use lymph_error::*;
pub use lymph_tensor::*;

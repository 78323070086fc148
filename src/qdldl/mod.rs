//! Sparse $LDL^T$ factorization for quasidefinite matrices.
//!
//! A native implementation of the QDLDL algorithm with AMD fill
//! reducing ordering.   Used as the direct linear system backend and
//! for solution polishing.

#![allow(clippy::module_inception)]
mod qdldl;
pub use qdldl::*;

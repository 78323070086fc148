//! Linear algebra types and operations used by the solver.
//!
//! Sparse matrices are stored in compressed sparse column format
//! ([`CscMatrix`]).   Vector operations are provided as traits on slices
//! of [`FloatT`] so that solver internals can operate on borrowed data
//! without copying.

#![allow(non_snake_case)]

mod csc;
mod error_types;
mod floats;
mod math_traits;
mod matrix_traits;
mod matrix_types;
mod scalarmath;
mod vecmath;

pub use csc::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_traits::*;
pub use matrix_types::*;

#[cfg(test)]
mod tests;

//! Linear system backends for the ADMM x-update.
//!
//! Each iteration solves the quasidefinite system
//!
//! ```text
//! [P + σI      A'  ] [x] = [rhs_x]
//! [  A    -diag(1/ρ)] [ν]   [rhs_z]
//! ```
//!
//! with P upper triangular.  Backends are held as boxed trait objects
//! and created through the [`RuntimeContext`](crate::solver::runtime::RuntimeContext)
//! backend registry.

use super::errors::LinsysError;
use crate::algebra::*;

pub(crate) mod direct;
#[cfg(feature = "indirect")]
pub(crate) mod indirect;

pub(crate) trait KKTSolver<T: FloatT>: Send {
    /// Solves the KKT system, writing `[x; ν]` into `lhs`.  `rhs` is
    /// not modified.
    fn solve(&mut self, lhs: &mut [T], rhs: &[T]);

    /// Loads new values of P and A.  The index lists give the positions
    /// in `nzval` that changed, with `None` meaning every entry.  On
    /// failure the previous values are restored before returning.
    fn update_matrices(
        &mut self,
        P: &CscMatrix<T>,
        Pidx: Option<&[usize]>,
        A: &CscMatrix<T>,
        Aidx: Option<&[usize]>,
    ) -> Result<(), LinsysError>;

    /// Replaces the penalty vector ρ.  On failure the previous values
    /// are restored before returning.
    fn update_rho_vec(&mut self, rho_vec: &[T]) -> Result<(), LinsysError>;

    fn name(&self) -> &'static str;
}

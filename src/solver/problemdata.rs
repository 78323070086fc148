#![allow(non_snake_case)]
use super::equilibration::Scaling;
use super::errors::DataValidationError;
use super::utils::infbounds::get_infinity;
use crate::algebra::*;
use std::iter::zip;

/// Problem data as last supplied by the user, in canonical storage:
/// `P` upper triangular and both matrices with sorted columns.
#[derive(Debug, Clone)]
pub(crate) struct UnscaledData<T> {
    pub P: CscMatrix<T>,
    pub A: CscMatrix<T>,
    pub q: Vec<T>,
    pub l: Vec<T>,
    pub u: Vec<T>,
}

/// Scaled problem data used by the iteration, together with the
/// unscaled originals retained for partial updates.
#[derive(Debug, Clone)]
pub(crate) struct ProblemData<T> {
    pub n: usize,
    pub m: usize,
    pub P: CscMatrix<T>,
    pub A: CscMatrix<T>,
    pub q: Vec<T>,
    pub l: Vec<T>,
    pub u: Vec<T>,
    pub scaling: Scaling<T>,
    pub orig: UnscaledData<T>,
}

impl<T> ProblemData<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        q: &[T],
        l: &[T],
        u: &[T],
        scaling_passes: u32,
    ) -> Result<Self, DataValidationError> {
        check_problem_data(P, A, q, l, u)?;

        let (m, n) = A.size();

        // upper triangular P with sorted columns, and sorted A
        let P = if P.is_triu() { P.sorted() } else { P.to_triu().sorted() };
        let A = A.sorted();

        let mut l = l.to_vec();
        let mut u = u.to_vec();
        clip_bounds(&mut l, &mut u);

        let orig = UnscaledData {
            P: P.clone(),
            A: A.clone(),
            q: q.to_vec(),
            l: l.clone(),
            u: u.clone(),
        };

        let mut data = Self {
            n,
            m,
            P,
            A,
            q: q.to_vec(),
            l,
            u,
            scaling: Scaling::new(n, m),
            orig,
        };
        data.rescale(scaling_passes);

        Ok(data)
    }

    /// Recomputes the scaled data from the unscaled originals, including
    /// a fresh equilibration.
    pub fn rescale(&mut self, scaling_passes: u32) {
        self.P.nzval.copy_from(&self.orig.P.nzval);
        self.A.nzval.copy_from(&self.orig.A.nzval);
        self.q.copy_from(&self.orig.q);
        self.l.copy_from(&self.orig.l);
        self.u.copy_from(&self.orig.u);

        self.scaling.equilibrate(
            &mut self.P,
            &mut self.A,
            &mut self.q,
            &mut self.l,
            &mut self.u,
            scaling_passes,
        );
    }

    /// Replaces the linear cost, scaling it with the existing factors.
    pub fn set_lin_cost(&mut self, q: &[T]) {
        self.orig.q.copy_from(q);
        self.q.copy_from(q).hadamard(&self.scaling.d).scale(self.scaling.c);
    }

    /// Replaces the bounds, scaling them with the existing factors.  The
    /// bounds should already be validated and clipped.
    pub fn set_bounds(&mut self, l: &[T], u: &[T]) {
        self.orig.l.copy_from(l);
        self.orig.u.copy_from(u);
        self.l.copy_from(l).hadamard(&self.scaling.e);
        self.u.copy_from(u).hadamard(&self.scaling.e);
    }

    /// Objective value of the scaled iterate x̃ in unscaled terms
    pub fn objective(&self, x: &[T]) -> T {
        let half: T = (0.5).as_T();
        (half * self.P.quad_form(x, x) + self.q.dot(x)) * self.scaling.cinv
    }
}

// ---------------------------------------------------------
// validation of user data
// ---------------------------------------------------------

fn check_problem_data<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    q: &[T],
    l: &[T],
    u: &[T],
) -> Result<(), DataValidationError> {
    P.check_format().map_err(DataValidationError::sparse("P"))?;
    A.check_format().map_err(DataValidationError::sparse("A"))?;

    let n = P.ncols();
    if n == 0 {
        return Err(DataValidationError::EmptyProblem);
    }
    if !P.is_square() {
        return Err(DataValidationError::IncompatibleDimension("P"));
    }
    if A.ncols() != n {
        return Err(DataValidationError::IncompatibleDimension("A"));
    }
    if q.len() != n {
        return Err(DataValidationError::IncompatibleDimension("q"));
    }
    if !P.nzval.is_finite() {
        return Err(DataValidationError::NotFinite("P"));
    }
    if !A.nzval.is_finite() {
        return Err(DataValidationError::NotFinite("A"));
    }
    if !q.is_finite() {
        return Err(DataValidationError::NotFinite("q"));
    }
    check_bounds(l, u, A.nrows())
}

/// Bounds must match the constraint count, contain no NaNs and satisfy
/// `l ≤ u`.  Infinite values are allowed.
pub(crate) fn check_bounds<T: FloatT>(l: &[T], u: &[T], m: usize) -> Result<(), DataValidationError> {
    if l.len() != m {
        return Err(DataValidationError::IncompatibleDimension("l"));
    }
    if u.len() != m {
        return Err(DataValidationError::IncompatibleDimension("u"));
    }
    if l.iter().any(|v| v.is_nan()) {
        return Err(DataValidationError::NotFinite("l"));
    }
    if u.iter().any(|v| v.is_nan()) {
        return Err(DataValidationError::NotFinite("u"));
    }
    match zip(l, u).position(|(l, u)| l > u) {
        Some(row) => Err(DataValidationError::InfeasibleBounds(row)),
        None => Ok(()),
    }
}

/// Limits bounds to ±infinity.
pub(crate) fn clip_bounds<T: FloatT>(l: &mut [T], u: &mut [T]) {
    let inf: T = get_infinity().as_T();
    l.scalarop(|v| T::max(v, -inf));
    u.scalarop(|v| T::min(v, inf));
}

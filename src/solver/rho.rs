use super::equilibration::MIN_SCALING;
use super::utils::infbounds::get_infinity;
use super::utils::try_alloc_vec;
use crate::algebra::*;
use itertools::izip;
use std::collections::TryReserveError;

pub(crate) const RHO_MIN: f64 = 1e-6;
pub(crate) const RHO_MAX: f64 = 1e6;
// penalty multiplier for equality rows
pub(crate) const RHO_EQ_OVER_RHO_INEQ: f64 = 1e3;
// rows with |u - l| below this are treated as equalities
pub(crate) const RHO_TOL: f64 = 1e-4;
pub(crate) const DIVISION_TOL: f64 = 1e-20;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum ConstraintType {
    /// both bounds infinite
    Loose,
    Inequality,
    Equality,
}

/// Per-row penalty parameters derived from a scalar rho and the
/// classification of each constraint row.
#[derive(Debug, Clone)]
pub(crate) struct RhoVector<T> {
    pub rho: T,
    pub types: Vec<ConstraintType>,
    pub rho_vec: Vec<T>,
    pub rho_inv_vec: Vec<T>,
}

impl<T> RhoVector<T>
where
    T: FloatT,
{
    /// Classifies constraints from the (scaled) bounds and sets the
    /// penalty for each row.
    pub fn new(l: &[T], u: &[T], rho: T) -> Result<Self, TryReserveError> {
        let m = l.len();
        let mut out = Self {
            rho,
            types: try_alloc_vec(ConstraintType::Inequality, m)?,
            rho_vec: try_alloc_vec(T::zero(), m)?,
            rho_inv_vec: try_alloc_vec(T::zero(), m)?,
        };
        out.classify(l, u);
        out.refresh();
        Ok(out)
    }

    /// Reclassifies rows after a bound change.  Returns true if any row
    /// changed type, in which case the penalty vectors are recomputed.
    pub fn classify(&mut self, l: &[T], u: &[T]) -> bool {
        // bounds arrive scaled, so infinity may have shrunk by up to
        // the minimum scaling factor
        let inf: T = (get_infinity() * MIN_SCALING).as_T();
        let rho_tol: T = RHO_TOL.as_T();
        let mut changed = false;

        for (t, &l, &u) in izip!(&mut self.types, l, u) {
            let newtype = if l < -inf && u > inf {
                ConstraintType::Loose
            } else if u - l < rho_tol {
                ConstraintType::Equality
            } else {
                ConstraintType::Inequality
            };
            changed |= *t != newtype;
            *t = newtype;
        }
        if changed {
            self.refresh();
        }
        changed
    }

    /// Sets a new scalar rho and recomputes the penalty vectors
    pub fn set_rho(&mut self, rho: T) {
        self.rho = rho;
        self.refresh();
    }

    fn refresh(&mut self) {
        let rho = self.rho;
        let rho_min: T = RHO_MIN.as_T();
        let rho_eq: T = RHO_EQ_OVER_RHO_INEQ.as_T();

        for (t, r, rinv) in izip!(&self.types, &mut self.rho_vec, &mut self.rho_inv_vec) {
            *r = match t {
                ConstraintType::Loose => rho_min,
                ConstraintType::Inequality => rho,
                ConstraintType::Equality => rho_eq * rho,
            };
            *rinv = T::recip(*r);
        }
    }
}

/// Adaptive rho estimate from scaled residual norms.
///
/// `prim` and `dual` are the scaled residuals, normalized by the scale of
/// the terms that make up each residual.  The result is clamped to
/// `[RHO_MIN, RHO_MAX]`.
pub(crate) fn rho_estimate<T: FloatT>(rho: T, prim: T, dual: T) -> T {
    let tol: T = DIVISION_TOL.as_T();
    let estimate = rho * T::sqrt(prim / (dual + tol));
    estimate.clamp_to(RHO_MIN.as_T(), RHO_MAX.as_T())
}

use super::problemdata::ProblemData;
use super::status::SolverStatus;
use super::utils::try_alloc_vec;
use super::variables::Variables;
use crate::algebra::*;
use std::collections::TryReserveError;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Solution returned by [`Workspace::solve`](crate::solver::Workspace::solve),
/// in the units of the original problem.
///
/// When the problem is infeasible `x`, `y` and `z` are filled with NaN and
/// the matching certificate holds a normalized infeasibility direction.
/// Certificates that do not apply are NaN.

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Solution<T> {
    /// primal solution
    pub x: Vec<T>,
    /// constraint multipliers
    pub y: Vec<T>,
    /// constraint values Ax
    pub z: Vec<T>,
    /// certificate of primal infeasibility (a multiplier direction)
    pub prim_inf_cert: Vec<T>,
    /// certificate of dual infeasibility (an unbounded primal direction)
    pub dual_inf_cert: Vec<T>,
    /// final solver status
    pub status: SolverStatus,
    /// objective value, ±∞ for infeasible problems
    pub obj_val: T,
    /// number of iterations
    pub iterations: u32,
}

impl<T> Solution<T>
where
    T: FloatT,
{
    pub(crate) fn new(n: usize, m: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            x: try_alloc_vec(T::nan(), n)?,
            y: try_alloc_vec(T::nan(), m)?,
            z: try_alloc_vec(T::nan(), m)?,
            prim_inf_cert: try_alloc_vec(T::nan(), m)?,
            dual_inf_cert: try_alloc_vec(T::nan(), n)?,
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            iterations: 0,
        })
    }

    /// Fills the solution from the final scaled iterate.  For infeasible
    /// statuses the certificates are taken from the normalized iterate
    /// differences held in `variables`.
    pub(crate) fn post_process(
        &mut self,
        data: &ProblemData<T>,
        variables: &Variables<T>,
        status: SolverStatus,
        obj_val: T,
        iterations: u32,
    ) {
        let sc = &data.scaling;

        self.status = status;
        self.obj_val = obj_val;
        self.iterations = iterations;
        self.prim_inf_cert.set(T::nan());
        self.dual_inf_cert.set(T::nan());

        match status {
            SolverStatus::PrimalInfeasible => {
                self.x.set(T::nan());
                self.y.set(T::nan());
                self.z.set(T::nan());
                self.prim_inf_cert.copy_from(&variables.delta_y);
            }
            SolverStatus::DualInfeasible => {
                self.x.set(T::nan());
                self.y.set(T::nan());
                self.z.set(T::nan());
                self.dual_inf_cert.copy_from(&variables.delta_x);
            }
            _ => {
                sc.unscale_x(&mut self.x, &variables.x);
                sc.unscale_y(&mut self.y, &variables.y);
                sc.unscale_z(&mut self.z, &variables.z);
            }
        }
    }
}

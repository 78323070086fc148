use super::status::{PolishStatus, SolverStatus};
use crate::algebra::*;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Summary of the most recent solve.
///
/// Times are in seconds.  `run_time` is the total of the setup or update
/// time that preceded the solve, the solve time and the polish time.

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct SolveInfo<T> {
    pub status: SolverStatus,
    pub iterations: u32,
    pub obj_val: T,
    pub prim_res: T,
    pub dual_res: T,
    /// number of refactorizations triggered by adaptive rho
    pub rho_updates: u32,
    /// most recent rho estimate
    pub rho_estimate: T,
    pub polish_status: PolishStatus,

    pub setup_time: f64,
    pub update_time: f64,
    pub solve_time: f64,
    pub polish_time: f64,
    pub run_time: f64,
}

impl<T> SolveInfo<T>
where
    T: FloatT,
{
    pub(crate) fn new(rho: T) -> Self {
        Self {
            status: SolverStatus::Unsolved,
            iterations: 0,
            obj_val: T::nan(),
            prim_res: T::nan(),
            dual_res: T::nan(),
            rho_updates: 0,
            rho_estimate: rho,
            polish_status: PolishStatus::NotRun,
            setup_time: 0.,
            update_time: 0.,
            solve_time: 0.,
            polish_time: 0.,
            run_time: 0.,
        }
    }

    // clears the per-solve fields ahead of a new solve
    pub(crate) fn reset(&mut self) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.obj_val = T::nan();
        self.prim_res = T::nan();
        self.dual_res = T::nan();
        self.rho_updates = 0;
        self.polish_status = PolishStatus::NotRun;
        self.solve_time = 0.;
        self.polish_time = 0.;
        self.run_time = 0.;
    }
}

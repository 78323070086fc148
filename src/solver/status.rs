#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver terminated with a solution.
    Solved,
    /// Problem is primal infeasible.  A certificate of primal infeasibility is returned.
    PrimalInfeasible,
    /// Problem is dual infeasible.  A certificate of dual infeasibility is returned.
    DualInfeasible,
    /// Iteration limit reached before solution or infeasibility certificate found.
    MaxIterations,
    /// Time limit reached before solution or infeasibility certificate found.
    MaxTime,
}

impl SolverStatus {
    pub(crate) fn is_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::PrimalInfeasible | SolverStatus::DualInfeasible
        )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of the solution polishing step

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PolishStatus {
    /// Polishing disabled, or the solver did not reach `Solved`
    #[default]
    NotRun,
    /// The polished iterate was accepted
    Succeeded,
    /// The reduced system could not be solved or did not improve the iterate
    Failed,
}

impl std::fmt::Display for PolishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Lifecycle state of a [`Workspace`](crate::solver::Workspace).
///
/// A workspace comes into existence `Ready`.  Each solve passes through
/// `Running` and leaves the workspace `Terminated` with the final status,
/// from which further updates and solves are allowed.  `Cleaned` is final.

#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum WorkspaceState {
    Ready,
    Running,
    Terminated(SolverStatus),
    Cleaned,
}

impl std::fmt::Display for WorkspaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WorkspaceState::Terminated(status) => write!(f, "Terminated({status})"),
            _ => write!(f, "{:?}", self),
        }
    }
}

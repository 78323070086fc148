//! splitqp solver main module.
//!
//! The user facing type is [`Workspace`], created from problem data and
//! [`Settings`] by [`Workspace::setup`].  A workspace owns the scaled
//! problem data, the ADMM iterates and a factored KKT system, and can be
//! updated and re-solved repeatedly.
//!
//! Results are returned as a [`Solution`] with a [`SolverStatus`], and a
//! summary of each solve is available as [`SolveInfo`].  Failures at the
//! API boundary are reported as [`SolverError`].

pub(crate) const _INFINITY_DEFAULT: f64 = 1e30;

// internal module structure
mod admm;
mod data_updating;
mod engine;
mod equilibration;
mod errors;
mod info;
mod info_print;
mod kktsolvers;
mod polish;
mod problemdata;
mod residuals;
mod rho;
pub mod runtime;
mod settings;
mod solution;
mod status;
pub(crate) mod utils;
mod variables;
mod workspace;

pub use crate::solver::utils::infbounds::*;

pub use equilibration::Scaling;
pub use errors::*;
pub use info::SolveInfo;
pub use runtime::RuntimeContext;
pub use settings::*;
pub use solution::Solution;
pub use status::*;
pub use workspace::*;

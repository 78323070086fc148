//! Process-wide runtime context.
//!
//! The context is created by the first call to
//! [`Workspace::setup`](crate::solver::Workspace::setup) and shared by all
//! live workspaces through an `Arc`.  It is released when the last
//! workspace holding it is cleaned up or dropped, and rebuilt on demand.

#![allow(non_snake_case)]

use super::errors::LinsysError;
use super::kktsolvers::direct::DirectLDLSolver;
use super::kktsolvers::KKTSolver;
use super::settings::{LinsysSolver, Settings};
use crate::algebra::*;
use lazy_static::lazy_static;
use std::sync::{Arc, Mutex, PoisonError, Weak};

lazy_static! {
    static ref RUNTIME: Mutex<Weak<RuntimeContext>> = Mutex::new(Weak::new());
}

/// Shared, read-only state for all workspaces in the process
#[derive(Debug)]
pub struct RuntimeContext {
    backends: Vec<LinsysSolver>,
}

impl RuntimeContext {
    fn new() -> Self {
        let mut backends = vec![LinsysSolver::Direct];
        cfg_if::cfg_if! {
            if #[cfg(feature = "indirect")] {
                backends.push(LinsysSolver::Indirect);
            }
        }
        log::info!(
            "runtime context created with backends {:?}",
            backends.iter().map(|b| b.as_str()).collect::<Vec<_>>()
        );
        Self { backends }
    }

    /// Returns the live context, creating it if no workspace holds one
    pub fn acquire() -> Arc<RuntimeContext> {
        let mut guard = RUNTIME.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.upgrade() {
            Some(ctx) => ctx,
            None => {
                let ctx = Arc::new(RuntimeContext::new());
                *guard = Arc::downgrade(&ctx);
                ctx
            }
        }
    }

    /// Number of handles to the live context, or 0 if there is none
    pub fn active_count() -> usize {
        let guard = RUNTIME.lock().unwrap_or_else(PoisonError::into_inner);
        guard.strong_count()
    }

    pub fn is_available(&self, backend: LinsysSolver) -> bool {
        self.backends.contains(&backend)
    }

    pub fn backends(&self) -> &[LinsysSolver] {
        &self.backends
    }

    /// Builds the linear system backend selected in the settings
    pub(crate) fn load_kkt_solver<T: FloatT>(
        &self,
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        rho_vec: &[T],
        settings: &Settings<T>,
    ) -> Result<Box<dyn KKTSolver<T>>, LinsysError> {
        let backend = settings.linsys_solver;
        if !self.is_available(backend) {
            return Err(LinsysError::Unavailable(backend.as_str()));
        }

        let solver: Box<dyn KKTSolver<T>> = match backend {
            LinsysSolver::Direct => Box::new(DirectLDLSolver::new(P, A, settings.sigma, rho_vec)?),
            LinsysSolver::Indirect => {
                cfg_if::cfg_if! {
                    if #[cfg(feature = "indirect")] {
                        Box::new(super::kktsolvers::indirect::IndirectPCGSolver::new(
                            P,
                            A,
                            settings.sigma,
                            rho_vec,
                            settings.cg_max_iter,
                            settings.cg_tol,
                        )?)
                    } else {
                        return Err(LinsysError::Unavailable(backend.as_str()));
                    }
                }
            }
        };
        Ok(solver)
    }
}

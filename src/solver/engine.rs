#![allow(non_snake_case)]

use super::errors::SolverError;
use super::info::SolveInfo;
use super::kktsolvers::KKTSolver;
use super::problemdata::ProblemData;
use super::residuals::Residuals;
use super::rho::RhoVector;
use super::runtime::RuntimeContext;
use super::settings::Settings;
use super::solution::Solution;
use super::status::WorkspaceState;
use super::variables::Variables;
use crate::algebra::*;
use crate::timers::*;
use std::sync::Arc;

/// Everything a live workspace owns.  A cleaned up workspace drops its
/// engine, releasing all buffers and the handle on the runtime context.
pub(crate) struct Engine<T: FloatT> {
    pub settings: Settings<T>,
    pub data: ProblemData<T>,
    pub variables: Variables<T>,
    pub residuals: Residuals<T>,
    pub rho: RhoVector<T>,
    pub kkt: Box<dyn KKTSolver<T>>,
    pub info: SolveInfo<T>,
    pub solution: Solution<T>,
    pub timers: Timers,
    pub state: WorkspaceState,

    // iterate supplied through Workspace::warm_start, used by the next
    // solve even when warm starting is disabled
    pub warm_start_pending: bool,

    // set by a solve that ends Solved, cleared by any change to the data
    // or the starting iterate
    pub unchanged_since_solved: bool,

    // setup and update time not yet attributed to a solve
    pub pending_setup_time: f64,
    pub pending_update_time: f64,

    _runtime: Arc<RuntimeContext>,
}

impl<T> Engine<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        q: &[T],
        l: &[T],
        u: &[T],
        settings: Settings<T>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;

        let mut timers = Timers::default();
        timers.reset_timer("setup");

        timeit! {timers => "setup";
            let data = ProblemData::new(P, A, q, l, u, settings.scaling)?;
            let (n, m) = (data.n, data.m);

            let variables = Variables::new(n, m)?;
            let residuals = Residuals::new(n, m)?;
            let rho = RhoVector::new(&data.l, &data.u, settings.rho)?;
            let solution = Solution::new(n, m)?;

            let runtime = RuntimeContext::acquire();
            let kkt = runtime.load_kkt_solver(&data.P, &data.A, &rho.rho_vec, &settings)?;
        }

        let setup_time = timers.elapsed("setup").as_secs_f64();
        let mut info = SolveInfo::new(settings.rho);
        info.setup_time = setup_time;

        log::info!(
            "setup complete: n = {}, m = {}, nnz(P) = {}, nnz(A) = {}, backend = {}, {:.3e}s",
            n,
            m,
            data.P.nnz(),
            data.A.nnz(),
            kkt.name(),
            setup_time
        );

        Ok(Self {
            settings,
            data,
            variables,
            residuals,
            rho,
            kkt,
            info,
            solution,
            timers,
            state: WorkspaceState::Ready,
            warm_start_pending: false,
            unchanged_since_solved: false,
            pending_setup_time: setup_time,
            pending_update_time: 0.,
            _runtime: runtime,
        })
    }

    /// Zeros the iterates and returns rho to its initial value
    pub fn cold_start(&mut self) -> Result<(), SolverError> {
        self.variables.cold_start();

        if self.rho.rho != self.settings.rho {
            let old = self.rho.rho;
            self.rho.set_rho(self.settings.rho);
            if let Err(e) = self.kkt.update_rho_vec(&self.rho.rho_vec) {
                self.rho.set_rho(old);
                return Err(e.into());
            }
            log::debug!("rho reset to {:e}", self.settings.rho);
        }
        Ok(())
    }

    /// Sets the starting iterate from unscaled primal and dual values
    pub fn warm_start(&mut self, x: Option<&[T]>, y: Option<&[T]>) {
        let sc = &self.data.scaling;
        let v = &mut self.variables;

        if let Some(x) = x {
            sc.scale_x(&mut v.x, x);
            self.data.A.gemv(&mut v.z, &v.x, T::one(), T::zero());
        }
        if let Some(y) = y {
            sc.scale_y(&mut v.y, y);
        }
        self.warm_start_pending = true;
        self.unchanged_since_solved = false;
    }

    // records time spent in an update for the next solve
    pub fn add_update_time(&mut self, key: &'static str) {
        let t = self.timers.elapsed(key).as_secs_f64();
        self.pending_update_time += t;
        log::debug!("{} took {:.3e}s", key, t);
    }
}

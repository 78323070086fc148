#![allow(non_snake_case)]

use super::engine::Engine;
use super::errors::SolverError;
use super::info_print;
use super::rho::rho_estimate;
use super::status::{SolverStatus, WorkspaceState};
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::timers::*;
use itertools::izip;
use std::time::Duration;

// iterations between lines of the verbose iteration table
const PRINT_INTERVAL: u32 = 200;

impl<T> Engine<T>
where
    T: FloatT,
{
    /// Runs ADMM iterations until termination, then polishes and writes
    /// the unscaled solution.  A workspace that is still Solved with
    /// nothing changed since keeps its solution.
    pub fn solve(&mut self, out: &mut PrintTarget) -> Result<(), SolverError> {
        if self.unchanged_since_solved {
            log::info!("nothing changed since the last solve, keeping its solution");
            self.reuse_solution();
            return Ok(());
        }

        self.state = WorkspaceState::Running;
        self.info.reset();
        self.timers.reset_timer("solve");
        self.timers.reset_timer("polish");

        log::info!("solve started");

        timeit! {self.timers => "solve";
            if !self.settings.warm_start && !self.warm_start_pending {
                self.cold_start()?;
            }
            self.warm_start_pending = false;

            if self.settings.verbose {
                let printed = info_print::print_configuration(out, &self.settings, &self.data, self.kkt.name())
                    .and_then(|_| info_print::print_status_header(out));
                _log_print_error(printed);
            }

            let (status, iterations) = self.iterate(out);
        }

        if status == SolverStatus::Solved && self.settings.polish {
            timeit! {self.timers => "polish";
                self.info.polish_status = self.polish();
            }
        }

        // objective and certificates
        let obj_val = match status {
            SolverStatus::PrimalInfeasible => {
                _normalize_certificate(&mut self.variables.delta_y, &self.data.scaling.e);
                T::infinity()
            }
            SolverStatus::DualInfeasible => {
                _normalize_certificate(&mut self.variables.delta_x, &self.data.scaling.d);
                T::neg_infinity()
            }
            _ => self.data.objective(&self.variables.x),
        };

        self.solution.post_process(
            &self.data,
            &self.variables,
            status,
            obj_val,
            iterations,
        );

        if status.is_infeasible() {
            self.variables.cold_start();
        }

        let info = &mut self.info;
        info.status = status;
        info.iterations = iterations;
        info.obj_val = obj_val;
        info.prim_res = self.residuals.prim_res;
        info.dual_res = self.residuals.dual_res;
        info.solve_time = self.timers.elapsed("solve").as_secs_f64();
        info.polish_time = self.timers.elapsed("polish").as_secs_f64();
        info.update_time = self.pending_update_time;
        info.run_time =
            self.pending_setup_time + self.pending_update_time + info.solve_time + info.polish_time;
        self.pending_setup_time = 0.;
        self.pending_update_time = 0.;

        if self.settings.verbose {
            _log_print_error(info_print::print_footer(out, info));
        }

        log::info!(
            "solve finished: status = {}, iterations = {}, objective = {:e}, {:.3e}s",
            status,
            iterations,
            obj_val,
            info.run_time
        );

        self.state = WorkspaceState::Terminated(status);
        self.unchanged_since_solved = status == SolverStatus::Solved;
        Ok(())
    }

    // the stored solution and info stand, with no time spent
    fn reuse_solution(&mut self) {
        let info = &mut self.info;
        info.update_time = 0.;
        info.solve_time = 0.;
        info.polish_time = 0.;
        info.run_time = 0.;
        self.state = WorkspaceState::Terminated(SolverStatus::Solved);
    }

    // main loop.  Returns the final status and iteration count.
    fn iterate(&mut self, out: &mut PrintTarget) -> (SolverStatus, u32) {
        let settings = &self.settings;
        let check_every = settings.check_termination;
        let adapt_every = match (settings.adaptive_rho_interval, check_every) {
            (k, _) if k > 0 => k,
            (_, c) if c > 0 => 5 * c,
            _ => 100,
        };
        let time_limit = settings.time_limit;
        let max_iter = settings.max_iter;

        let mut status = SolverStatus::Unsolved;
        let mut iter = 0;
        let mut checked_last = false;

        while iter < max_iter {
            iter += 1;
            self.admm_step();

            let mut computed = false;
            checked_last = check_every > 0 && iter % check_every == 0;

            if checked_last {
                status = self.check_termination(iter);
                computed = true;
            }

            if self.settings.verbose && (iter == 1 || iter % PRINT_INTERVAL == 0 || status != SolverStatus::Unsolved) {
                if !computed {
                    self.update_residuals();
                    computed = true;
                }
                self.print_iteration(out, iter);
            }

            if status != SolverStatus::Unsolved {
                break;
            }

            if self.settings.adaptive_rho && iter % adapt_every == 0 {
                if !computed {
                    self.update_residuals();
                }
                self.adapt_rho();
            }

            // time is checked at the termination check cadence
            if time_limit > 0.0 && (check_every == 0 || checked_last) {
                let elapsed = self.timers.elapsed("solve");
                if elapsed >= Duration::from_secs_f64(time_limit) {
                    log::info!("time limit reached after {} iterations", iter);
                    self.update_residuals();
                    return (SolverStatus::MaxTime, iter);
                }
            }
        }

        if status == SolverStatus::Unsolved {
            // the final iterate has not been checked yet
            if !checked_last {
                status = self.check_termination(iter);
                if self.settings.verbose {
                    self.print_iteration(out, iter);
                }
            }
            if status == SolverStatus::Unsolved {
                status = SolverStatus::MaxIterations;
            }
        }

        (status, iter)
    }

    // one ADMM iteration in scaled space
    fn admm_step(&mut self) {
        let v = &mut self.variables;
        let data = &self.data;
        let rho_vec = &self.rho.rho_vec;
        let rho_inv = &self.rho.rho_inv_vec;
        let sigma = self.settings.sigma;
        let alpha = self.settings.alpha;
        let n = data.n;

        std::mem::swap(&mut v.x, &mut v.x_prev);
        std::mem::swap(&mut v.z, &mut v.z_prev);

        // rhs = [σx_prev - q; z_prev - ρ⁻¹y]
        let (rhs_x, rhs_z) = v.rhs.split_at_mut(n);
        rhs_x.waxpby(sigma, &v.x_prev, -T::one(), &data.q);
        for (r, &zp, &ri, &y) in izip!(rhs_z, &v.z_prev, rho_inv, &v.y) {
            *r = zp - ri * y;
        }

        self.kkt.solve(&mut v.xtilde_nu, &v.rhs);
        let (xtilde, nu) = v.xtilde_nu.split_at(n);

        // z̃ = z_prev + ρ⁻¹(ν - y)
        for (zt, &zp, &ri, &nui, &y) in izip!(&mut v.ztilde, &v.z_prev, rho_inv, nu, &v.y) {
            *zt = zp + ri * (nui - y);
        }

        // relaxed x and its change
        v.x.waxpby(alpha, xtilde, T::one() - alpha, &v.x_prev);
        v.delta_x.waxpby(T::one(), &v.x, -T::one(), &v.x_prev);

        // relaxed z, held in ztilde
        v.ztilde.axpby(T::one() - alpha, &v.z_prev, alpha);

        // z = Π(z_relax + ρ⁻¹y), then the dual update
        for (z, &zr, &ri, &y, &l, &u) in izip!(&mut v.z, &v.ztilde, rho_inv, &v.y, &data.l, &data.u) {
            *z = (zr + ri * y).clamp_to(l, u);
        }
        for (dy, y, &r, &zr, &z) in izip!(&mut v.delta_y, &mut v.y, rho_vec, &v.ztilde, &v.z) {
            *dy = r * (zr - z);
            *y += *dy;
        }
    }

    fn update_residuals(&mut self) {
        let v = &self.variables;
        self.residuals
            .update(&self.data, &v.x, &v.z, &v.y, &self.settings);
    }

    fn check_termination(&mut self, iter: u32) -> SolverStatus {
        self.update_residuals();

        let res = &mut self.residuals;
        let settings = &self.settings;
        log::debug!(
            "iter {}: prim_res = {:e} (eps {:e}), dual_res = {:e} (eps {:e})",
            iter,
            res.prim_res,
            res.eps_prim,
            res.dual_res,
            res.eps_dual
        );
        log::trace!("x = {:?}", self.variables.x);

        let prim_ok = res.is_primal_feasible();
        let dual_ok = res.is_dual_feasible();

        if prim_ok && dual_ok {
            SolverStatus::Solved
        } else if !prim_ok
            && res.is_primal_infeasible(
                &self.data,
                &mut self.variables.delta_y,
                settings.eps_prim_inf,
                settings.scaled_termination,
            )
        {
            SolverStatus::PrimalInfeasible
        } else if !dual_ok
            && res.is_dual_infeasible(
                &self.data,
                &self.variables.delta_x,
                settings.eps_dual_inf,
                settings.scaled_termination,
            )
        {
            SolverStatus::DualInfeasible
        } else {
            SolverStatus::Unsolved
        }
    }

    // refactors with a new scalar rho if the estimate has moved far
    // enough.  A failed refactorization keeps the old rho.
    fn adapt_rho(&mut self) {
        let rho = self.rho.rho;
        let estimate = rho_estimate(
            rho,
            self.residuals.prim_res_normalized,
            self.residuals.dual_res_normalized,
        );
        self.info.rho_estimate = estimate;

        let tol = self.settings.adaptive_rho_tolerance;
        if estimate <= rho * tol && estimate >= rho / tol {
            return;
        }

        self.rho.set_rho(estimate);
        match self.kkt.update_rho_vec(&self.rho.rho_vec) {
            Ok(()) => {
                self.info.rho_updates += 1;
                log::debug!("rho updated from {:e} to {:e}", rho, estimate);
            }
            Err(e) => {
                log::warn!("rho update to {:e} failed ({}), keeping {:e}", estimate, e, rho);
                self.rho.set_rho(rho);
            }
        }
    }

    fn print_iteration(&mut self, out: &mut PrintTarget, iter: u32) {
        let obj_val = self.data.objective(&self.variables.x);
        let printed = info_print::print_status(
            out,
            iter,
            obj_val,
            self.residuals.prim_res,
            self.residuals.dual_res,
            self.rho.rho,
            self.timers.elapsed("solve"),
        );
        _log_print_error(printed);
    }
}

// scales a certificate to unscaled units and unit infinity norm
fn _normalize_certificate<T: FloatT>(cert: &mut [T], scaling: &[T]) {
    cert.hadamard(scaling);
    let nrm = cert.norm_inf();
    if nrm > T::zero() {
        cert.scale(T::recip(nrm));
    }
}

fn _log_print_error(result: std::io::Result<()>) {
    if let Err(e) = result {
        log::warn!("failed to write solver output: {}", e);
    }
}

#![allow(non_snake_case)]
use super::equilibration::MIN_SCALING;
use super::problemdata::ProblemData;
use super::rho::DIVISION_TOL;
use super::settings::Settings;
use super::utils::infbounds::get_infinity;
use super::utils::try_alloc_vec;
use crate::algebra::*;
use itertools::izip;
use std::collections::TryReserveError;

/// Residuals and tolerances of the current iterate.
///
/// The reported residuals are unscaled unless `scaled_termination` is
/// set.  The normalized residuals used for adaptive rho are always taken
/// in scaled space.
#[derive(Debug, Clone)]
pub(crate) struct Residuals<T> {
    pub Ax: Vec<T>,
    pub Px: Vec<T>,
    pub Aty: Vec<T>,

    pub prim_res: T,
    pub dual_res: T,
    pub eps_prim: T,
    pub eps_dual: T,

    pub prim_res_normalized: T,
    pub dual_res_normalized: T,

    work_n: Vec<T>,
    work_m: Vec<T>,
}

impl<T> Residuals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            Ax: try_alloc_vec(T::zero(), m)?,
            Px: try_alloc_vec(T::zero(), n)?,
            Aty: try_alloc_vec(T::zero(), n)?,
            prim_res: T::nan(),
            dual_res: T::nan(),
            eps_prim: T::zero(),
            eps_dual: T::zero(),
            prim_res_normalized: T::nan(),
            dual_res_normalized: T::nan(),
            work_n: try_alloc_vec(T::zero(), n)?,
            work_m: try_alloc_vec(T::zero(), m)?,
        })
    }

    /// Computes residuals and termination tolerances at the scaled
    /// iterate (x, z, y).
    pub fn update(
        &mut self,
        data: &ProblemData<T>,
        x: &[T],
        z: &[T],
        y: &[T],
        settings: &Settings<T>,
    ) {
        let sc = &data.scaling;
        let unscale = !settings.scaled_termination;
        let divtol: T = DIVISION_TOL.as_T();

        data.A.gemv(&mut self.Ax, x, T::one(), T::zero());
        data.P.sym().symv(&mut self.Px, x, T::one(), T::zero());
        data.A.t().gemv(&mut self.Aty, y, T::one(), T::zero());

        // primal residual Ax - z
        self.work_m.waxpby(T::one(), &self.Ax, -T::one(), z);

        let prim_scaled = self.work_m.norm_inf();
        let prim_norm_scaled = T::max(self.Ax.norm_inf(), z.norm_inf());
        self.prim_res_normalized = prim_scaled / (prim_norm_scaled + divtol);

        let (prim, prim_norm) = if unscale {
            let res = self.work_m.norm_inf_scaled(&sc.einv);
            let norm_Ax = self.Ax.norm_inf_scaled(&sc.einv);
            let norm_z = z.norm_inf_scaled(&sc.einv);
            (res, T::max(norm_Ax, norm_z))
        } else {
            (prim_scaled, prim_norm_scaled)
        };
        self.prim_res = prim;
        self.eps_prim = settings.eps_abs + settings.eps_rel * prim_norm;

        // dual residual Px + q + A'y
        self.work_n.waxpby(T::one(), &self.Px, T::one(), &data.q);
        self.work_n.axpby(T::one(), &self.Aty, T::one());

        let dual_scaled = self.work_n.norm_inf();
        let dual_norm_scaled = self
            .Px
            .norm_inf()
            .max(self.Aty.norm_inf())
            .max(data.q.norm_inf());
        self.dual_res_normalized = dual_scaled / (dual_norm_scaled + divtol);

        let (dual, dual_norm) = if unscale {
            let res = self.work_n.norm_inf_scaled(&sc.dinv);
            let norm = self
                .Px
                .norm_inf_scaled(&sc.dinv)
                .max(self.Aty.norm_inf_scaled(&sc.dinv))
                .max(data.q.norm_inf_scaled(&sc.dinv));
            (sc.cinv * res, sc.cinv * norm)
        } else {
            (dual_scaled, dual_norm_scaled)
        };
        self.dual_res = dual;
        self.eps_dual = settings.eps_abs + settings.eps_rel * dual_norm;
    }

    pub fn is_primal_feasible(&self) -> bool {
        self.Ax.is_empty() || self.prim_res < self.eps_prim
    }

    pub fn is_dual_feasible(&self) -> bool {
        self.dual_res < self.eps_dual
    }

    /// Tests the dual iterate difference δy for a certificate of primal
    /// infeasibility.  δy is projected in place onto the polar of the
    /// recession cone of [l, u].
    pub fn is_primal_infeasible(
        &mut self,
        data: &ProblemData<T>,
        delta_y: &mut [T],
        eps: T,
        scaled_termination: bool,
    ) -> bool {
        let inf: T = (get_infinity() * MIN_SCALING).as_T();
        let sc = &data.scaling;
        let unscale = !scaled_termination;

        for (dy, &l, &u) in izip!(&mut *delta_y, &data.l, &data.u) {
            if u > inf {
                *dy = if l < -inf { T::zero() } else { T::min(*dy, T::zero()) };
            } else if l < -inf {
                *dy = T::max(*dy, T::zero());
            }
        }

        let norm_delta_y = if unscale {
            delta_y.norm_inf_scaled(&sc.e)
        } else {
            delta_y.norm_inf()
        };

        if norm_delta_y <= DIVISION_TOL.as_T() {
            return false;
        }

        let mut ineq_lhs = T::zero();
        for (&dy, &l, &u) in izip!(&*delta_y, &data.l, &data.u) {
            ineq_lhs += u * T::max(dy, T::zero()) + l * T::min(dy, T::zero());
        }

        if ineq_lhs >= -eps * norm_delta_y {
            return false;
        }

        let Atdy = &mut self.work_n;
        data.A.t().gemv(Atdy, delta_y, T::one(), T::zero());
        let norm_Atdy = if unscale {
            Atdy.norm_inf_scaled(&sc.dinv)
        } else {
            Atdy.norm_inf()
        };
        norm_Atdy < eps * norm_delta_y
    }

    /// Tests the primal iterate difference δx for a certificate of dual
    /// infeasibility.
    pub fn is_dual_infeasible(
        &mut self,
        data: &ProblemData<T>,
        delta_x: &[T],
        eps: T,
        scaled_termination: bool,
    ) -> bool {
        let inf: T = (get_infinity() * MIN_SCALING).as_T();
        let sc = &data.scaling;
        let unscale = !scaled_termination;

        let (norm_delta_x, cost_scaling) = if unscale {
            (delta_x.norm_inf_scaled(&sc.d), sc.c)
        } else {
            (delta_x.norm_inf(), T::one())
        };

        if norm_delta_x <= DIVISION_TOL.as_T() {
            return false;
        }

        // q'δx < 0
        if data.q.dot(delta_x) >= -cost_scaling * eps * norm_delta_x {
            return false;
        }

        // Pδx ≈ 0
        let Pdx = &mut self.work_n;
        data.P.sym().symv(Pdx, delta_x, T::one(), T::zero());
        let norm_Pdx = if unscale {
            Pdx.norm_inf_scaled(&sc.dinv)
        } else {
            Pdx.norm_inf()
        };
        if norm_Pdx >= cost_scaling * eps * norm_delta_x {
            return false;
        }

        // Aδx in the recession cone of [l, u]
        let Adx = &mut self.work_m;
        data.A.gemv(Adx, delta_x, T::one(), T::zero());
        if unscale {
            Adx.hadamard(&sc.einv);
        }

        let tol = eps * norm_delta_x;
        izip!(&*Adx, &data.l, &data.u).all(|(&adx, &l, &u)| {
            let upper_ok = u > inf || adx <= tol;
            let lower_ok = l < -inf || adx >= -tol;
            upper_ok && lower_ok
        })
    }
}

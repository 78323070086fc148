#![allow(non_snake_case)]

use super::engine::Engine;
use super::kktsolvers::direct::assemble_kkt_matrix;
use super::status::PolishStatus;
use super::utils::PositionAll;
use crate::algebra::*;
use crate::qdldl::QDLDLFactorisation;
use itertools::izip;

// residuals below this are treated as already converged when deciding
// whether a polished iterate is an improvement
const POLISH_RES_TOL: f64 = 1e-10;

impl<T> Engine<T>
where
    T: FloatT,
{
    /// Refines the solution by solving the equality constrained QP
    /// defined by the active constraints of the current iterate.  The
    /// iterate is replaced only if the polished point has better
    /// residuals.
    pub(crate) fn polish(&mut self) -> PolishStatus {
        let data = &self.data;
        let (n, m) = (data.n, data.m);
        let v = &self.variables;

        // active sets from the scaled iterate
        let low = izip!(&v.z, &data.l, &v.y).position_all(|&(&z, &l, &y)| z - l < -y);
        let upp = izip!(&v.z, &data.u, &v.y).position_all(|&(&z, &u, &y)| u - z < y);
        let nlow = low.len();
        let rows: Vec<usize> = low.iter().chain(&upp).copied().collect();
        let mred = rows.len();

        log::debug!(
            "polishing with {} lower and {} upper active constraints",
            nlow,
            upp.len()
        );

        let Ared = data.A.select_rows(&rows);

        // [P + δI  Ared'; Ared  -δI]
        let delta = self.settings.delta;
        let rho_vec = vec![T::recip(delta); mred];
        let (K, _) = assemble_kkt_matrix(&data.P, &Ared, delta, &rho_vec);

        let mut factors = match QDLDLFactorisation::new(&K, None) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("polish factorization failed: {}", e);
                return PolishStatus::Failed;
            }
        };

        // rhs = [-q; l_low; u_upp]
        let mut rhs = vec![T::zero(); n + mred];
        rhs[..n].scalarop_from(|q| -q, &data.q);
        for (r, &i) in rhs[n..n + nlow].iter_mut().zip(&low) {
            *r = data.l[i];
        }
        for (r, &i) in rhs[n + nlow..].iter_mut().zip(&upp) {
            *r = data.u[i];
        }

        let mut sol = rhs.clone();
        factors.solve(&mut sol);

        // iterative refinement against the unregularized system
        let mut err = vec![T::zero(); n + mred];
        for _ in 0..self.settings.polish_refine_iter {
            _reduced_residual(&mut err, &rhs, &sol, &data.P, &Ared);
            factors.solve(&mut err);
            sol.axpby(T::one(), &err, T::one());
        }

        let (x_pol, y_red) = sol.split_at(n);

        // z = Π(Ax) and y scattered back to the full constraint set
        let mut z_pol = vec![T::zero(); m];
        data.A.gemv(&mut z_pol, x_pol, T::one(), T::zero());
        z_pol.project_box(&data.l, &data.u);

        let mut y_pol = vec![T::zero(); m];
        for (&i, &yi) in rows.iter().zip(y_red) {
            y_pol[i] = yi;
        }

        // compare against the residuals of the current iterate
        let prim = self.residuals.prim_res;
        let dual = self.residuals.dual_res;
        self.residuals
            .update(&self.data, x_pol, &z_pol, &y_pol, &self.settings);
        let prim_pol = self.residuals.prim_res;
        let dual_pol = self.residuals.dual_res;

        let tol: T = POLISH_RES_TOL.as_T();
        let improved = (prim_pol < prim && dual_pol < dual)
            || (prim_pol < prim && dual < tol)
            || (dual_pol < dual && prim < tol);

        if improved {
            log::debug!(
                "polish accepted: prim_res {:e} -> {:e}, dual_res {:e} -> {:e}",
                prim,
                prim_pol,
                dual,
                dual_pol
            );
            let v = &mut self.variables;
            v.x.copy_from(x_pol);
            v.z.copy_from(&z_pol);
            v.y.copy_from(&y_pol);
            PolishStatus::Succeeded
        } else {
            log::warn!(
                "polish rejected: prim_res {:e} -> {:e}, dual_res {:e} -> {:e}",
                prim,
                prim_pol,
                dual,
                dual_pol
            );
            let v = &self.variables;
            self.residuals
                .update(&self.data, &v.x, &v.z, &v.y, &self.settings);
            PolishStatus::Failed
        }
    }
}

// err = rhs - [P Ared'; Ared 0] sol
fn _reduced_residual<T: FloatT>(
    err: &mut [T],
    rhs: &[T],
    sol: &[T],
    P: &CscMatrix<T>,
    Ared: &CscMatrix<T>,
) {
    let n = P.ncols();
    let (sol_x, sol_y) = sol.split_at(n);
    let (err_x, err_y) = err.split_at_mut(n);

    err_x.copy_from(&rhs[..n]);
    P.sym().symv(err_x, sol_x, -T::one(), T::one());
    Ared.t().gemv(err_x, sol_y, -T::one(), T::one());

    err_y.copy_from(&rhs[n..]);
    Ared.gemv(err_y, sol_x, -T::one(), T::one());
}

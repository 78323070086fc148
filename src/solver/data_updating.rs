#![allow(non_snake_case)]

use super::engine::Engine;
use super::errors::{DataValidationError, SolverError};
use super::problemdata::{check_bounds, clip_bounds};
use crate::algebra::*;
use crate::timers::*;

impl<T> Engine<T>
where
    T: FloatT,
{
    /// Replaces any of q, l and u.  Missing bounds keep their current
    /// values, and the merged bounds are validated together.  Nothing is
    /// changed if validation fails.
    pub fn update_data(
        &mut self,
        q: Option<&[T]>,
        l: Option<&[T]>,
        u: Option<&[T]>,
    ) -> Result<(), SolverError> {
        self.timers.reset_timer("update");

        timeit! {self.timers => "update";
            if let Some(q) = q {
                check_lin_cost(q, self.data.n)?;
            }
            let bounds = if l.is_some() || u.is_some() {
                Some(self.merged_bounds(l, u)?)
            } else {
                None
            };

            if let Some((l, u)) = bounds {
                self.set_bounds(&l, &u)?;
            }
            if let Some(q) = q {
                self.data.set_lin_cost(q);
            }
        }

        self.add_update_time("update");
        self.unchanged_since_solved = false;
        Ok(())
    }

    // new bounds merged with the retained ones, validated and clipped
    fn merged_bounds(
        &self,
        l: Option<&[T]>,
        u: Option<&[T]>,
    ) -> Result<(Vec<T>, Vec<T>), DataValidationError> {
        let orig = &self.data.orig;
        let mut l = l.unwrap_or(&orig.l).to_vec();
        let mut u = u.unwrap_or(&orig.u).to_vec();

        check_bounds(&l, &u, self.data.m)?;
        clip_bounds(&mut l, &mut u);
        Ok((l, u))
    }

    // scales in new bounds and refactors if any constraint changed type
    fn set_bounds(&mut self, l: &[T], u: &[T]) -> Result<(), SolverError> {
        let l_old = self.data.orig.l.clone();
        let u_old = self.data.orig.u.clone();

        self.data.set_bounds(l, u);
        if !self.rho.classify(&self.data.l, &self.data.u) {
            return Ok(());
        }

        log::debug!("constraint types changed, updating rho vector");
        if let Err(e) = self.kkt.update_rho_vec(&self.rho.rho_vec) {
            self.data.set_bounds(&l_old, &u_old);
            self.rho.classify(&self.data.l, &self.data.u);
            return Err(e.into());
        }
        Ok(())
    }

    /// Replaces values of P and/or A while keeping their sparsity
    /// patterns.  Values refer to the stored entries of the upper
    /// triangular, column sorted P and the column sorted A.
    ///
    /// With scaling enabled the problem is re-equilibrated and the
    /// iterates are carried over into the new scaling.  On any failure
    /// the previous data and factorization are restored.
    pub fn update_matrices(
        &mut self,
        Px: Option<(&[T], Option<&[usize]>)>,
        Ax: Option<(&[T], Option<&[usize]>)>,
    ) -> Result<(), SolverError> {
        self.timers.reset_timer("update");

        timeit! {self.timers => "update";
            let P = updated_matrix(&self.data.orig.P, Px, "P")?;
            let A = updated_matrix(&self.data.orig.A, Ax, "A")?;

            let saved_data = self.data.clone();
            let saved_rho = self.rho.clone();
            let saved_iterates = (
                self.variables.x.clone(),
                self.variables.z.clone(),
                self.variables.y.clone(),
            );

            self.data.orig.P = P;
            self.data.orig.A = A;

            let result = if self.settings.scaling > 0 {
                self.rescale_and_refactor()
            } else {
                self.data.rescale(0);
                let Pidx = _changed_index(Px);
                let Aidx = _changed_index(Ax);
                self.kkt
                    .update_matrices(&self.data.P, Pidx, &self.data.A, Aidx)
                    .map_err(SolverError::from)
            };

            if let Err(ref e) = result {
                log::warn!("matrix update failed ({}), restoring previous data", e);
                self.data = saved_data;
                self.rho = saved_rho;
                let (x, z, y) = saved_iterates;
                self.variables.x = x;
                self.variables.z = z;
                self.variables.y = y;

                // a failed rho refactor can follow a successful matrix one
                let resync = self
                    .kkt
                    .update_matrices(&self.data.P, None, &self.data.A, None)
                    .and_then(|_| self.kkt.update_rho_vec(&self.rho.rho_vec));
                if let Err(e2) = resync {
                    log::warn!("could not restore previous factorization: {}", e2);
                }
            }
        }

        self.add_update_time("update");
        if result.is_ok() {
            self.unchanged_since_solved = false;
        }
        result
    }

    // re-equilibrates from the updated originals, carrying the iterates
    // over to the new scaling
    fn rescale_and_refactor(&mut self) -> Result<(), SolverError> {
        let (n, m) = (self.data.n, self.data.m);
        let mut x = vec![T::zero(); n];
        let mut z = vec![T::zero(); m];
        let mut y = vec![T::zero(); m];

        let v = &mut self.variables;
        let sc = &self.data.scaling;
        sc.unscale_x(&mut x, &v.x);
        sc.unscale_z(&mut z, &v.z);
        sc.unscale_y(&mut y, &v.y);

        self.data.rescale(self.settings.scaling);

        let sc = &self.data.scaling;
        sc.scale_x(&mut v.x, &x);
        sc.scale_z(&mut v.z, &z);
        sc.scale_y(&mut v.y, &y);

        let classes_changed = self.rho.classify(&self.data.l, &self.data.u);

        self.kkt
            .update_matrices(&self.data.P, None, &self.data.A, None)?;

        // the rho block depends only on the constraint types
        if classes_changed {
            self.kkt.update_rho_vec(&self.rho.rho_vec)?;
        }
        Ok(())
    }
}

fn check_lin_cost<T: FloatT>(q: &[T], n: usize) -> Result<(), DataValidationError> {
    if q.len() != n {
        return Err(DataValidationError::IncompatibleDimension("q"));
    }
    if !q.is_finite() {
        return Err(DataValidationError::NotFinite("q"));
    }
    Ok(())
}

// a copy of M with the given values written in, checked for format
fn updated_matrix<T: FloatT>(
    M: &CscMatrix<T>,
    update: Option<(&[T], Option<&[usize]>)>,
    name: &'static str,
) -> Result<CscMatrix<T>, DataValidationError> {
    let mut M = M.clone();
    if let Some((values, index)) = update {
        M.update_values(values, index)
            .map_err(DataValidationError::sparse(name))?;
        if !values.is_finite() {
            return Err(DataValidationError::NotFinite(name));
        }
    }
    Ok(M)
}

// positions of the stored entries that change in an unscaled update
fn _changed_index<'a, T>(update: Option<(&[T], Option<&'a [usize]>)>) -> Option<&'a [usize]> {
    match update {
        None => Some(&[]),
        Some((_, index)) => index,
    }
}

#![allow(non_snake_case)]

use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::errors::LinsysError;
use crate::solver::kktsolvers::direct::assemble_kkt_matrix;
use crate::solver::kktsolvers::KKTSolver;
use itertools::izip;

/// KKTSolver using preconditioned conjugate gradients on the reduced
/// system
///
/// ```text
/// (P + σI + A'RA) x = rhs_x + A'R rhs_z,    ν = R(Ax - rhs_z)
/// ```
///
/// with `R = diag(rho_vec)`.  Uses a diagonal (Jacobi) preconditioner.
/// The solution of the previous call is used as the starting point.
///
/// CG needs `P + σI` positive definite.  This is checked with an LDLᵀ
/// factorization of `P + σI` alone, at setup and whenever P changes.
pub(crate) struct IndirectPCGSolver<T> {
    P: CscMatrix<T>,
    A: CscMatrix<T>,
    sigma: T,
    rho_vec: Vec<T>,

    max_iter: u32,
    tol: T,

    // inverse of the preconditioner diagonal
    precond: Vec<T>,

    // factors of P + σI, used only for their inertia, and the position
    // of each stored entry of P within them
    convexity: QDLDLFactorisation<T>,
    Pmap: Vec<usize>,

    // CG iterate and work vectors
    x: Vec<T>,
    b: Vec<T>,
    r: Vec<T>,
    z: Vec<T>,
    p: Vec<T>,
    Kp: Vec<T>,
    work_m: Vec<T>,
}

impl<T> IndirectPCGSolver<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        sigma: T,
        rho_vec: &[T],
        max_iter: u32,
        tol: T,
    ) -> Result<Self, LinsysError> {
        let (m, n) = A.size();

        let (Pshift, map) = assemble_kkt_matrix(P, &CscMatrix::zeros((0, n)), sigma, &[]);
        let convexity = QDLDLFactorisation::new(&Pshift, None)?;
        if convexity.positive_inertia() != n {
            return Err(LinsysError::NonConvex);
        }

        let mut solver = Self {
            P: P.clone(),
            A: A.clone(),
            sigma,
            rho_vec: rho_vec.to_vec(),
            max_iter,
            tol,
            precond: vec![T::zero(); n],
            convexity,
            Pmap: map.P,
            x: vec![T::zero(); n],
            b: vec![T::zero(); n],
            r: vec![T::zero(); n],
            z: vec![T::zero(); n],
            p: vec![T::zero(); n],
            Kp: vec![T::zero(); n],
            work_m: vec![T::zero(); m],
        };
        solver.update_preconditioner();
        Ok(solver)
    }

    // refactors P + σI with the current values of P and checks that it
    // is positive definite
    fn check_convexity(&mut self) -> Result<(), LinsysError> {
        let P = &self.P;
        let values: Vec<T> = (0..P.nnz())
            .map(|k| {
                let (row, col) = P.index_to_coord(k);
                let shift = if row == col { self.sigma } else { T::zero() };
                P.nzval[k] + shift
            })
            .collect();
        self.convexity.update_values(&self.Pmap, &values);

        match self.convexity.refactor() {
            Ok(()) if self.convexity.positive_inertia() == P.n => Ok(()),
            _ => Err(LinsysError::NonConvex),
        }
    }

    // Jacobi preconditioner diag(P) + σ + Σᵢ ρᵢ Aᵢⱼ²
    fn update_preconditioner(&mut self) {
        self.precond.set(self.sigma);

        for col in 0..self.P.n {
            for k in self.P.colptr[col]..self.P.colptr[col + 1] {
                if self.P.rowval[k] == col {
                    self.precond[col] += self.P.nzval[k];
                }
            }
        }

        let A = &self.A;
        for (col, d) in self.precond.iter_mut().enumerate() {
            for k in A.colptr[col]..A.colptr[col + 1] {
                let a = A.nzval[k];
                *d += self.rho_vec[A.rowval[k]] * a * a;
            }
        }
        self.precond.recip();
    }

    // y = (P + σI + A'RA) v
    fn reduced_product(&mut self, y_is_Kp: bool) {
        let (v, y) = if y_is_Kp {
            (&self.p, &mut self.Kp)
        } else {
            (&self.x, &mut self.r)
        };
        self.P.sym().symv(y, v, T::one(), T::zero());
        y.axpby(self.sigma, v, T::one());
        self.A.gemv(&mut self.work_m, v, T::one(), T::zero());
        self.work_m.hadamard(&self.rho_vec);
        self.A.t().gemv(y, &self.work_m, T::one(), T::one());
    }

    fn pcg(&mut self) -> u32 {
        let tol = self.tol * T::max(self.b.norm_inf(), T::one());

        // r = b - Kx
        self.reduced_product(false);
        self.r.axpby(T::one(), &self.b, -T::one());

        self.z.copy_from(&self.r).hadamard(&self.precond);
        self.p.copy_from(&self.z);
        let mut rz = self.r.dot(&self.z);

        let mut iter = 0;
        while iter < self.max_iter && self.r.norm_inf() > tol {
            self.reduced_product(true);
            let pKp = self.p.dot(&self.Kp);
            if pKp <= T::zero() {
                log::warn!("pcg stopped on nonpositive curvature {:e}", pKp);
                break;
            }
            let alpha = rz / pKp;
            self.x.axpby(alpha, &self.p, T::one());
            self.r.axpby(-alpha, &self.Kp, T::one());

            self.z.copy_from(&self.r).hadamard(&self.precond);
            let rz_new = self.r.dot(&self.z);
            let beta = rz_new / rz;
            rz = rz_new;
            self.p.axpby(T::one(), &self.z, beta);
            iter += 1;
        }
        iter
    }
}

impl<T> KKTSolver<T> for IndirectPCGSolver<T>
where
    T: FloatT,
{
    fn solve(&mut self, lhs: &mut [T], rhs: &[T]) {
        let n = self.x.len();
        let (rhs_x, rhs_z) = rhs.split_at(n);

        // b = rhs_x + A'R rhs_z
        self.work_m.copy_from(rhs_z).hadamard(&self.rho_vec);
        self.b.copy_from(rhs_x);
        self.A.t().gemv(&mut self.b, &self.work_m, T::one(), T::one());

        let iter = self.pcg();
        log::trace!("pcg converged in {} iterations", iter);

        let (lhs_x, lhs_nu) = lhs.split_at_mut(n);
        lhs_x.copy_from(&self.x);

        // ν = R(Ax - rhs_z)
        self.A.gemv(lhs_nu, &self.x, T::one(), T::zero());
        for (nu, &rz, &rho) in izip!(lhs_nu, rhs_z, &self.rho_vec) {
            *nu = rho * (*nu - rz);
        }
    }

    fn update_matrices(
        &mut self,
        P: &CscMatrix<T>,
        Pidx: Option<&[usize]>,
        A: &CscMatrix<T>,
        Aidx: Option<&[usize]>,
    ) -> Result<(), LinsysError> {
        let Pold = self.P.nzval.clone();
        let Aold = self.A.nzval.clone();

        _copy_values(&mut self.P, P, Pidx);
        _copy_values(&mut self.A, A, Aidx);

        if let Err(e) = self.check_convexity() {
            log::warn!("rejecting matrix update: {}", e);
            self.P.nzval.copy_from(&Pold);
            self.A.nzval.copy_from(&Aold);
            // the old values passed this check before
            if let Err(e2) = self.check_convexity() {
                log::warn!("restoring P + sigma*I factors failed: {}", e2);
            }
            return Err(e);
        }
        self.update_preconditioner();
        Ok(())
    }

    fn update_rho_vec(&mut self, rho_vec: &[T]) -> Result<(), LinsysError> {
        self.rho_vec.copy_from(rho_vec);
        self.update_preconditioner();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "indirect"
    }
}

fn _copy_values<T: FloatT>(dest: &mut CscMatrix<T>, src: &CscMatrix<T>, index: Option<&[usize]>) {
    match index {
        None => {
            dest.nzval.copy_from(&src.nzval);
        }
        Some(index) => {
            for &k in index {
                dest.nzval[k] = src.nzval[k];
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pcg_solve() {
        let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
        let A = CscMatrix::from(&[
            [1., 1.], //
            [1., 0.], //
            [0., 1.], //
        ]);
        let rho = [0.1, 100., 1.];
        let sigma = 1e-6;
        let mut solver = IndirectPCGSolver::new(&P, &A, sigma, &rho, 100, 1e-12).unwrap();

        let rhs = [1., -2., 0.5, 0.3, -0.7];
        let mut lhs = [0.; 5];
        solver.solve(&mut lhs, &rhs);

        let (x, nu) = lhs.split_at(2);
        let mut r1 = vec![0.; 2];
        P.sym().symv(&mut r1, x, 1., 0.);
        r1.axpby(sigma, x, 1.);
        A.t().gemv(&mut r1, nu, 1., 1.);
        assert!(r1.norm_inf_diff(&rhs[..2]) < 1e-8);

        let mut r2 = vec![0.; 3];
        A.gemv(&mut r2, x, 1., 0.);
        for i in 0..3 {
            r2[i] -= nu[i] / rho[i];
        }
        assert!(r2.norm_inf_diff(&rhs[2..]) < 1e-8);
    }

    #[test]
    fn test_pcg_rejects_indefinite_P() {
        // positive diagonal, eigenvalues 3 and -1
        let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1., 2., 1.]);
        let A = CscMatrix::identity(2);
        assert!(matches!(
            IndirectPCGSolver::new(&P, &A, 1e-6, &[1., 1.], 50, 1e-10),
            Err(LinsysError::NonConvex)
        ));

        let Pgood = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
        let mut solver = IndirectPCGSolver::new(&Pgood, &A, 1e-6, &[1., 1.], 50, 1e-10).unwrap();
        let err = solver.update_matrices(&P, None, &A, None);
        assert!(matches!(err, Err(LinsysError::NonConvex)));
        assert_eq!(solver.P.nzval, Pgood.nzval);
    }

    #[test]
    fn test_pcg_rejects_negative_diagonal() {
        let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
        let A = CscMatrix::identity(2);
        let mut solver = IndirectPCGSolver::new(&P, &A, 1e-6, &[1., 1.], 50, 1e-10).unwrap();

        let mut Pbad = P.clone();
        Pbad.nzval[2] = -1.;
        let err = solver.update_matrices(&Pbad, None, &A, None);
        assert!(matches!(err, Err(LinsysError::NonConvex)));
        assert_eq!(solver.P.nzval, P.nzval);
    }
}

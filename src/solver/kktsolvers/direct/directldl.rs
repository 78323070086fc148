#![allow(non_snake_case)]

use super::kkt_assembly::*;
use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::errors::LinsysError;
use crate::solver::kktsolvers::KKTSolver;
use std::iter::zip;

// -------------------------------------
// KKTSolver using direct LDL factorisation
// -------------------------------------

pub(crate) struct DirectLDLSolver<T> {
    // problem dimensions
    n: usize,
    m: usize,

    sigma: T,

    // KKT mapping from problem data to KKT
    map: KKTMaps,

    //unpermuted KKT matrix
    KKT: CscMatrix<T>,

    factors: QDLDLFactorisation<T>,

    // scratch for pending value updates
    index: Vec<usize>,
    values: Vec<T>,
}

impl<T> DirectLDLSolver<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        sigma: T,
        rho_vec: &[T],
    ) -> Result<Self, LinsysError> {
        let (m, n) = A.size();
        let (KKT, map) = assemble_kkt_matrix(P, A, sigma, rho_vec);

        let factors = QDLDLFactorisation::new(&KKT, None)?;

        // the top left block must be positive definite
        if factors.positive_inertia() != n {
            return Err(LinsysError::NonConvex);
        }

        log::debug!(
            "factored KKT matrix of dimension {} with {} nonzeros ({} in L)",
            n + m,
            KKT.nnz(),
            factors.L.nnz()
        );

        Ok(Self {
            n,
            m,
            sigma,
            map,
            KKT,
            factors,
            index: Vec::new(),
            values: Vec::new(),
        })
    }

    fn push_P_values(&mut self, P: &CscMatrix<T>, Pidx: Option<&[usize]>) {
        let mut push = |k: usize| {
            let (row, col) = P.index_to_coord(k);
            let shift = if row == col { self.sigma } else { T::zero() };
            self.index.push(self.map.P[k]);
            self.values.push(P.nzval[k] + shift);
        };
        match Pidx {
            None => (0..P.nnz()).for_each(&mut push),
            Some(idx) => idx.iter().for_each(|&k| push(k)),
        }
    }

    fn push_A_values(&mut self, A: &CscMatrix<T>, Aidx: Option<&[usize]>) {
        match Aidx {
            None => {
                self.index.extend_from_slice(&self.map.A);
                self.values.extend_from_slice(&A.nzval);
            }
            Some(idx) => {
                for &k in idx {
                    self.index.push(self.map.A[k]);
                    self.values.push(A.nzval[k]);
                }
            }
        }
    }

    // writes the pending values and refactors.  If the factorization
    // fails the previous values and factors are restored.
    fn apply_and_refactor(&mut self) -> Result<(), LinsysError> {
        let mut index = std::mem::take(&mut self.index);
        let mut values = std::mem::take(&mut self.values);

        let old: Vec<T> = index.iter().map(|&i| self.KKT.nzval[i]).collect();
        _update_values(&mut self.factors, &mut self.KKT, &index, &values);

        let result = match self.factors.refactor() {
            Ok(()) if self.factors.positive_inertia() != self.n => Err(LinsysError::NonConvex),
            Ok(()) => Ok(()),
            Err(e) => Err(LinsysError::from(e)),
        };

        if let Err(ref e) = result {
            log::warn!("KKT refactorization failed ({}), restoring previous values", e);
            _update_values(&mut self.factors, &mut self.KKT, &index, &old);
            // previous values factored successfully before
            if let Err(e2) = self.factors.refactor() {
                log::warn!("restoring KKT factors failed: {}", e2);
            }
        }

        // keep the scratch allocations
        index.clear();
        values.clear();
        self.index = index;
        self.values = values;

        result
    }
}

impl<T> KKTSolver<T> for DirectLDLSolver<T>
where
    T: FloatT,
{
    fn solve(&mut self, lhs: &mut [T], rhs: &[T]) {
        lhs.copy_from(rhs);
        self.factors.solve(lhs);
    }

    fn update_matrices(
        &mut self,
        P: &CscMatrix<T>,
        Pidx: Option<&[usize]>,
        A: &CscMatrix<T>,
        Aidx: Option<&[usize]>,
    ) -> Result<(), LinsysError> {
        self.push_P_values(P, Pidx);
        self.push_A_values(A, Aidx);
        if self.index.is_empty() {
            return Ok(());
        }
        self.apply_and_refactor()
    }

    fn update_rho_vec(&mut self, rho_vec: &[T]) -> Result<(), LinsysError> {
        debug_assert_eq!(rho_vec.len(), self.m);
        for (&i, &rho) in zip(&self.map.diag_rho, rho_vec) {
            self.index.push(i);
            self.values.push(-T::recip(rho));
        }
        self.apply_and_refactor()
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

// update entries of the KKT matrix using the given index into its CSC
// representation.  QDLDL keeps its own permuted copy, so the same values
// are written there as well.
fn _update_values<T: FloatT>(
    factors: &mut QDLDLFactorisation<T>,
    KKT: &mut CscMatrix<T>,
    index: &[usize],
    values: &[T],
) {
    for (&idx, &v) in zip(index, values) {
        KKT.nzval[idx] = v;
    }
    factors.update_values(index, values);
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_data() -> (CscMatrix<f64>, CscMatrix<f64>) {
        let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
        let A = CscMatrix::from(&[
            [1., 1.], //
            [1., 0.], //
            [0., 1.], //
        ]);
        (P, A)
    }

    // checks K*[x;ν] = rhs for the quasidefinite system
    fn residual(P: &CscMatrix<f64>, A: &CscMatrix<f64>, sigma: f64, rho: &[f64], lhs: &[f64], rhs: &[f64]) -> f64 {
        let (m, n) = A.size();
        let (x, nu) = lhs.split_at(n);
        let mut r1 = vec![0.; n];
        let mut r2 = vec![0.; m];
        P.sym().symv(&mut r1, x, 1., 0.);
        r1.axpby(sigma, x, 1.);
        A.t().gemv(&mut r1, nu, 1., 1.);
        A.gemv(&mut r2, x, 1., 0.);
        for i in 0..m {
            r2[i] -= nu[i] / rho[i];
        }
        r1.norm_inf_diff(&rhs[..n]).max(r2.norm_inf_diff(&rhs[n..]))
    }

    #[test]
    fn test_direct_solve_and_updates() {
        let (mut P, mut A) = test_data();
        let sigma = 1e-6;
        let mut rho = vec![0.1, 0.1, 0.1];
        let mut solver = DirectLDLSolver::new(&P, &A, sigma, &rho).unwrap();

        let rhs = [1., -2., 0.5, 0.3, -0.7];
        let mut lhs = [0.; 5];
        solver.solve(&mut lhs, &rhs);
        assert!(residual(&P, &A, sigma, &rho, &lhs, &rhs) < 1e-9);

        rho = vec![1., 100., 0.5];
        solver.update_rho_vec(&rho).unwrap();
        solver.solve(&mut lhs, &rhs);
        assert!(residual(&P, &A, sigma, &rho, &lhs, &rhs) < 1e-9);

        // partial updates of P and A
        P.nzval[2] = 5.;
        A.nzval[1] = -3.;
        solver
            .update_matrices(&P, Some(&[2][..]), &A, Some(&[1][..]))
            .unwrap();
        solver.solve(&mut lhs, &rhs);
        assert!(residual(&P, &A, sigma, &rho, &lhs, &rhs) < 1e-9);

        // full updates
        P.nzval.copy_from_slice(&[1., 0.5, 1.]);
        solver.update_matrices(&P, None, &A, None).unwrap();
        solver.solve(&mut lhs, &rhs);
        assert!(residual(&P, &A, sigma, &rho, &lhs, &rhs) < 1e-9);
    }

    #[test]
    fn test_nonconvex_rejected_and_restored() {
        let (P, A) = test_data();
        let rho = [0.1, 0.1, 0.1];

        let Pbad = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![-4., 1., 2.]);
        assert!(matches!(
            DirectLDLSolver::new(&Pbad, &A, 1e-6, &rho),
            Err(LinsysError::NonConvex)
        ));

        let mut solver = DirectLDLSolver::new(&P, &A, 1e-6, &rho).unwrap();
        let err = solver.update_matrices(&Pbad, Some(&[0][..]), &A, Some(&[][..]));
        assert!(err.is_err());

        // original system is still in place
        let rhs = [1., -2., 0.5, 0.3, -0.7];
        let mut lhs = [0.; 5];
        solver.solve(&mut lhs, &rhs);
        assert!(residual(&P, &A, 1e-6, &rho, &lhs, &rhs) < 1e-9);
    }
}

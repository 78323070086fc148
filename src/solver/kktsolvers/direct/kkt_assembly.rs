#![allow(non_snake_case)]

use crate::algebra::*;
use std::iter::zip;

/// Positions of the problem data within the assembled KKT matrix
#[derive(Debug, Clone)]
pub(crate) struct KKTMaps {
    /// destination of each stored entry of P
    pub P: Vec<usize>,
    /// destination of each stored entry of A (placed as A')
    pub A: Vec<usize>,
    /// diagonal of the top left block, including entries missing from P
    pub diagP: Vec<usize>,
    /// diagonal of the bottom right block
    pub diag_rho: Vec<usize>,
}

impl KKTMaps {
    fn new<T: FloatT>(P: &CscMatrix<T>, A: &CscMatrix<T>) -> Self {
        let (m, n) = A.size();
        Self {
            P: vec![0; P.nnz()],
            A: vec![0; A.nnz()],
            diagP: vec![0; n],
            diag_rho: vec![0; m],
        }
    }
}

/// Assembles the triu KKT matrix
///
/// ```text
/// [P + σI        A'      ]
/// [  0     -diag(1/rho_vec)]
/// ```
///
/// `P` must be triu with sorted columns.
pub(crate) fn assemble_kkt_matrix<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    sigma: T,
    rho_vec: &[T],
) -> (CscMatrix<T>, KKTMaps) {
    let mut map = KKTMaps::new(P, A);
    let (m, n) = A.size();

    // entries actually on the diagonal of P
    let nnz_diagP = P.count_diagonal_entries();

    let nnzKKT = P.nnz() +  // Number of elements in P
    n -                     // Number of elements in diagonal top left block
    nnz_diagP +             // remove double count on the diagonal if P has entries
    A.nnz() +               // Number of nonzeros in A
    m; // Number of elements in diagonal below A'

    let mut K = CscMatrix::<T>::spalloc(m + n, m + n, nnzKKT);

    _kkt_assemble_colcounts(&mut K, P, A);
    _kkt_assemble_fill(&mut K, P, A, &mut map);

    // P columns are sorted and the missing diagonal entries are
    // filled after them, so each diagonal is last in its column
    for (j, d) in map.diagP.iter_mut().enumerate() {
        *d = K.colptr[j + 1] - 1;
    }

    for &d in &map.diagP {
        K.nzval[d] += sigma;
    }
    for (&d, &rho) in zip(&map.diag_rho, rho_vec) {
        K.nzval[d] = -T::recip(rho);
    }

    (K, map)
}

fn _kkt_assemble_colcounts<T: FloatT>(K: &mut CscMatrix<T>, P: &CscMatrix<T>, A: &CscMatrix<T>) {
    let (m, n) = A.size();

    // use K.p to hold nnz entries in each
    // column of the KKT matrix
    K.colptr.fill(0);

    K.colcount_block(P, 0, MatrixShape::N);
    K.colcount_missing_diag(P, 0);
    K.colcount_block(A, n, MatrixShape::T);
    K.colcount_diag(n, m);
}

fn _kkt_assemble_fill<T: FloatT>(
    K: &mut CscMatrix<T>,
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    map: &mut KKTMaps,
) {
    let (m, n) = A.size();

    // cumsum total entries to convert to K.p
    K.colcount_to_colptr();

    K.fill_block(P, &mut map.P, 0, 0, MatrixShape::N);
    K.fill_missing_diag(P, 0); // after adding P, since triu form
                               // fill in value for A, top right (transposed/rowwise)
    K.fill_block(A, &mut map.A, 0, n, MatrixShape::T);
    K.fill_diag(&mut map.diag_rho, n, m);

    // backshift the colptrs to recover K.p again
    K.backshift_colptrs();
}

#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`](QDLDLFactorisation) factor operations

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot")]
    ZeroPivot,
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("Fill reducing ordering failed")]
    OrderingFailed,
}

/// Settings for [`QDLDLFactorisation`](QDLDLFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings {
    /// scaling of the AMD dense row threshold
    #[builder(default = "1.0")]
    amd_dense_scale: f64,
    /// user supplied fill-reducing permutation.  AMD is used if None.
    #[builder(default = "None", setter(strip_option))]
    perm: Option<Vec<usize>>,
}

impl Default for QDLDLSettings {
    fn default() -> QDLDLSettings {
        QDLDLSettings {
            amd_dense_scale: 1.0,
            perm: None,
        }
    }
}

/// Performs $LDL^T$ factorization of a symmetric quasidefinite matrix.
///
/// No dynamic regularization is applied to the pivots, so the count of
/// positive entries in `D` is the true positive inertia of the input.

#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    // fill reducing permutation
    pub perm: Vec<usize>,
    // lower triangular factor
    pub L: CscMatrix<T>,
    // D and is inverse for A = LDL^T
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    workspace: QDLDLWorkspace<T>,
}

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    /// Symbolic and numeric factorization of the triu matrix `Ain`
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<QDLDLSettings>,
    ) -> Result<QDLDLFactorisation<T>, QDLDLError> {
        check_structure(Ain)?;

        let n = Ain.nrows();
        let opts = opts.unwrap_or_default();

        let (perm, iperm) = match opts.perm {
            Some(perm) => {
                let iperm = _invperm(&perm)?;
                (perm, iperm)
            }
            None => _get_amd_ordering(Ain, opts.amd_dense_scale)?,
        };

        // permuted triu data, plus the position of each input
        // entry within it for later value updates
        let (triuA, AtoPAPt) = _permute_symmetric(Ain, &iperm);

        let workspace = QDLDLWorkspace::new(triuA, AtoPAPt);
        let sumLnz = workspace.Lnz.iter().sum();

        let mut factors = QDLDLFactorisation {
            perm,
            L: CscMatrix::spalloc(n, n, sumLnz),
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            workspace,
        };

        factors.refactor()?;
        Ok(factors)
    }

    /// Number of positive pivots in the most recent factorization
    pub fn positive_inertia(&self) -> usize {
        self.workspace.positive_inertia
    }

    /// Solves Ax = b using LDL factors for A.   Solves in place (x replaces b)
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);
        _solve(&self.L, &self.Dinv, tmp);
        _ipermute(b, tmp, &self.perm);
    }

    /// Overwrite entries of the factorization target.   Indices
    /// refer to positions in the `nzval` field of the original input.
    /// Takes effect at the next call to [`refactor`](Self::refactor).
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for (&idx, &v) in zip(indices, values) {
            nzval[AtoPAPt[idx]] = v;
        }
    }

    /// Numeric refactorization with the current values
    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        let pos_d_count = _factor(&mut self.L, &mut self.D, &mut self.Dinv, &mut self.workspace)?;
        self.workspace.positive_inertia = pos_d_count;
        Ok(())
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }

    //Error if A doesn't have at least one entry in every column
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }

    Ok(())
}

#[derive(Debug)]
struct QDLDLWorkspace<T> {
    // elimination tree and column counts of L
    etree: Vec<usize>,
    Lnz: Vec<usize>,

    // scratch space for the numeric factorization
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    // number of positive values in D
    positive_inertia: usize,

    // The post ordering PAPt of the original data, triu
    triuA: CscMatrix<T>,

    // mapping from entries in the triu input to triuA
    AtoPAPt: Vec<usize>,
}

impl<T> QDLDLWorkspace<T>
where
    T: FloatT,
{
    fn new(triuA: CscMatrix<T>, AtoPAPt: Vec<usize>) -> Self {
        let n = triuA.ncols();
        let mut etree = vec![0; n];
        let mut Lnz = vec![0; n];
        let mut iwork = vec![0; n * 3];

        _etree(n, &triuA.colptr, &triuA.rowval, &mut iwork, &mut Lnz, &mut etree);

        Self {
            etree,
            Lnz,
            iwork,
            bwork: vec![false; n],
            fwork: vec![T::zero(); n],
            positive_inertia: 0,
            triuA,
            AtoPAPt,
        }
    }
}

const QDLDL_UNKNOWN: usize = usize::MAX;

// Compute the elimination tree for a quasidefinite matrix
// in compressed sparse column form.

fn _etree(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    work: &mut [usize],
    Lnz: &mut [usize],
    etree: &mut [usize],
) {
    work.fill(0);
    Lnz.fill(0);
    etree.fill(QDLDL_UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for &istart in &Ai[Ap[j]..Ap[j + 1]] {
            let mut i = istart;
            while work[i] != j {
                if etree[i] == QDLDL_UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1;
                work[i] = j;
                i = etree[i];
            }
        }
    }
}

// Numeric factorization of workspace.triuA into L, D.  Returns the
// number of positive entries in D.

fn _factor<T: FloatT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    workspace: &mut QDLDLWorkspace<T>,
) -> Result<usize, QDLDLError> {
    let QDLDLWorkspace {
        etree,
        Lnz,
        iwork,
        bwork: y_markers,
        fwork: y_vals,
        triuA: A,
        ..
    } = workspace;

    let n = A.n;
    let (Ap, Ai, Ax) = (&A.colptr, &A.rowval, &A.nzval);
    let (Lp, Li, Lx) = (&mut L.colptr, &mut L.rowval, &mut L.nzval);

    let (y_idx, iwork) = iwork.split_at_mut(n);
    let (elim_buffer, next_colspace) = iwork.split_at_mut(n);

    //set Lp to cumsum(Lnz), starting from zero
    Lp[0] = 0;
    let mut acc = 0;
    for (Lp, &Lnz) in zip(&mut Lp[1..], Lnz.iter()) {
        acc += Lnz;
        *Lp = acc;
    }

    y_markers.fill(false);
    y_vals.fill(T::zero());
    D.fill(T::zero());
    next_colspace.copy_from_slice(&Lp[0..n]);

    let mut positive_count = 0;

    for k in 0..n {
        // Solve y = L(0:k-1,0:k-1) \ b, with b the part of column k of A
        // above the diagonal.   y is then the kth row of L.
        let mut nnz_y = 0;

        // find the nonzero pattern of the kth row of L
        for i in Ap[k]..Ap[k + 1] {
            let bidx = Ai[i];

            if bidx == k {
                D[k] = Ax[i];
                continue;
            }

            y_vals[bidx] = Ax[i];

            if !y_markers[bidx] {
                y_markers[bidx] = true;
                elim_buffer[0] = bidx;
                let mut nnz_e = 1;

                // walk up the elimination tree until a visited node
                let mut next_idx = etree[bidx];
                while next_idx != QDLDL_UNKNOWN && next_idx < k && !y_markers[next_idx] {
                    y_markers[next_idx] = true;
                    elim_buffer[nnz_e] = next_idx;
                    next_idx = etree[next_idx];
                    nnz_e += 1;
                }

                // append the path in reverse (topological) order
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }
        }

        // compute the values in the kth row of L
        for &cidx in y_idx[0..nnz_y].iter().rev() {
            let tmp_idx = next_colspace[cidx];
            let y_vals_cidx = y_vals[cidx];

            for j in Lp[cidx]..tmp_idx {
                y_vals[Li[j]] -= Lx[j] * y_vals_cidx;
            }

            Lx[tmp_idx] = y_vals_cidx * Dinv[cidx];
            D[k] -= y_vals_cidx * Lx[tmp_idx];
            Li[tmp_idx] = k;
            next_colspace[cidx] += 1;

            y_vals[cidx] = T::zero();
            y_markers[cidx] = false;
        }

        if D[k] == T::zero() || !D[k].is_finite() {
            return Err(QDLDLError::ZeroPivot);
        }
        if D[k] > T::zero() {
            positive_count += 1;
        }
        Dinv[k] = T::recip(D[k]);
    }

    Ok(positive_count)
}

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        let rng = L.colptr[i]..L.colptr[i + 1];
        for (&Lij, &Lxj) in zip(&L.rowval[rng.clone()], &L.nzval[rng]) {
            x[Lij] -= Lxj * xi;
        }
    }
}

// Solves (L+I)'x = b, with x replacing b
fn _ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let rng = L.colptr[i]..L.colptr[i + 1];
        let s = zip(&L.rowval[rng.clone()], &L.nzval[rng])
            .fold(T::zero(), |acc, (&Lij, &Lxj)| acc + Lxj * x[Lij]);
        x[i] -= s;
    }
}

// Solves Ax = b where A has given LDL factors, with x replacing b
fn _solve<T: FloatT>(L: &CscMatrix<T>, Dinv: &[T], b: &mut [T]) {
    _lsolve(L, b);
    b.hadamard(Dinv);
    _ltsolve(L, b);
}

// Construct an inverse permutation from a permutation
fn _invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let mut b = vec![usize::MAX; p.len()];

    for (i, &j) in p.iter().enumerate() {
        if j < p.len() && b[j] == usize::MAX {
            b[j] = i;
        } else {
            return Err(QDLDLError::InvalidPermutation);
        }
    }
    Ok(b)
}

fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(&p, x)| *x = b[p]);
}

fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(&p, &b)| x[p] = b);
}

// Given a triu sparse symmetric matrix `A`, return the triu part of
// PAPᵀ for the inverse permutation `iperm`, along with the location
// of each entry of A within it.  Columns of the result are not
// necessarily sorted by row.
fn _permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.ncols();
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    // count entries per column of P
    let mut row_starts = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for &rowA in &A.rowval[A.colptr[colA]..A.colptr[colA + 1]] {
            row_starts[max(iperm[rowA], colP)] += 1;
        }
    }

    let mut acc = 0;
    for (col, count) in row_starts.iter_mut().enumerate() {
        P.colptr[col] = acc;
        acc += *count;
        *count = P.colptr[col];
    }
    P.colptr[n] = acc;

    // place the entries
    for colA in 0..n {
        let colP = iperm[colA];
        for k in A.colptr[colA]..A.colptr[colA + 1] {
            let rowP = iperm[A.rowval[k]];
            let col_idx = max(colP, rowP);
            let dest = row_starts[col_idx];

            P.rowval[dest] = min(colP, rowP);
            P.nzval[dest] = A.nzval[k];
            AtoPAPt[k] = dest;
            row_starts[col_idx] += 1;
        }
    }
    (P, AtoPAPt)
}

fn _get_amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::OrderingFailed)?;
    Ok((perm, iperm))
}

//configure tests of internals
#[path = "test.rs"]
#[cfg(test)]
mod test;

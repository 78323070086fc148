//---------------------------------------------------------
// low-level internal utilities for counting / filling entries
// in block partitioned sparse matrices.
//
// Assembly proceeds in two passes.   The colcount_* functions
// accumulate per-column entry counts into self.colptr, which is
// then converted to fill pointers by colcount_to_colptr.  The
// fill_* functions then write entries using self.colptr as the
// next free slot in each column, and backshift_colptrs recovers
// a valid colptr at the end.
//---------------------------------------------------------

use crate::algebra::{CscMatrix, FloatT, MatrixShape};
use std::iter::zip;

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    // increment the self.colptr by the number of nonzeros
    // in a square diagonal matrix placed on the diagonal.
    pub(crate) fn colcount_diag(&mut self, initcol: usize, blockcols: usize) {
        let cols = self.colptr[initcol..(initcol + blockcols)].iter_mut();
        cols.for_each(|x| *x += 1);
    }

    // same as colcount_diag, but counts places where the input
    // matrix M has a missing diagonal entry.  M must be square,
    // triu and have sorted columns.
    pub(crate) fn colcount_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        assert_eq!(M.colptr.len(), M.n + 1);
        assert!(self.colptr.len() >= M.n + initcol);

        for i in 0..M.n {
            if !_has_trailing_diag(M, i) {
                self.colptr[i + initcol] += 1;
            }
        }
    }

    // increment the self.colptr by the number of nonzeros in M
    pub(crate) fn colcount_block(&mut self, M: &CscMatrix<T>, initcol: usize, shape: MatrixShape) {
        match shape {
            MatrixShape::T => {
                for row in M.rowval.iter() {
                    self.colptr[initcol + row] += 1;
                }
            }
            MatrixShape::N => {
                for i in 0..M.n {
                    self.colptr[initcol + i] += M.colptr[i + 1] - M.colptr[i];
                }
            }
        }
    }

    // populate values from M using the self.colptr as indicator of
    // next fill location in each column.   MtoKKT[k] records the
    // destination of the kth stored entry of M.
    pub(crate) fn fill_block(
        &mut self,
        M: &CscMatrix<T>,
        MtoKKT: &mut [usize],
        initrow: usize,
        initcol: usize,
        shape: MatrixShape,
    ) {
        assert_eq!(MtoKKT.len(), M.nnz());

        for i in 0..M.n {
            let rng = M.colptr[i]..M.colptr[i + 1];
            let entries = zip(&M.rowval[rng.clone()], &M.nzval[rng.clone()]);

            for (k, (&Mrow, &Mval)) in zip(rng, entries) {
                let (row, col) = match shape {
                    MatrixShape::T => (i + initrow, Mrow + initcol),
                    MatrixShape::N => (Mrow + initrow, i + initcol),
                };

                let dest = self.colptr[col];
                self.rowval[dest] = row;
                self.nzval[dest] = Mval;
                self.colptr[col] += 1;
                MtoKKT[k] = dest;
            }
        }
    }

    // Populate the diagonal with 0s using the self.colptr as indicator of
    // next fill location in each column
    pub(crate) fn fill_diag(&mut self, diagtoKKT: &mut [usize], offset: usize, blockdim: usize) {
        for (i, col) in (offset..(offset + blockdim)).enumerate() {
            let dest = self.colptr[col];
            self.rowval[dest] = col;
            self.nzval[dest] = T::zero(); //structural zero
            self.colptr[col] += 1;
            diagtoKKT[i] = dest;
        }
    }

    // same as fill_diag, but only places zero entries where the
    // input matrix M has a missing diagonal entry.  M must be square,
    // triu and have sorted columns.
    pub(crate) fn fill_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for i in 0..M.n {
            if !_has_trailing_diag(M, i) {
                let col = i + initcol;
                let dest = self.colptr[col];
                self.rowval[dest] = col;
                self.nzval[dest] = T::zero(); //structural zero
                self.colptr[col] += 1;
            }
        }
    }

    // convert per-column counts into fill pointers
    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in &mut self.colptr {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }
}

// true if the last entry of column i sits on the diagonal
fn _has_trailing_diag<T>(M: &CscMatrix<T>, i: usize) -> bool {
    let (first, last) = (M.colptr[i], M.colptr[i + 1]);
    first != last && M.rowval[last - 1] == i
}

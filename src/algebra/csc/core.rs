#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, MatrixShape, ShapedMatrix, SparseFormatError, Symmetric};
use std::iter::zip;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use splitqp::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// Ths field should have length `n+1`. The last entry corresponds
    /// to the the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// This constructor performs no checks at all.  Use
    /// [`check_format`](CscMatrix::check_format) to validate user data.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    ///
    /// To make an m x n matrix of zeros, use
    /// ```no_run
    /// use splitqp::algebra::CscMatrix;
    /// let m = 3;
    /// let n = 4;
    /// let A : CscMatrix<f64> = CscMatrix::spalloc(m,n,0);
    /// ```
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// An m x n matrix with no structural nonzeros
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        Self::spalloc(m, n, 0)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr.last().copied().unwrap_or(0)
    }

    /// transpose
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// symmetric view
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check that matrix data is correctly formatted.
    ///
    /// Entries within a column may appear in any row order, but each
    /// (row, col) position may appear at most once.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.len() != self.n + 1 || self.colptr[self.n] != self.rowval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr[0] != 0 || self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        if let Some(&row) = self.rowval.iter().find(|&&r| r >= self.m) {
            return Err(SparseFormatError::BadRowval { row, m: self.m });
        }

        // duplicates, without assuming sorted columns
        let mut marker = vec![usize::MAX; self.m];
        for col in 0..self.n {
            for &row in &self.rowval[self.colptr[col]..self.colptr[col + 1]] {
                if marker[row] == col {
                    return Err(SparseFormatError::DuplicateEntry { row, col });
                }
                marker[row] = col;
            }
        }

        Ok(())
    }

    /// True if the row indices within every column are strictly increasing
    pub fn is_sorted(&self) -> bool {
        (0..self.n).all(|col| {
            self.rowval[self.colptr[col]..self.colptr[col + 1]]
                .windows(2)
                .all(|r| r[0] < r[1])
        })
    }

    /// Returns a copy with the entries of each column sorted by row index
    pub fn sorted(&self) -> Self {
        let mut out = self.clone();
        let mut perm = Vec::new();

        for col in 0..self.n {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let rows = &self.rowval[first..last];
            let vals = &self.nzval[first..last];

            perm.clear();
            perm.extend(0..rows.len());
            perm.sort_by_key(|&k| rows[k]);

            for (k, &p) in perm.iter().enumerate() {
                out.rowval[first + k] = rows[p];
                out.nzval[first + k] = vals[p];
            }
        }
        out
    }

    /// Select a subset of the rows of a sparse matrix.   Rows appear in
    /// the output in the order given by `rows`.
    ///
    /// # Panics
    /// Panics if any row index is out of bounds
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        // index from original row to its position in the reduced matrix
        let mut rridx = vec![usize::MAX; self.m];
        for (k, &r) in rows.iter().enumerate() {
            rridx[r] = k;
        }

        let nzred = self.rowval.iter().filter(|&&r| rridx[r] != usize::MAX).count();
        let mut Ared = CscMatrix::spalloc(rows.len(), self.n, nzred);

        let mut ptrred = 0;
        for col in 0..self.n {
            Ared.colptr[col] = ptrred;
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                let newrow = rridx[self.rowval[ptr]];
                if newrow != usize::MAX {
                    Ared.rowval[ptrred] = newrow;
                    Ared.nzval[ptrred] = self.nzval[ptr];
                    ptrred += 1;
                }
            }
        }
        Ared.colptr[self.n] = ptrred;

        // reduced rows may arrive out of order within a column
        if Ared.is_sorted() {
            Ared
        } else {
            Ared.sorted()
        }
    }

    /// Allocates a new matrix containing only entries from the upper
    /// triangular part.   Column ordering of the source is preserved.
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let n = self.n;
        let mut colptr = vec![0; n + 1];

        for col in 0..n {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            colptr[col + 1] = colptr[col] + rows.iter().filter(|&&row| row <= col).count();
        }

        let nnz = colptr[n];
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);

        for col in 0..n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            for (&row, &val) in zip(&self.rowval[rng.clone()], &self.nzval[rng]) {
                if row <= col {
                    rowval.push(row);
                    nzval.push(val);
                }
            }
        }
        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // check lower triangle for any structural entries, regardless
        // of the values that may be assigned to them
        (0..self.n).all(|col| {
            self.rowval[self.colptr[col]..self.colptr[col + 1]]
                .iter()
                .all(|&row| row <= col)
        })
    }

    /// Returns the position in `nzval` of the (row,col) entry, or None
    /// if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn index_of(&self, idx: (usize, usize)) -> Option<usize> {
        let (row, col) = idx;
        assert!(row < self.nrows() && col < self.ncols());

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        self.rowval[first..last]
            .iter()
            .position(|&r| r == row)
            .map(|k| first + k)
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        self.index_of(idx).map(|k| self.nzval[k])
    }

    /// Returns the (row,col) coordinate of the `k`th stored nonzero
    pub fn index_to_coord(&self, k: usize) -> (usize, usize) {
        // the column is the last colptr entry not exceeding k
        let col = self.colptr.partition_point(|&p| p <= k) - 1;
        (self.rowval[k], col)
    }

    /// Overwrites stored values in place, preserving the sparsity pattern.
    ///
    /// With `indices = None`, `values` must hold a value for every stored
    /// nonzero.   Otherwise `values[i]` is written to position `indices[i]`
    /// of `nzval`.   The matrix is left untouched on error.
    pub fn update_values(
        &mut self,
        values: &[T],
        indices: Option<&[usize]>,
    ) -> Result<(), SparseFormatError> {
        match indices {
            None => {
                if values.len() != self.nzval.len() {
                    return Err(SparseFormatError::IncompatibleDimension);
                }
                self.nzval.copy_from_slice(values);
            }
            Some(index) => {
                if index.len() != values.len() {
                    return Err(SparseFormatError::IncompatibleDimension);
                }
                let nnz = self.nzval.len();
                if let Some(&bad) = index.iter().find(|&&i| i >= nnz) {
                    return Err(SparseFormatError::IndexOutOfPattern { index: bad, nnz });
                }
                for (&i, &v) in zip(index, values) {
                    self.nzval[i] = v;
                }
            }
        }
        Ok(())
    }

    /// Number of stored entries that lie on the diagonal
    pub(crate) fn count_diagonal_entries(&self) -> usize {
        (0..usize::min(self.m, self.n))
            .filter(|&col| {
                self.rowval[self.colptr[col]..self.colptr[col + 1]]
                    .iter()
                    .any(|&r| r == col)
            })
            .count()
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
    fn is_square(&self) -> bool {
        self.m == self.n
    }
}

/// Dense to sparse conversion, dropping exact zeros.
///
/// ```no_run
/// use splitqp::algebra::CscMatrix;
///
/// let A = CscMatrix::from(&[
///     [1., 0.],
///     [2., 3.],
/// ]);
/// assert_eq!(A.nnz(), 3);
/// ```
impl<T, const M: usize, const N: usize> From<&[[T; N]; M]> for CscMatrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> Self {
        let mut colptr = Vec::with_capacity(N + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        colptr.push(0);
        for col in 0..N {
            for (row, rowdata) in rows.iter().enumerate() {
                let v = rowdata[col];
                if v != T::zero() {
                    rowval.push(row);
                    nzval.push(v);
                }
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(M, N, colptr, rowval, nzval)
    }
}

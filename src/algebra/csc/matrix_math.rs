use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);
        _prescale(y, b);
        if a == T::zero() {
            return;
        }
        for (col, &xcol) in x.iter().enumerate() {
            let rng = self.colptr[col]..self.colptr[col + 1];
            let ax = a * xcol;
            for (&row, &Aij) in zip(&self.rowval[rng.clone()], &self.nzval[rng]) {
                y[row] += Aij * ax;
            }
        }
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert_eq!(x.len(), A.m);
        assert_eq!(y.len(), A.n);
        _prescale(y, b);
        if a == T::zero() {
            return;
        }
        for (col, ycol) in y.iter_mut().enumerate() {
            let rng = A.colptr[col]..A.colptr[col + 1];
            let dot = zip(&A.rowval[rng.clone()], &A.nzval[rng])
                .fold(T::zero(), |acc, (&row, &Aij)| acc + Aij * x[row]);
            *ycol += a * dot;
        }
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert!(A.is_square());
        assert_eq!(x.len(), A.n);
        assert_eq!(y.len(), A.n);
        _prescale(y, b);

        for (col, &xcol) in x.iter().enumerate() {
            let rng = A.colptr[col]..A.colptr[col + 1];
            for (&row, &Aij) in zip(&A.rowval[rng.clone()], &A.nzval[rng]) {
                y[row] += a * Aij * xcol;
                if row != col {
                    // mirror the strictly upper part
                    y[col] += a * Aij * x[row];
                }
            }
        }
    }
}

// y = b*y, avoiding 0*NaN when b is zero
fn _prescale<T: FloatT>(y: &mut [T], b: T) {
    if b == T::zero() {
        y.fill(T::zero());
    } else if b != T::one() {
        y.scale(b);
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn col_norms(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.col_norms_no_reset(norms);
    }

    fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);

        for (col, v) in norms.iter_mut().enumerate() {
            *v = self.nzval[self.colptr[col]..self.colptr[col + 1]]
                .iter()
                .fold(*v, |m, &nzval| T::max(m, T::abs(nzval)));
        }
    }

    fn col_norms_sym(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.col_norms_sym_no_reset(norms);
    }

    fn col_norms_sym_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);

        for col in 0..self.n {
            for k in self.colptr[col]..self.colptr[col + 1] {
                let tmp = T::abs(self.nzval[k]);
                let row = self.rowval[k];
                norms[col] = T::max(norms[col], tmp);
                norms[row] = T::max(norms[row], tmp);
            }
        }
    }

    fn row_norms(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.row_norms_no_reset(norms);
    }

    fn row_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);

        for (&row, &val) in zip(&self.rowval, &self.nzval) {
            norms[row] = T::max(norms[row], T::abs(val));
        }
    }

    fn norm_inf(&self) -> T {
        self.nzval.norm_inf()
    }

    fn norm_fro(&self) -> T {
        self.nzval.norm()
    }

    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn lscale(&mut self, l: &[T]) {
        assert_eq!(l.len(), self.m);
        for (val, &row) in zip(&mut self.nzval, &self.rowval) {
            *val *= l[row];
        }
    }

    fn rscale(&mut self, r: &[T]) {
        assert_eq!(r.len(), self.n);
        for (col, &rc) in r.iter().enumerate() {
            self.nzval[self.colptr[col]..self.colptr[col + 1]].scale(rc);
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);

        for (col, &rc) in r.iter().enumerate() {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let rows = &self.rowval[first..last];
            for (val, &row) in zip(&mut self.nzval[first..last], rows) {
                *val *= l[row] * rc;
            }
        }
    }

    fn quad_form(&self, y: &[T], x: &[T]) -> T {
        assert!(self.is_square());
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);

        let mut out = T::zero();
        for col in 0..self.n {
            let (mut tmpx, mut tmpy) = (T::zero(), T::zero());
            let rng = self.colptr[col]..self.colptr[col + 1];

            for (&row, &Mv) in zip(&self.rowval[rng.clone()], &self.nzval[rng]) {
                match row.cmp(&col) {
                    std::cmp::Ordering::Less => {
                        tmpx += Mv * x[row];
                        tmpy += Mv * y[row];
                    }
                    std::cmp::Ordering::Equal => out += Mv * x[col] * y[col],
                    std::cmp::Ordering::Greater => panic!("Input matrix should be triu form."),
                }
            }
            out += tmpx * y[col] + tmpy * x[col];
        }
        out
    }
}

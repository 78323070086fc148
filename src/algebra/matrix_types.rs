/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MatrixShape {
    /// Normal matrix orientation
    N,
    /// Transposed matrix orientation
    T,
}

/// Adjoint of a matrix.   Borrowed view used for products with `Mᵀ`.
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// Symmetric view of a matrix stored in upper triangular form.
#[derive(Debug, Clone, Copy)]
pub struct Symmetric<'a, M> {
    pub src: &'a M,
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by sparse matrix validation and update operations.
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("row index {row} exceeds the matrix row dimension {m}")]
    /// Row index exceeds the matrix row dimension
    BadRowval { row: usize, m: usize },
    #[error("bad column pointer values")]
    /// Matrix column pointer values are defective
    BadColptr,
    #[error("duplicate entry in row {row} of column {col}")]
    /// The same (row, col) position appears more than once
    DuplicateEntry { row: usize, col: usize },
    #[error("index {index} is not in the sparsity pattern (nnz = {nnz})")]
    /// An update refers to a position outside the stored nonzeros
    IndexOutOfPattern { index: usize, nnz: usize },
}

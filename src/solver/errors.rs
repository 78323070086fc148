use super::settings::SettingsError;
use crate::algebra::SparseFormatError;
use crate::qdldl::QDLDLError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Error type returned when user supplied problem data is malformed.

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataValidationError {
    #[error("problem has no decision variables")]
    EmptyProblem,
    #[error("incompatible dimensions for {0}")]
    IncompatibleDimension(&'static str),
    #[error("bad sparse matrix {name}: {err}")]
    SparseFormat {
        name: &'static str,
        #[source]
        err: SparseFormatError,
    },
    #[error("lower bound exceeds upper bound in row {0}")]
    InfeasibleBounds(usize),
    #[error("non-finite values in {0}")]
    NotFinite(&'static str),
}

/// Error type returned by the linear system backends.

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinsysError {
    #[error("linear system backend '{0}' is not available")]
    Unavailable(&'static str),
    #[error("KKT factorization failed: {0}")]
    Factorization(#[from] QDLDLError),
    #[error("P + sigma*I is not positive definite")]
    NonConvex,
}

/// Errors returned from workspace operations.
///
/// Non-convergence and infeasibility are not errors.  They are reported
/// through [`SolverStatus`](crate::solver::SolverStatus).

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("Data Validation Error: {0}")]
    DataValidation(#[from] DataValidationError),
    #[error("Settings Validation Error: {0}")]
    SettingsValidation(#[from] SettingsError),
    #[error("Linear System Solver Load Error: backend '{0}' is not available")]
    LinsysSolverLoad(&'static str),
    #[error("Linear System Solver Initialization Error: {0}")]
    LinsysSolverInit(#[source] QDLDLError),
    #[error("Non-convex Problem Error: P is not positive semidefinite")]
    NonConvex,
    #[error("Memory Allocation Error: {0}")]
    MemAlloc(#[from] TryReserveError),
    #[error("Workspace Not Initialized Error: workspace has been cleaned up")]
    WorkspaceNotInit,
}

impl SolverError {
    /// Integer error code, numbered in declaration order from 1.
    pub fn code(&self) -> u32 {
        match self {
            SolverError::DataValidation(_) => 1,
            SolverError::SettingsValidation(_) => 2,
            SolverError::LinsysSolverLoad(_) => 3,
            SolverError::LinsysSolverInit(_) => 4,
            SolverError::NonConvex => 5,
            SolverError::MemAlloc(_) => 6,
            SolverError::WorkspaceNotInit => 7,
        }
    }
}

impl From<LinsysError> for SolverError {
    fn from(e: LinsysError) -> Self {
        match e {
            LinsysError::Unavailable(name) => SolverError::LinsysSolverLoad(name),
            LinsysError::Factorization(err) => SolverError::LinsysSolverInit(err),
            LinsysError::NonConvex => SolverError::NonConvex,
        }
    }
}

impl DataValidationError {
    pub(crate) fn sparse(name: &'static str) -> impl FnOnce(SparseFormatError) -> Self {
        move |err| DataValidationError::SparseFormat { name, err }
    }
}

#[test]
fn test_error_codes_and_messages() {
    let errors = [
        SolverError::from(DataValidationError::EmptyProblem),
        SolverError::from(SettingsError::BadFieldValue("rho")),
        SolverError::from(LinsysError::Unavailable("indirect")),
        SolverError::from(LinsysError::Factorization(QDLDLError::ZeroPivot)),
        SolverError::from(LinsysError::NonConvex),
        SolverError::from(Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err()),
        SolverError::WorkspaceNotInit,
    ];

    let prefixes = [
        "Data Validation Error",
        "Settings Validation Error",
        "Linear System Solver Load Error",
        "Linear System Solver Initialization Error",
        "Non-convex Problem Error",
        "Memory Allocation Error",
        "Workspace Not Initialized Error",
    ];

    for (k, (err, prefix)) in errors.iter().zip(prefixes).enumerate() {
        assert_eq!(err.code() as usize, k + 1);
        assert!(err.to_string().starts_with(prefix));
    }

    let err = SolverError::from(DataValidationError::SparseFormat {
        name: "A",
        err: SparseFormatError::BadColptr,
    });
    assert_eq!(
        err.to_string(),
        "Data Validation Error: bad sparse matrix A: bad column pointer values"
    );
}

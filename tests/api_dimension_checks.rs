#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn api_dim_check_data() -> (CscMatrix<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::identity(4);
    let A = CscMatrix::identity(4);
    let q = vec![0.; 4];
    let l = vec![-1.; 4];
    let u = vec![1.; 4];
    (P, A, q, l, u)
}

fn setup_error(
    P: &CscMatrix<f64>,
    A: &CscMatrix<f64>,
    q: &[f64],
    l: &[f64],
    u: &[f64],
) -> SolverError {
    let settings = Settings {
        verbose: false,
        ..Settings::default()
    };
    match Workspace::setup(P, A, q, l, u, settings) {
        Ok(_) => panic!("setup should have failed"),
        Err(e) => e,
    }
}

fn validation(e: DataValidationError) -> SolverError {
    SolverError::DataValidation(e)
}

#[test]
fn api_dim_check_working() {
    let (P, A, q, l, u) = api_dim_check_data();
    let settings = Settings {
        verbose: false,
        ..Settings::default()
    };
    assert!(Workspace::setup(&P, &A, &q, &l, &u, settings).is_ok());
}

#[test]
fn api_dim_check_bad_P() {
    let (_, A, q, l, u) = api_dim_check_data();
    let P = CscMatrix::identity(3);
    assert_eq!(
        setup_error(&P, &A, &q, &l, &u),
        validation(DataValidationError::IncompatibleDimension("A"))
    );

    let P = CscMatrix::<f64>::zeros((4, 3));
    assert_eq!(
        setup_error(&P, &A, &q, &l, &u),
        validation(DataValidationError::IncompatibleDimension("P"))
    );
}

#[test]
fn api_dim_check_bad_A() {
    let (P, _, q, l, u) = api_dim_check_data();
    let A = CscMatrix::<f64>::zeros((4, 5));
    assert_eq!(
        setup_error(&P, &A, &q, &l, &u),
        validation(DataValidationError::IncompatibleDimension("A"))
    );
}

#[test]
fn api_dim_check_bad_vectors() {
    let (P, A, q, l, u) = api_dim_check_data();
    assert_eq!(
        setup_error(&P, &A, &q[..3], &l, &u),
        validation(DataValidationError::IncompatibleDimension("q"))
    );
    assert_eq!(
        setup_error(&P, &A, &q, &l[..3], &u),
        validation(DataValidationError::IncompatibleDimension("l"))
    );
    assert_eq!(
        setup_error(&P, &A, &q, &l, &[1.; 5]),
        validation(DataValidationError::IncompatibleDimension("u"))
    );
}

#[test]
fn api_dim_check_empty_problem() {
    let P = CscMatrix::<f64>::zeros((0, 0));
    let A = CscMatrix::<f64>::zeros((0, 0));
    assert_eq!(
        setup_error(&P, &A, &[], &[], &[]),
        validation(DataValidationError::EmptyProblem)
    );
}

#[test]
fn api_check_bad_values() {
    let (P, A, mut q, mut l, u) = api_dim_check_data();

    q[2] = f64::NAN;
    assert_eq!(
        setup_error(&P, &A, &q, &l, &u),
        validation(DataValidationError::NotFinite("q"))
    );
    q[2] = 0.;

    // infinite bounds are fine, NaN bounds are not
    l[0] = f64::NEG_INFINITY;
    let settings = Settings {
        verbose: false,
        ..Settings::default()
    };
    assert!(Workspace::setup(&P, &A, &q, &l, &u, settings).is_ok());

    l[0] = f64::NAN;
    assert_eq!(
        setup_error(&P, &A, &q, &l, &u),
        validation(DataValidationError::NotFinite("l"))
    );

    l[0] = 2.;
    assert_eq!(
        setup_error(&P, &A, &q, &l, &u),
        validation(DataValidationError::InfeasibleBounds(0))
    );
}

#[test]
fn api_check_bad_sparse_format() {
    let (P, _, q, l, u) = api_dim_check_data();

    // column pointer ends beyond the stored entries
    let A = CscMatrix::new(4, 4, vec![0, 1, 2, 3, 5], vec![0, 1, 2, 3], vec![1.; 4]);
    let err = setup_error(&P, &A, &q, &l, &u);
    assert!(matches!(
        err,
        SolverError::DataValidation(DataValidationError::SparseFormat { name: "A", .. })
    ));
    assert_eq!(err.code(), 1);
}

#[test]
fn api_check_nonconvex() {
    let (_, A, q, l, u) = api_dim_check_data();
    let mut P = CscMatrix::identity(4);
    P.nzval[1] = -1.;

    let err = setup_error(&P, &A, &q, &l, &u);
    assert_eq!(err, SolverError::NonConvex);
    assert_eq!(err.code(), 5);
}

#[test]
fn api_check_bad_settings() {
    let (P, A, q, l, u) = api_dim_check_data();
    let settings = Settings {
        alpha: 2.5,
        ..Settings::default()
    };
    let err = match Workspace::setup(&P, &A, &q, &l, &u, settings) {
        Ok(_) => panic!("setup should have failed"),
        Err(e) => e,
    };
    assert_eq!(
        err,
        SolverError::SettingsValidation(SettingsError::BadFieldValue("alpha"))
    );
    assert_eq!(err.code(), 2);
}

#[test]
#[cfg(not(feature = "indirect"))]
fn api_check_unavailable_backend() {
    let (P, A, q, l, u) = api_dim_check_data();
    let settings = Settings {
        linsys_solver: LinsysSolver::Indirect,
        ..Settings::default()
    };
    let err = match Workspace::setup(&P, &A, &q, &l, &u, settings) {
        Ok(_) => panic!("setup should have failed"),
        Err(e) => e,
    };
    assert_eq!(err, SolverError::LinsysSolverLoad("indirect"));
    assert_eq!(err.code(), 3);
}

#![cfg(feature = "indirect")]
#![allow(non_snake_case)]

use splitqp::{algebra::*, io::ConfigurablePrintTarget, solver::*};

#[allow(clippy::type_complexity)]
fn indirect_test_data() -> (CscMatrix<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
    let A = CscMatrix::new(3, 2, vec![0, 2, 4], vec![0, 1, 0, 2], vec![1., 1., 1., 1.]);
    (P, A, vec![1., 1.], vec![1., 0., 0.], vec![1., 0.7, 0.7])
}

fn settings_with(linsys_solver: LinsysSolver) -> Settings<f64> {
    SettingsBuilder::default()
        .verbose(false)
        .linsys_solver(linsys_solver)
        .eps_abs(1e-5)
        .eps_rel(1e-5)
        .build()
        .unwrap()
}

#[test]
fn test_indirect_matches_direct() {
    let (P, A, q, l, u) = indirect_test_data();

    let mut direct = Workspace::setup(&P, &A, &q, &l, &u, settings_with(LinsysSolver::Direct)).unwrap();
    let xd = direct.solve().unwrap().x.clone();

    let mut indirect =
        Workspace::setup(&P, &A, &q, &l, &u, settings_with(LinsysSolver::Indirect)).unwrap();
    let solution = indirect.solve().unwrap();
    assert_eq!(solution.status, SolverStatus::Solved);
    assert!(xd.norm_inf_diff(&solution.x) <= 1e-3);
    assert!((solution.obj_val - 1.88).abs() <= 1e-3);
}

#[test]
fn test_indirect_updates() {
    let (P, A, q, l, u) = indirect_test_data();
    let mut workspace =
        Workspace::setup(&P, &A, &q, &l, &u, settings_with(LinsysSolver::Indirect)).unwrap();
    workspace.solve().unwrap();

    // same problem as the bound update in the direct tests
    workspace
        .update_bounds(&[1., 0.4, 0.], &[1., 0.4, 0.7])
        .unwrap();
    let solution = workspace.solve().unwrap();
    assert!((solution.x[0] - 0.4).abs() <= 1e-3);

    workspace.update_P(&[5., 1.5, 1.], None).unwrap();
    assert_eq!(workspace.solve().unwrap().status, SolverStatus::Solved);

    let err = workspace.update_P(&[-5.], Some(&[0][..])).unwrap_err();
    assert_eq!(err, SolverError::NonConvex);
}

#[test]
fn test_indirect_nonconvex_setup() {
    let (_, A, q, l, u) = indirect_test_data();
    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![-4., 1., 2.]);
    let err = match Workspace::setup(&P, &A, &q, &l, &u, settings_with(LinsysSolver::Indirect)) {
        Ok(_) => panic!("setup should have failed"),
        Err(e) => e,
    };
    assert_eq!(err.code(), 5);
}

#[test]
fn test_indirect_reported() {
    let (P, A, q, l, u) = indirect_test_data();
    let mut settings = settings_with(LinsysSolver::Indirect);
    settings.verbose = true;

    let mut workspace = Workspace::setup(&P, &A, &q, &l, &u, settings).unwrap();
    workspace.print_to_buffer();
    workspace.solve().unwrap();
    assert!(workspace
        .get_print_buffer()
        .unwrap()
        .contains("linear system: indirect"));
}

#[test]
fn test_indirect_indefinite_P_rejected() {
    // positive diagonal but eigenvalues 3 and -1
    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1., 2., 1.]);
    let A = CscMatrix::<f64>::identity(2);
    let (q, l, u) = (vec![0., 0.], vec![-1., -1.], vec![1., 1.]);

    for linsys_solver in [LinsysSolver::Direct, LinsysSolver::Indirect] {
        let result = Workspace::setup(&P, &A, &q, &l, &u, settings_with(linsys_solver));
        assert!(matches!(result, Err(SolverError::NonConvex)));
    }

    // the same matrix loaded by an update is rejected as well
    let (Pgood, A, q, l, u) = indirect_test_data();
    let mut workspace =
        Workspace::setup(&Pgood, &A, &q, &l, &u, settings_with(LinsysSolver::Indirect)).unwrap();
    let err = workspace.update_P(&P.nzval, None).unwrap_err();
    assert_eq!(err, SolverError::NonConvex);
    assert_eq!(workspace.solve().unwrap().status, SolverStatus::Solved);
}

#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn warm_start_data() -> (CscMatrix<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
    let A = CscMatrix::new(3, 2, vec![0, 2, 4], vec![0, 1, 0, 2], vec![1., 1., 1., 1.]);
    (P, A, vec![1., 1.], vec![1., 0., 0.], vec![1., 0.7, 0.7])
}

fn warm_start_settings(warm_start: bool) -> Settings<f64> {
    SettingsBuilder::default()
        .verbose(false)
        .warm_start(warm_start)
        .build()
        .unwrap()
}

#[test]
fn test_warm_start_from_solution() {
    let (P, A, q, l, u) = warm_start_data();

    // a tightly solved point
    let tight = SettingsBuilder::default()
        .verbose(false)
        .eps_abs(1e-10)
        .eps_rel(1e-10)
        .build()
        .unwrap();
    let mut reference = Workspace::setup(&P, &A, &q, &l, &u, tight).unwrap();
    let sol = reference.solve().unwrap().clone();

    let mut workspace = Workspace::setup(&P, &A, &q, &l, &u, warm_start_settings(false)).unwrap();
    workspace.warm_start(Some(&sol.x[..]), Some(&sol.y[..])).unwrap();
    let solution = workspace.solve().unwrap();

    // converged at the first termination check
    assert_eq!(solution.status, SolverStatus::Solved);
    assert_eq!(solution.iterations, 25);

    // after an update, a solve without warm starting begins again from zero
    let cold_iterations = {
        let mut cold = Workspace::setup(&P, &A, &q, &l, &u, warm_start_settings(false)).unwrap();
        cold.solve().unwrap().iterations
    };
    workspace.update_lin_cost(&q).unwrap();
    assert_eq!(workspace.solve().unwrap().iterations, cold_iterations);
}

#[test]
fn test_warm_start_previous_iterate() {
    let (P, A, q, l, u) = warm_start_data();
    let mut workspace = Workspace::setup(&P, &A, &q, &l, &u, warm_start_settings(true)).unwrap();

    let first = workspace.solve().unwrap().iterations;

    // rewriting the same cost forces a new solve from the last iterate
    workspace.update_lin_cost(&q).unwrap();
    let second = workspace.solve().unwrap().iterations;
    assert!(second <= first);
    assert_eq!(second, 25);
}

#[test]
fn test_repeat_solve_keeps_solution() {
    let (P, A, q, l, u) = warm_start_data();

    for polish in [false, true] {
        let settings = SettingsBuilder::default()
            .verbose(false)
            .polish(polish)
            .build()
            .unwrap();
        let mut workspace = Workspace::setup(&P, &A, &q, &l, &u, settings).unwrap();

        let first = workspace.solve().unwrap().clone();
        let second = workspace.solve().unwrap().clone();
        assert_eq!(second.status, SolverStatus::Solved);
        assert_eq!(second.iterations, first.iterations);
        assert_eq!(second.x, first.x);
        assert_eq!(second.y, first.y);
        assert_eq!(second.obj_val, first.obj_val);
        assert_eq!(workspace.info().unwrap().solve_time, 0.);
        assert_eq!(
            workspace.state(),
            WorkspaceState::Terminated(SolverStatus::Solved)
        );

        // a warm start, even to the same point, means a new solve
        workspace.warm_start(Some(&first.x[..]), None).unwrap();
        let third = workspace.solve().unwrap();
        assert_eq!(third.status, SolverStatus::Solved);
        assert!(workspace.info().unwrap().solve_time > 0.);
    }
}

#[test]
fn test_warm_start_primal_only() {
    let (P, A, q, l, u) = warm_start_data();
    let mut workspace = Workspace::setup(&P, &A, &q, &l, &u, warm_start_settings(false)).unwrap();
    workspace.warm_start(Some(&[0.3, 0.7][..]), None).unwrap();
    let solution = workspace.solve().unwrap();
    assert_eq!(solution.status, SolverStatus::Solved);
    assert!((solution.x[0] - 0.3).abs() <= 1e-2);
}

#[test]
fn test_warm_start_bad_input() {
    let (P, A, q, l, u) = warm_start_data();
    let mut workspace = Workspace::setup(&P, &A, &q, &l, &u, warm_start_settings(true)).unwrap();

    assert_eq!(
        workspace.warm_start(Some(&[0.][..]), None).unwrap_err(),
        SolverError::DataValidation(DataValidationError::IncompatibleDimension("x"))
    );
    assert_eq!(
        workspace.warm_start(None, Some(&[0., 0.][..])).unwrap_err(),
        SolverError::DataValidation(DataValidationError::IncompatibleDimension("y"))
    );
    assert_eq!(
        workspace
            .warm_start(None, Some(&[0., f64::NAN, 0.][..]))
            .unwrap_err(),
        SolverError::DataValidation(DataValidationError::NotFinite("y"))
    );
}

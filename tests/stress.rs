#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

// repeated parametric solves on a single workspace
#[test]
fn test_repeated_update_and_solve() {
    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
    let A = CscMatrix::new(3, 2, vec![0, 2, 4], vec![0, 1, 0, 2], vec![1., 1., 1., 1.]);
    let settings = Settings {
        verbose: false,
        ..Settings::default()
    };
    let mut workspace =
        Workspace::setup(&P, &A, &[1., 1.], &[1., 0., 0.], &[1., 0.7, 0.7], settings).unwrap();

    for k in 0..2000 {
        let t = k as f64 * 0.01;
        workspace.update_lin_cost(&[t.cos(), t.sin()]).unwrap();
        let solution = workspace.solve().unwrap();
        assert_eq!(solution.status, SolverStatus::Solved);

        // x0 + x1 = 1 with both in [0, 0.7]
        assert!((solution.x[0] + solution.x[1] - 1.).abs() <= 1e-2);
        assert!(solution.x.iter().all(|&v| (-1e-2..=0.71).contains(&v)));
    }
    workspace.cleanup().unwrap();
}

// a larger banded problem solved many times with shifting bounds
#[test]
fn test_banded_bounds_sweep() {
    let n = 50;

    // tridiagonal P, upper triangle: 2 on the diagonal, -1 above it
    let mut colptr = vec![0];
    let mut rowval = vec![];
    let mut nzval = vec![];
    for j in 0..n {
        if j > 0 {
            rowval.push(j - 1);
            nzval.push(-1.);
        }
        rowval.push(j);
        nzval.push(2.);
        colptr.push(rowval.len());
    }
    let P = CscMatrix::new(n, n, colptr, rowval, nzval);
    let A = CscMatrix::identity(n);
    let q: Vec<f64> = (0..n).map(|i| ((i % 7) as f64) - 3.).collect();

    let settings = Settings {
        verbose: false,
        ..Settings::default()
    };
    let mut workspace =
        Workspace::setup(&P, &A, &q, &vec![-1.; n], &vec![1.; n], settings).unwrap();

    for k in 0..100 {
        let b = 0.5 + 0.01 * k as f64;
        workspace
            .update_bounds(&vec![-b; n], &vec![b; n])
            .unwrap();
        let solution = workspace.solve().unwrap();
        assert_eq!(solution.status, SolverStatus::Solved);
        assert!(solution.x.iter().all(|&v| v.abs() <= b + 1e-2));
    }
}

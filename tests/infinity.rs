#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

// min ½x² - 2e4·x s.t. 0 <= x <= 1e4
fn bounded_workspace() -> Workspace<f64> {
    let P = CscMatrix::identity(1);
    let A = CscMatrix::identity(1);
    let settings = SettingsBuilder::default()
        .verbose(false)
        .eps_abs(1e-6)
        .eps_rel(1e-6)
        .build()
        .unwrap();
    Workspace::setup(&P, &A, &[-2e4], &[0.], &[1e4], settings).unwrap()
}

// the infinity bound is global, so everything runs in a single test
#[test]
fn test_infinity_bound() {
    assert_eq!(get_infinity(), 1e30);

    let mut workspace = bounded_workspace();
    let x = workspace.solve().unwrap().x[0];
    assert!((x - 1e4).abs() <= 1e-2 * 1e4);

    // the upper bound is now beyond infinity and is clipped
    set_infinity(1e3);
    assert_eq!(get_infinity(), 1e3);
    let mut workspace = bounded_workspace();
    let x = workspace.solve().unwrap().x[0];
    assert!((x - 1e3).abs() <= 1e-2 * 1e3);

    default_infinity();
    assert_eq!(get_infinity(), 1e30);
}

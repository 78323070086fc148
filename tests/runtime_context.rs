#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

fn runtime_test_workspace() -> Workspace<f64> {
    let P = CscMatrix::identity(2);
    let A = CscMatrix::identity(2);
    let settings = Settings {
        verbose: false,
        ..Settings::default()
    };
    Workspace::setup(&P, &A, &[1., -1.], &[-1., -1.], &[1., 1.], settings).unwrap()
}

// counts are process-wide, so this binary holds exactly one test
#[test]
fn test_runtime_context_lifetime() {
    assert_eq!(RuntimeContext::active_count(), 0);

    let mut ws1 = runtime_test_workspace();
    assert_eq!(RuntimeContext::active_count(), 1);

    let ws2 = runtime_test_workspace();
    assert_eq!(RuntimeContext::active_count(), 2);

    // released by cleanup
    ws1.cleanup().unwrap();
    assert_eq!(RuntimeContext::active_count(), 1);

    // and by drop
    drop(ws2);
    assert_eq!(RuntimeContext::active_count(), 0);

    // a new workspace brings the context back
    let ctx_users = {
        let _ws3 = runtime_test_workspace();
        RuntimeContext::active_count()
    };
    assert_eq!(ctx_users, 1);
    assert_eq!(RuntimeContext::active_count(), 0);

    let ctx = RuntimeContext::acquire();
    assert!(ctx.is_available(LinsysSolver::Direct));
    assert_eq!(ctx.backends().len(), if cfg!(feature = "indirect") { 2 } else { 1 });
}

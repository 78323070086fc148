#![allow(non_snake_case)]
use crate::algebra::*;

fn test_matrix_4x4_triu() -> CscMatrix<f64> {
    // A =
    //[ 4.0  -3.0   7.0    ⋅ ]
    //[  ⋅    8.0  -1.0    ⋅ ]
    //[  ⋅     ⋅    2.0  -3.0]
    //[  ⋅     ⋅     ⋅    1.0]
    let Ap = vec![0, 1, 3, 6, 8];
    let Ai = vec![0, 0, 1, 0, 1, 2, 2, 3];
    let Ax = vec![4., -3., 8., 7., -1., 2., -3., 1.];
    CscMatrix::new(4, 4, Ap, Ai, Ax)
}

fn test_matrix_4x4() -> CscMatrix<f64> {
    // A =
    //[ 4.0  -3.0   7.0    ⋅ ]
    //[  ⋅    8.0  -1.0    ⋅ ]
    //[ 1.0    ⋅    2.0  -3.0]
    //[  ⋅   -1.0    ⋅    1.0]
    let Ap = vec![0, 2, 5, 8, 10];
    let Ai = vec![0, 2, 0, 1, 3, 0, 1, 2, 2, 3];
    let Ax = vec![4., 1., -3., 8., -1., 7., -1., 2., -3., 1.];
    CscMatrix::new(4, 4, Ap, Ai, Ax)
}

fn test_matrix_3x4() -> CscMatrix<f64> {
    // A =
    //[-1.0  -17.0  6.0  10.0]
    //[ 3.0     ⋅   7.0    ⋅ ]
    //[  ⋅    -4.0   ⋅   -5.0]
    let Ap = vec![0, 2, 4, 6, 8];
    let Ai = vec![0, 1, 0, 2, 0, 1, 0, 2];
    let Ax = vec![-1., 3., -17., -4., 6., 7., 10., -5.];
    CscMatrix::new(3, 4, Ap, Ai, Ax)
}

#[test]
fn test_nrows_ncols_nnz_is_square() {
    let A = test_matrix_3x4();
    let B = test_matrix_4x4_triu();
    assert_eq!(A.size(), (3, 4));
    assert_eq!(B.size(), (4, 4));
    assert!(!A.is_square());
    assert!(B.is_square());
    assert_eq!(A.nnz(), 8);
    assert_eq!(B.nnz(), 8);
    assert_eq!(CscMatrix::<f64>::zeros((3, 0)).nnz(), 0);
}

#[test]
fn test_from_dense() {
    let A = CscMatrix::from(&[
        [-1., -17., 6., 10.], //
        [3., 0., 7., 0.],     //
        [0., -4., 0., -5.],   //
    ]);
    assert_eq!(A, test_matrix_3x4());
}

#[test]
fn test_check_format() {
    assert!(test_matrix_3x4().check_format().is_ok());

    // unsorted rows within a column are accepted
    let A = CscMatrix::new(3, 1, vec![0, 2], vec![2, 0], vec![1., 2.]);
    assert!(A.check_format().is_ok());
    assert!(!A.is_sorted());

    // repeated entries are not
    let A = CscMatrix::new(3, 1, vec![0, 3], vec![2, 0, 2], vec![1., 2., 3.]);
    assert_eq!(
        A.check_format(),
        Err(SparseFormatError::DuplicateEntry { row: 2, col: 0 })
    );

    let A = CscMatrix::new(2, 1, vec![0, 1], vec![2], vec![1.]);
    assert_eq!(
        A.check_format(),
        Err(SparseFormatError::BadRowval { row: 2, m: 2 })
    );

    let A = CscMatrix::new(2, 2, vec![0, 1, 0], vec![0], vec![1.]);
    assert!(A.check_format().is_err());

    let A = CscMatrix::new(2, 1, vec![0, 1], vec![0], vec![1., 2.]);
    assert_eq!(
        A.check_format(),
        Err(SparseFormatError::IncompatibleDimension)
    );
}

#[test]
fn test_sorted() {
    let A = CscMatrix::new(3, 2, vec![0, 3, 4], vec![2, 0, 1, 1], vec![1., 2., 3., 4.]);
    let B = A.sorted();
    assert!(B.is_sorted());
    assert_eq!(B.rowval, vec![0, 1, 2, 1]);
    assert_eq!(B.nzval, vec![2., 3., 1., 4.]);
}

#[test]
fn test_col_norms() {
    let A = test_matrix_3x4();
    let mut v = vec![0., -30., 12., 4.]; //big values should be ignored
    A.col_norms(&mut v);
    assert_eq!(v, vec![3., 17., 7., 10.]);

    let mut v = vec![0., -30., 12., 4.]; //big values should NOT be ignored
    A.col_norms_no_reset(&mut v);
    assert_eq!(v, vec![3., 17., 12., 10.]);
}

#[test]
fn test_col_norms_sym() {
    let A = test_matrix_4x4_triu();
    let mut v = vec![0., -30., 20., 4.];
    A.col_norms_sym(&mut v);
    assert_eq!(v, vec![7., 8., 7., 3.]);

    let mut v = vec![0., -30., 12., 4.];
    A.col_norms_sym_no_reset(&mut v);
    assert_eq!(v, vec![7., 8., 12., 4.]);
}

#[test]
fn test_row_norms() {
    let A = test_matrix_3x4();
    let mut v = vec![0., -30., 12.];
    A.row_norms(&mut v);
    assert_eq!(v, vec![17., 7., 5.]);

    let mut v = vec![0., -30., 12.];
    A.row_norms_no_reset(&mut v);
    assert_eq!(v, vec![17., 7., 12.]);
}

#[test]
fn test_matrix_norms() {
    let A = test_matrix_3x4();
    assert_eq!(A.norm_inf(), 17.);
    let B = CscMatrix::from(&[[3., 0.], [0., 4.]]);
    assert_eq!(B.norm_fro(), 5.);
}

#[test]
fn test_lrscaling() {
    let l = vec![2., -1., 3.];
    let r = vec![2., -1., 1., 4.];

    let mut A = test_matrix_3x4();
    A.lscale(&l);
    assert_eq!(A.nzval, vec![-2., -3., -34., -12., 12., -7., 20., -15.]);

    let mut A = test_matrix_3x4();
    A.rscale(&r);
    assert_eq!(A.nzval, vec![-2., 6., 17., 4., 6., 7., 40., -20.]);

    let mut A = test_matrix_3x4();
    A.lrscale(&l, &r);
    assert_eq!(A.nzval, vec![-4., -6., 34., 12., 12., -7., 80., -60.]);
}

#[test]
fn test_gemv() {
    let A = test_matrix_3x4();
    let x = vec![1., 2., 3., 4.];

    let mut y = vec![f64::NAN; 3];
    A.gemv(&mut y, &x, 1., 0.);
    assert_eq!(y, vec![23., 24., -28.]);

    let mut y = vec![1., 1., 1.];
    A.gemv(&mut y, &x, 2., 1.);
    assert_eq!(y, vec![47., 49., -55.]);

    let mut y = vec![0.; 4];
    A.t().gemv(&mut y, &[1., 2., 3.], 1., 0.);
    assert_eq!(y, vec![5., -29., 20., -5.]);
}

#[test]
fn test_symv_and_quad_form() {
    let A = test_matrix_4x4_triu();
    let x = vec![1., 2., 3., 4.];
    let mut y = vec![0.; 4];

    A.sym().symv(&mut y, &x, 1., 0.);
    assert_eq!(y, vec![19., 10., -1., -5.]);
    assert_eq!(A.quad_form(&x, &x), 16.);
}

#[test]
fn test_matrix_to_triu() {
    let B = test_matrix_4x4().to_triu();
    assert_eq!(B, test_matrix_4x4_triu());
    assert!(B.is_triu());
    assert!(!test_matrix_4x4().is_triu());

    let I = CscMatrix::<f64>::identity(4);
    assert_eq!(I.to_triu(), I);
}

#[test]
#[should_panic]
fn test_matrix_to_triu_notsquare() {
    let A = CscMatrix::<f64>::spalloc(5, 4, 0);
    let _ = A.to_triu();
}

#[test]
fn test_matrix_select_rows() {
    let A = test_matrix_3x4();

    let Ared = A.select_rows(&[2, 0]);
    let B = CscMatrix::from(&[
        [0., -4., 0., -5.],   //
        [-1., -17., 6., 10.], //
    ]);
    assert_eq!(Ared, B);

    let Ared = A.select_rows(&[]);
    assert_eq!(Ared.size(), (0, 4));
    assert_eq!(Ared.colptr, vec![0, 0, 0, 0, 0]);
}

#[test]
fn test_index_lookup() {
    let A = test_matrix_3x4();
    assert_eq!(A.index_of((2, 1)), Some(3));
    assert_eq!(A.index_of((1, 1)), None);
    assert_eq!(A.get_entry((0, 3)), Some(10.));

    assert_eq!(A.index_to_coord(0), (0, 0));
    assert_eq!(A.index_to_coord(3), (2, 1));
    assert_eq!(A.index_to_coord(7), (2, 3));

    // empty leading column
    let B = CscMatrix::new(1, 2, vec![0, 0, 1], vec![0], vec![1.]);
    assert_eq!(B.index_to_coord(0), (0, 1));
}

#[test]
fn test_update_values() {
    let mut A = test_matrix_3x4();

    A.update_values(&[100., 200.], Some(&[0, 7])).unwrap();
    assert_eq!(A.get_entry((0, 0)), Some(100.));
    assert_eq!(A.get_entry((2, 3)), Some(200.));

    let err = A.update_values(&[1.], Some(&[8]));
    assert_eq!(err, Err(SparseFormatError::IndexOutOfPattern { index: 8, nnz: 8 }));
    assert_eq!(A.get_entry((2, 3)), Some(200.));

    assert!(A.update_values(&[1.; 7], None).is_err());
    A.update_values(&[1.; 8], None).unwrap();
    assert!(A.nzval.iter().all(|&v| v == 1.));
}

#[test]
fn test_count_diagonal_entries() {
    let A = test_matrix_4x4_triu();
    let C = CscMatrix::new(4, 4, vec![0, 1, 2, 5, 7], vec![0, 0, 0, 1, 2, 2, 3], vec![1.; 7]);
    assert_eq!(C.count_diagonal_entries(), 3);
    assert_eq!(A.count_diagonal_entries(), 4);
}

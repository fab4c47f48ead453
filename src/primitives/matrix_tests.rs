pub(crate) use super::*;

#[test]
fn test_from_vec() {
    let m = Matrix::<f64>::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    assert_eq!(m.shape(), (2, 3));
    assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
    assert!((m.get(1, 2) - 6.0).abs() < 1e-12);
}

#[test]
fn test_from_vec_error() {
    let result = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0]);
    assert!(matches!(
        result,
        Err(HeveaError::DimensionMismatch {
            expected: 6,
            actual: 3,
            ..
        })
    ));
}

#[test]
fn test_from_rows() {
    let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
    let m = Matrix::from_rows(&rows).expect("rectangular rows");
    assert_eq!(m.shape(), (3, 2));
    assert_eq!(m.row(2), &[5.0, 6.0]);
}

#[test]
fn test_from_rows_ragged() {
    let rows = vec![vec![1.0, 2.0], vec![3.0], vec![5.0, 6.0]];
    let err = Matrix::from_rows(&rows).expect_err("ragged rows must fail");
    assert!(matches!(
        err,
        HeveaError::DimensionMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn test_from_rows_empty() {
    let rows: Vec<Vec<f64>> = Vec::new();
    let err = Matrix::from_rows(&rows).expect_err("empty rows must fail");
    assert!(matches!(err, HeveaError::EmptyTrainingSet { .. }));
}

#[test]
fn test_zeros() {
    let m = Matrix::zeros(2, 3);
    assert_eq!(m.shape(), (2, 3));
    assert!(m.as_slice().iter().all(|&x| x == 0.0));
}

#[test]
fn test_set_and_get() {
    let mut m = Matrix::zeros(3, 2);
    m.set(1, 1, 7.5);
    assert_eq!(m.get(1, 1), 7.5);
    assert_eq!(m.row(2), &[0.0, 0.0]);
}

#[test]
fn test_rows_iterator() {
    let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("2x2");
    let rows: Vec<&[f64]> = m.rows().collect();
    assert_eq!(rows, vec![&[1.0, 2.0][..], &[3.0, 4.0][..]]);
}

#[test]
fn test_select_rows_preserves_order() {
    let m = Matrix::from_vec(3, 1, vec![10.0, 20.0, 30.0]).expect("3x1");
    let picked = m.select_rows(&[2, 0]);
    assert_eq!(picked.as_slice(), &[30.0, 10.0]);
}

#[test]
fn test_select_columns() {
    let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("2x3");
    let picked = m.select_columns(&[0, 2]).expect("valid columns");
    assert_eq!(picked.shape(), (2, 2));
    assert_eq!(picked.as_slice(), &[1.0, 3.0, 4.0, 6.0]);
    assert!(m.select_columns(&[3]).is_err());
}

#[test]
fn test_is_finite() {
    let mut m = Matrix::zeros(1, 2);
    assert!(m.is_finite());
    m.set(0, 1, f64::NAN);
    assert!(!m.is_finite());
}

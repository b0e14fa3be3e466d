use super::*;
use crate::error::GradGraphError;

#[test]
fn test_zeros() {
    let t = zeros(2, 3).unwrap();
    assert_eq!(t.shape(), [2, 3]);
    assert_eq!(t.strides(), [3, 1]);
    assert_eq!(t.numel(), 6);
    assert!(t.to_vec().iter().all(|&x| x == 0.0));
}

#[test]
fn test_zero_dimension_is_rejected() {
    assert_eq!(
        zeros(0, 3).unwrap_err(),
        GradGraphError::InvalidShape { rows: 0, cols: 3 }
    );
    assert!(Tensor::new(vec![], 2, 0).is_err());
}

#[test]
fn test_oversized_allocation_fails_instead_of_aborting() {
    let result = zeros(usize::MAX, 2);
    assert!(matches!(result, Err(GradGraphError::AllocationFailure { .. })));
}

#[test]
fn test_full_and_fill() {
    let mut t = full(2, 2, 4.5).unwrap();
    assert_eq!(t.to_vec(), vec![4.5; 4]);
    t.fill(-1.0);
    assert_eq!(t.to_vec(), vec![-1.0; 4]);
    t.reset();
    assert_eq!(t.to_vec(), vec![0.0; 4]);
}

#[test]
fn test_new_checks_length() {
    let err = Tensor::new(vec![1.0, 2.0, 3.0], 2, 2).unwrap_err();
    assert!(matches!(err, GradGraphError::InvalidArgument(_)));
}

#[test]
fn test_from_rows() {
    let t = Tensor::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]).unwrap();
    assert_eq!(t.shape(), [3, 2]);
    assert_eq!(t.get(2, 1).unwrap(), 6.0);
    assert!(Tensor::from_rows(&[&[1.0, 2.0], &[3.0]]).is_err());
}

#[test]
fn test_get_and_set_bounds() {
    let mut t = zeros(2, 2).unwrap();
    t.set_at(1, 0, 7.0).unwrap();
    assert_eq!(t.get(1, 0).unwrap(), 7.0);
    assert_eq!(
        t.get(2, 0).unwrap_err(),
        GradGraphError::IndexOutOfBounds { index: [2, 0], shape: [2, 2] }
    );
}

#[test]
fn test_scalar() {
    let s = Tensor::scalar(3.0);
    assert_eq!(s.shape(), [1, 1]);
    assert_eq!(s.to_vec(), vec![3.0]);
}

#[test]
fn test_display_format() {
    let t = Tensor::from_rows(&[&[1.0, -0.5]]).unwrap();
    assert_eq!(format!("{}", t), "+1.000 -0.500 \n");
}

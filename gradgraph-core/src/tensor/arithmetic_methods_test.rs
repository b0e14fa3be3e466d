use super::*;
use crate::error::GradGraphError;
use crate::utils::testing::{check_tensor_near, create_test_tensor};

#[test]
fn test_add_same_shape() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
    let b = create_test_tensor(vec![5.0, 6.0, 7.0, 8.0], 2, 2);
    let out = a.add(&b).unwrap();
    check_tensor_near(&out, [2, 2], &[6.0, 8.0, 10.0, 12.0], 1e-6);
}

#[test]
fn test_add_broadcasts_row_vector() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
    let b = create_test_tensor(vec![10.0, 20.0], 1, 2);
    let out = a.add(&b).unwrap();
    check_tensor_near(&out, [3, 2], &[11.0, 22.0, 13.0, 24.0, 15.0, 26.0], 1e-6);
}

#[test]
fn test_sub_broadcasts_column_vector() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
    let b = create_test_tensor(vec![1.0, 2.0], 2, 1);
    let out = a.sub(&b).unwrap();
    check_tensor_near(&out, [2, 2], &[0.0, 1.0, 1.0, 2.0], 1e-6);
}

#[test]
fn test_mul_by_scalar_tensor() {
    let a = create_test_tensor(vec![1.0, -2.0, 3.0], 1, 3);
    let out = a.mul(&Tensor::scalar(-2.0)).unwrap();
    check_tensor_near(&out, [1, 3], &[-2.0, 4.0, -6.0], 1e-6);
}

#[test]
fn test_broadcast_is_one_directional() {
    let a = create_test_tensor(vec![1.0, 2.0], 1, 2);
    let b = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
    assert_eq!(
        a.add(&b).unwrap_err(),
        GradGraphError::BroadcastError { from: [2, 2], onto: [1, 2] }
    );
}

#[test]
fn test_incompatible_shapes_fail() {
    let a = create_test_tensor(vec![1.0; 6], 2, 3);
    let b = create_test_tensor(vec![1.0; 4], 2, 2);
    assert!(matches!(a.mul(&b), Err(GradGraphError::BroadcastError { .. })));
}

#[test]
fn test_div_by_zero_propagates_ieee() {
    let a = create_test_tensor(vec![1.0, 0.0], 1, 2);
    let b = create_test_tensor(vec![0.0, 0.0], 1, 2);
    let out = a.div(&b).unwrap();
    assert!(out.get(0, 0).unwrap().is_infinite());
    assert!(out.get(0, 1).unwrap().is_nan());
}

#[test]
fn test_in_place_ops() {
    let mut a = create_test_tensor(vec![2.0, 4.0, 6.0, 8.0], 2, 2);
    a.div_(&Tensor::scalar(2.0)).unwrap();
    check_tensor_near(&a, [2, 2], &[1.0, 2.0, 3.0, 4.0], 1e-6);
    a.sub_(&create_test_tensor(vec![1.0, 1.0], 1, 2)).unwrap();
    check_tensor_near(&a, [2, 2], &[0.0, 1.0, 2.0, 3.0], 1e-6);
}

#[test]
fn test_into_requires_destination_shape() {
    let a = create_test_tensor(vec![1.0; 4], 2, 2);
    let b = create_test_tensor(vec![1.0; 4], 2, 2);
    let mut dst = zeros(1, 4).unwrap();
    let err = Tensor::add_into(&mut dst, &a, &b).unwrap_err();
    assert!(matches!(err, GradGraphError::ShapeMismatch { .. }));

    let mut dst = zeros(2, 2).unwrap();
    Tensor::mul_into(&mut dst, &a, &b).unwrap();
    check_tensor_near(&dst, [2, 2], &[1.0; 4], 1e-6);
}

#[test]
fn test_in_place_on_transposed_view() {
    let mut a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
    a.transpose_();
    a.add_(&create_test_tensor(vec![10.0, 100.0], 1, 2)).unwrap();
    check_tensor_near(&a, [3, 2], &[11.0, 104.0, 12.0, 105.0, 13.0, 106.0], 1e-6);
}

#[test]
fn test_map_variants() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0], 3, 1);
    let squared = a.map(|x| x * x).unwrap();
    check_tensor_near(&squared, [3, 1], &[1.0, 4.0, 9.0], 1e-6);

    let mut b = a.clone();
    b.map_(|x| -x);
    check_tensor_near(&b, [3, 1], &[-1.0, -2.0, -3.0], 1e-6);

    let mut dst = zeros(3, 1).unwrap();
    Tensor::map_into(&mut dst, &a, |x| x + 0.5).unwrap();
    check_tensor_near(&dst, [3, 1], &[1.5, 2.5, 3.5], 1e-6);
}

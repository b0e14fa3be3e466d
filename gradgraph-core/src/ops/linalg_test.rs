use super::linalg::*;
use super::*;
use crate::utils::testing::{check_tensor_near, create_test_tensor};

#[test]
fn test_contract_backward_identity_weights() {
    let x = create_test_tensor(vec![1.0, 2.0], 1, 2);
    let w = create_test_tensor(vec![1.0, 0.0, 0.0, 1.0], 2, 2);
    let grad = create_test_tensor(vec![1.0, 1.0], 1, 2);
    let grads = contract_backward(&grad, &x, &w).unwrap();
    check_tensor_near(&grads[0], [1, 2], &[1.0, 1.0], 1e-6);
    check_tensor_near(&grads[1], [2, 2], &[1.0, 1.0, 2.0, 2.0], 1e-6);
}

#[test]
fn test_contract_backward_shapes() {
    let a = Tensor::full(3, 4, 1.0).unwrap();
    let b = Tensor::full(4, 2, 2.0).unwrap();
    let grad = Tensor::full(3, 2, 1.0).unwrap();
    let grads = contract_backward(&grad, &a, &b).unwrap();
    check_tensor_near(&grads[0], [3, 4], &[4.0; 12], 1e-6);
    check_tensor_near(&grads[1], [4, 2], &[3.0; 8], 1e-6);
}

#[test]
fn test_contract_backward_leaves_operands_untouched() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
    let b = create_test_tensor(vec![1.0, -1.0, 0.5, 2.0, 0.0, 1.0], 3, 2);
    let grad = create_test_tensor(vec![1.0, 0.0, 0.0, 1.0], 2, 2);
    let grads = contract_backward(&grad, &a, &b).unwrap();
    // g · bᵀ and aᵀ · g with g = I.
    check_tensor_near(&grads[0], [2, 3], &[1.0, 0.5, 0.0, -1.0, 2.0, 1.0], 1e-6);
    check_tensor_near(&grads[1], [3, 2], &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0], 1e-6);
    assert!(grads.iter().all(|g| g.is_contiguous()));
    assert_eq!(a.shape(), [2, 3]);
    assert_eq!(b.shape(), [3, 2]);
}

#[test]
fn test_transpose_backward() {
    let grad = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
    let grads = transpose_backward(&grad).unwrap();
    check_tensor_near(&grads[0], [2, 3], &[1.0, 3.0, 5.0, 2.0, 4.0, 6.0], 1e-6);
}

#[test]
fn test_forward_dispatch_contract() {
    let x = create_test_tensor(vec![1.0, 2.0], 1, 2);
    let w = create_test_tensor(vec![1.0, 0.0, 0.0, 1.0], 2, 2);
    let y = forward(NodeKind::Contract, &x, Some(&w)).unwrap();
    check_tensor_near(&y, [1, 2], &[1.0, 2.0], 1e-6);
}

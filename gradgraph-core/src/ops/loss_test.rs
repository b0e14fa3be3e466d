use super::loss::*;
use super::*;
use crate::utils::testing::{check_tensor_near, create_test_tensor};

#[test]
fn test_mse_single_sample() {
    let output = Tensor::scalar(0.8);
    let expected = Tensor::scalar(1.0);
    let loss = mse_forward(&output, &expected).unwrap();
    check_tensor_near(&loss, [1, 1], &[0.04], 1e-6);

    let grads = mse_backward(&Tensor::scalar(1.0), &output, &expected).unwrap();
    check_tensor_near(&grads[0], [1, 1], &[-0.4], 1e-6);
    check_tensor_near(&grads[1], [1, 1], &[0.4], 1e-6);
}

#[test]
fn test_mse_averages_over_rows() {
    let output = create_test_tensor(vec![1.0, 1.0, 0.0, 0.0], 2, 2);
    let expected = Tensor::zeros(2, 2).unwrap();
    let loss = mse_forward(&output, &expected).unwrap();
    check_tensor_near(&loss, [1, 1], &[1.0], 1e-6);
    let grads = mse_backward(&Tensor::scalar(1.0), &output, &expected).unwrap();
    check_tensor_near(&grads[0], [2, 2], &[1.0, 1.0, 0.0, 0.0], 1e-6);
}

#[test]
fn test_cross_entropy() {
    let p = create_test_tensor(vec![0.5, 0.5], 1, 2);
    let y = create_test_tensor(vec![1.0, 0.0], 1, 2);
    let loss = cross_entropy_forward(&p, &y).unwrap();
    check_tensor_near(&loss, [1, 1], &[std::f32::consts::LN_2], 1e-6);
    let grads = cross_entropy_backward(&Tensor::scalar(1.0), &p, &y).unwrap();
    check_tensor_near(&grads[0], [1, 2], &[-2.0, 0.0], 1e-6);
    check_tensor_near(&grads[1], [1, 2], &[std::f32::consts::LN_2; 2], 1e-6);
}

#[test]
fn test_binary_cross_entropy() {
    let p = Tensor::scalar(0.5);
    let y = Tensor::scalar(1.0);
    let loss = binary_cross_entropy_forward(&p, &y).unwrap();
    check_tensor_near(&loss, [1, 1], &[std::f32::consts::LN_2], 1e-6);
    let grads = binary_cross_entropy_backward(&Tensor::scalar(1.0), &p, &y).unwrap();
    check_tensor_near(&grads[0], [1, 1], &[-2.0], 1e-6);
    check_tensor_near(&grads[1], [1, 1], &[0.0], 1e-6);
}

#[test]
fn test_loss_dispatch_scales_by_upstream_gradient() {
    let output = Tensor::scalar(0.8);
    let expected = Tensor::scalar(1.0);
    let loss = forward(NodeKind::Mse, &output, Some(&expected)).unwrap();
    let grads = backward(NodeKind::Mse, &Tensor::scalar(0.5), &loss, &output, Some(&expected)).unwrap();
    check_tensor_near(&grads[0], [1, 1], &[-0.2], 1e-6);
}

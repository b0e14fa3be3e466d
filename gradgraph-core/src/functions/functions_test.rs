use super::*;
use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_sigmoid_and_derivatives_agree() {
    assert_relative_eq!(sigmoid(0.0), 0.5);
    for &x in &[-3.0f32, -0.5, 0.0, 0.7, 2.5] {
        assert_abs_diff_eq!(sigmoid_dx(x), sigmoid_odx(sigmoid(x)), epsilon = 1e-6);
    }
}

#[test]
fn test_tanh_derivatives_agree() {
    for &x in &[-2.0f32, -0.1, 0.0, 0.3, 1.5] {
        assert_abs_diff_eq!(tanh_dx(x), tanh_odx(tanh(x)), epsilon = 1e-6);
    }
}

#[test]
fn test_relu_family() {
    assert_eq!(relu(-2.0), 0.0);
    assert_eq!(relu(3.0), 3.0);
    assert_eq!(relu_dx(-1.0), 0.0);
    assert_eq!(relu_odx(relu(4.0)), 1.0);
    assert_relative_eq!(leaky_relu(-2.0), -0.02);
    assert_eq!(leaky_relu(2.0), 2.0);
    assert_relative_eq!(leaky_relu_dx(-1.0), LEAKY_RELU_SLOPE);
    assert_relative_eq!(leaky_relu_odx(leaky_relu(-1.0)), LEAKY_RELU_SLOPE);
    assert_eq!(leaky_relu_odx(leaky_relu(1.0)), 1.0);
}

#[test]
fn test_domain_errors_propagate_nan() {
    assert!(ln(-1.0).is_nan());
    assert!(ln(0.0).is_infinite());
    assert!(reciprocal(0.0).is_infinite());
}

#[test]
fn test_combinators() {
    assert_eq!(scale(3.0)(2.0), 6.0);
    assert_eq!(shift(3.0)(2.0), 5.0);
    assert_eq!(subtract_from(3.0)(2.0), 1.0);
    assert_eq!(subtract(3.0)(2.0), -1.0);
    assert_eq!(divide_by(4.0)(2.0), 0.5);
    assert_eq!(divide_into(4.0)(2.0), 2.0);
    assert_relative_eq!(power(0.5)(9.0), 3.0, epsilon = 1e-6);
    assert_eq!(square(-3.0), 9.0);
    assert_eq!(reciprocal_square(2.0), 0.25);
    assert_eq!(neg(2.0), -2.0);
    assert_relative_eq!(exp(ln(5.0)), 5.0, epsilon = 1e-5);
}

#[test]
fn test_initialisers_stay_in_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let he_bound = (6.0f32 / 4.0).sqrt();
    let glorot_bound = (6.0f32 / 10.0).sqrt();
    for _ in 0..1000 {
        let u = random_uniform(&mut rng);
        assert!((-1.0..=1.0).contains(&u));
        assert!(he_uniform(&mut rng, 4).abs() <= he_bound);
        assert!(glorot_uniform(&mut rng, 4, 6).abs() <= glorot_bound);
        let o = random_offset(&mut rng, 10.0);
        assert!((9.0..=11.0).contains(&o));
    }
}

#[test]
fn test_seeded_initialisers_are_reproducible() {
    let mut a = StdRng::seed_from_u64(42);
    let mut b = StdRng::seed_from_u64(42);
    for _ in 0..10 {
        assert_eq!(he_uniform(&mut a, 3), he_uniform(&mut b, 3));
    }
}

//! Scalar arithmetic used to assemble loss derivatives and optimizer update rules
//! out of [`Tensor::map`](crate::tensor::Tensor::map) calls.
//!
//! None of these functions fail: domain errors such as `ln(-1.0)` or `reciprocal(0.0)`
//! yield NaN or infinity as IEEE-754 prescribes.

pub fn ln(x: f32) -> f32 {
    x.ln()
}

pub fn exp(x: f32) -> f32 {
    x.exp()
}

pub fn neg(x: f32) -> f32 {
    -x
}

pub fn square(x: f32) -> f32 {
    x * x
}

/// `x^-1`
pub fn reciprocal(x: f32) -> f32 {
    1.0 / x
}

/// `x^-2`
pub fn reciprocal_square(x: f32) -> f32 {
    1.0 / (x * x)
}

/// `x * n`
pub fn scale(n: f32) -> impl Fn(f32) -> f32 {
    move |x| x * n
}

/// `x + n`
pub fn shift(n: f32) -> impl Fn(f32) -> f32 {
    move |x| x + n
}

/// `n - x`
pub fn subtract_from(n: f32) -> impl Fn(f32) -> f32 {
    move |x| n - x
}

/// `x - n`
pub fn subtract(n: f32) -> impl Fn(f32) -> f32 {
    move |x| x - n
}

/// `x / n`
pub fn divide_by(n: f32) -> impl Fn(f32) -> f32 {
    move |x| x / n
}

/// `n / x`
pub fn divide_into(n: f32) -> impl Fn(f32) -> f32 {
    move |x| n / x
}

/// `x^n`
pub fn power(n: f32) -> impl Fn(f32) -> f32 {
    move |x| x.powf(n)
}

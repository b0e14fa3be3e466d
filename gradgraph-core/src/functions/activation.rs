//! Activation functions and their derivatives.
//!
//! `*_dx` derivatives take the raw input `x`. `*_odx` derivatives take the function's
//! own output `y = f(x)`, which lets a backward pass reuse the value cached in the node
//! instead of recomputing `f`.

/// Slope applied to negative inputs by [`leaky_relu`].
pub const LEAKY_RELU_SLOPE: f32 = 0.01;

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_dx(x: f32) -> f32 {
    let ex = (-x).exp();
    ex / ((1.0 + ex) * (1.0 + ex))
}

pub fn sigmoid_odx(y: f32) -> f32 {
    y * (1.0 - y)
}

pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

pub fn relu_dx(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// `relu(x) > 0` exactly when `x > 0`, so the output carries the same information.
pub fn relu_odx(y: f32) -> f32 {
    relu_dx(y)
}

pub fn leaky_relu(x: f32) -> f32 {
    if x < 0.0 {
        LEAKY_RELU_SLOPE * x
    } else {
        x
    }
}

pub fn leaky_relu_dx(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else {
        LEAKY_RELU_SLOPE
    }
}

pub fn leaky_relu_odx(y: f32) -> f32 {
    leaky_relu_dx(y)
}

pub fn tanh(x: f32) -> f32 {
    x.tanh()
}

pub fn tanh_dx(x: f32) -> f32 {
    let t = x.tanh();
    1.0 - t * t
}

pub fn tanh_odx(y: f32) -> f32 {
    1.0 - y * y
}

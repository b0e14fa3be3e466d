use crate::error::GradGraphError;
use crate::tensor::broadcast_utils::broadcast_strides;
use crate::tensor::create::zeros;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    #[inline]
    fn apply(self, x: f32, y: f32) -> f32 {
        match self {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => x / y,
        }
    }

    fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
        }
    }
}

fn check_dst_shape(dst: &Tensor, a: &Tensor, operation: &str) -> Result<(), GradGraphError> {
    if dst.shape != a.shape {
        return Err(GradGraphError::ShapeMismatch {
            expected: a.shape,
            actual: dst.shape,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// `dst[i, j] = a[i, j] OP broadcast(b)[i, j]` with `dst` distinct from both operands.
fn zip_into(dst: &mut Tensor, a: &Tensor, b: &Tensor, op: BinaryOp) -> Result<(), GradGraphError> {
    let bstrides = broadcast_strides(a.shape, b)?;
    check_dst_shape(dst, a, op.name())?;
    for i in 0..a.shape[0] {
        for j in 0..a.shape[1] {
            let y = b.data[i * bstrides[0] + j * bstrides[1]];
            let idx = dst.offset(i, j);
            dst.data[idx] = op.apply(a.data[a.offset(i, j)], y);
        }
    }
    Ok(())
}

/// Same as [`zip_into`] with `dst == a`. Each element is read and written at the same
/// offset, so a transposed view is updated through its own strides.
fn zip_in_place(a: &mut Tensor, b: &Tensor, op: BinaryOp) -> Result<(), GradGraphError> {
    let bstrides = broadcast_strides(a.shape, b)?;
    for i in 0..a.shape[0] {
        for j in 0..a.shape[1] {
            let y = b.data[i * bstrides[0] + j * bstrides[1]];
            let idx = a.offset(i, j);
            a.data[idx] = op.apply(a.data[idx], y);
        }
    }
    Ok(())
}

macro_rules! elementwise_methods {
    ($op:expr, $fresh:ident, $in_place:ident, $into:ident, $doc:literal) => {
        #[doc = concat!("Element-wise ", $doc, " with `other` broadcast onto `self`. Returns a new tensor shaped like `self`.")]
        pub fn $fresh(&self, other: &Tensor) -> Result<Tensor, GradGraphError> {
            let mut out = zeros(self.shape[0], self.shape[1])?;
            zip_into(&mut out, self, other, $op)?;
            Ok(out)
        }

        #[doc = concat!("In-place element-wise ", $doc, ": `self = self OP broadcast(other)`.")]
        pub fn $in_place(&mut self, other: &Tensor) -> Result<(), GradGraphError> {
            zip_in_place(self, other, $op)
        }

        #[doc = concat!("Element-wise ", $doc, " into an existing destination shaped like `a`.")]
        pub fn $into(dst: &mut Tensor, a: &Tensor, b: &Tensor) -> Result<(), GradGraphError> {
            zip_into(dst, a, b, $op)
        }
    };
}

impl Tensor {
    elementwise_methods!(BinaryOp::Add, add, add_, add_into, "addition");
    elementwise_methods!(BinaryOp::Sub, sub, sub_, sub_into, "subtraction");
    elementwise_methods!(BinaryOp::Mul, mul, mul_, mul_into, "multiplication");
    elementwise_methods!(BinaryOp::Div, div, div_, div_into, "division");

    /// Applies `f` to every element and returns the result in a new tensor.
    ///
    /// Used both for activations and for local derivatives during backward passes.
    /// Any context (an exponent, a fan-in/fan-out pair, an RNG) is captured by the closure.
    pub fn map<F>(&self, f: F) -> Result<Tensor, GradGraphError>
    where
        F: FnMut(f32) -> f32,
    {
        let mut out = zeros(self.shape[0], self.shape[1])?;
        Tensor::map_into(&mut out, self, f)?;
        Ok(out)
    }

    /// Applies `f` to every element in place.
    pub fn map_<F>(&mut self, mut f: F)
    where
        F: FnMut(f32) -> f32,
    {
        for i in 0..self.shape[0] {
            for j in 0..self.shape[1] {
                let idx = self.offset(i, j);
                self.data[idx] = f(self.data[idx]);
            }
        }
    }

    /// Writes `f(a[i, j])` into `dst[i, j]`; `dst` must be shaped like `a`.
    pub fn map_into<F>(dst: &mut Tensor, a: &Tensor, mut f: F) -> Result<(), GradGraphError>
    where
        F: FnMut(f32) -> f32,
    {
        check_dst_shape(dst, a, "map")?;
        for i in 0..a.shape[0] {
            for j in 0..a.shape[1] {
                let idx = dst.offset(i, j);
                dst.data[idx] = f(a.data[a.offset(i, j)]);
            }
        }
        Ok(())
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Sets every element to zero. Equivalent to `fill(0.0)`.
    pub fn reset(&mut self) {
        self.fill(0.0);
    }
}

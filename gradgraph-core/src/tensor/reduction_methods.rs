use crate::error::GradGraphError;
use crate::tensor::create::zeros;
use crate::tensor::{Tensor, MAX_RANK};

fn reduced_shape(shape: [usize; MAX_RANK], axis: usize) -> Result<[usize; MAX_RANK], GradGraphError> {
    match axis {
        0 => Ok([1, shape[1]]),
        1 => Ok([shape[0], 1]),
        _ => Err(GradGraphError::InvalidAxis { axis }),
    }
}

impl Tensor {
    /// Folds `axis` down to extent 1 with `f`, writing into `dst`.
    fn fold_axis_into<F>(
        &self,
        dst: &mut Tensor,
        axis: usize,
        init: f32,
        f: F,
        operation: &str,
    ) -> Result<(), GradGraphError>
    where
        F: Fn(f32, f32) -> f32,
    {
        let out_shape = reduced_shape(self.shape, axis)?;
        if dst.shape != out_shape {
            return Err(GradGraphError::ShapeMismatch {
                expected: out_shape,
                actual: dst.shape,
                operation: operation.to_string(),
            });
        }
        // `outer` walks the kept axis, `inner` the reduced one.
        let (outer, inner) = if axis == 1 {
            (self.shape[0], self.shape[1])
        } else {
            (self.shape[1], self.shape[0])
        };
        for p in 0..outer {
            let mut acc = init;
            for q in 0..inner {
                let x = if axis == 1 {
                    self.data[self.offset(p, q)]
                } else {
                    self.data[self.offset(q, p)]
                };
                acc = f(acc, x);
            }
            let idx = if axis == 1 { dst.offset(p, 0) } else { dst.offset(0, p) };
            dst.data[idx] = acc;
        }
        Ok(())
    }

    /// Sums over `axis` (0 = rows, 1 = columns); the reduced axis has extent 1 in the result.
    pub fn sum_over_axis(&self, axis: usize) -> Result<Tensor, GradGraphError> {
        let shape = reduced_shape(self.shape, axis)?;
        let mut out = zeros(shape[0], shape[1])?;
        self.sum_over_axis_into(&mut out, axis)?;
        Ok(out)
    }

    pub fn sum_over_axis_into(&self, dst: &mut Tensor, axis: usize) -> Result<(), GradGraphError> {
        self.fold_axis_into(dst, axis, 0.0, |acc, x| acc + x, "sum_over_axis")
    }

    /// Takes the maximum over `axis` (0 = rows, 1 = columns).
    pub fn max_over_axis(&self, axis: usize) -> Result<Tensor, GradGraphError> {
        let shape = reduced_shape(self.shape, axis)?;
        let mut out = zeros(shape[0], shape[1])?;
        self.max_over_axis_into(&mut out, axis)?;
        Ok(out)
    }

    pub fn max_over_axis_into(&self, dst: &mut Tensor, axis: usize) -> Result<(), GradGraphError> {
        self.fold_axis_into(dst, axis, f32::NEG_INFINITY, f32::max, "max_over_axis")
    }

    /// Arithmetic mean of all elements as a `(1, 1)` tensor.
    pub fn mean(&self) -> Tensor {
        Tensor::scalar(self.sum() / self.numel() as f32)
    }

    /// Writes the mean of all elements into the `(1, 1)` tensor `dst`.
    pub fn mean_into(&self, dst: &mut Tensor) -> Result<(), GradGraphError> {
        if dst.shape != [1, 1] {
            return Err(GradGraphError::ShapeMismatch {
                expected: [1, 1],
                actual: dst.shape,
                operation: "mean".to_string(),
            });
        }
        dst.fill(self.sum() / self.numel() as f32);
        Ok(())
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Euclidean norm of all elements.
    pub fn l2_norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}

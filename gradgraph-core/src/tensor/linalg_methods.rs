use crate::error::GradGraphError;
use crate::tensor::create::zeros;
use crate::tensor::Tensor;

impl Tensor {
    /// Matrix product `self · other` in a freshly allocated `(self.rows, other.cols)` tensor.
    pub fn contract(&self, other: &Tensor) -> Result<Tensor, GradGraphError> {
        let mut out = zeros(self.shape[0], other.shape[1])?;
        Tensor::contract_into(&mut out, self, other)?;
        Ok(out)
    }

    /// Accumulates the matrix product into `dst`: `dst += a · b`.
    ///
    /// `dst` is not cleared on entry; callers reusing a destination must
    /// [`reset`](Tensor::reset) it first. A freshly created destination starts at zero,
    /// so this reduces to plain assignment.
    pub fn contract_into(dst: &mut Tensor, a: &Tensor, b: &Tensor) -> Result<(), GradGraphError> {
        if a.shape[1] != b.shape[0] {
            return Err(GradGraphError::ShapeMismatch {
                expected: [a.shape[1], b.shape[1]],
                actual: b.shape,
                operation: "contract".to_string(),
            });
        }
        let out_shape = [a.shape[0], b.shape[1]];
        if dst.shape != out_shape {
            return Err(GradGraphError::ShapeMismatch {
                expected: out_shape,
                actual: dst.shape,
                operation: "contract".to_string(),
            });
        }
        for i in 0..out_shape[0] {
            for k in 0..a.shape[1] {
                let a_ik = a.data[a.offset(i, k)];
                for j in 0..out_shape[1] {
                    let idx = dst.offset(i, j);
                    dst.data[idx] += a_ik * b.data[b.offset(k, j)];
                }
            }
        }
        Ok(())
    }

    /// Returns an independent, physically transposed copy.
    pub fn transpose(&self) -> Result<Tensor, GradGraphError> {
        let mut out = zeros(self.shape[1], self.shape[0])?;
        Tensor::transpose_into(&mut out, self)?;
        Ok(out)
    }

    /// Writes the transpose of `a` into `dst`, which must be shaped `(a.cols, a.rows)`.
    pub fn transpose_into(dst: &mut Tensor, a: &Tensor) -> Result<(), GradGraphError> {
        let expected = [a.shape[1], a.shape[0]];
        if dst.shape != expected {
            return Err(GradGraphError::ShapeMismatch {
                expected,
                actual: dst.shape,
                operation: "transpose".to_string(),
            });
        }
        for i in 0..expected[0] {
            for j in 0..expected[1] {
                let idx = dst.offset(i, j);
                dst.data[idx] = a.data[a.offset(j, i)];
            }
        }
        Ok(())
    }

    /// Transposes in O(1) by swapping shape and stride metadata.
    ///
    /// The buffer is untouched and is read through the swapped axes afterwards.
    /// Flipping twice restores the original view.
    pub fn transpose_(&mut self) {
        self.shape.swap(0, 1);
        self.strides.swap(0, 1);
    }
}

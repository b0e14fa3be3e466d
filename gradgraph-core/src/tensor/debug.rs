use crate::tensor::Tensor;
use std::fmt;

/// Prints one line per row, each element as `%+.3f`.
impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.shape[0] {
            for j in 0..self.shape[1] {
                write!(f, "{:+.3} ", self.data[self.offset(i, j)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

use crate::error::ModelError;
use gradgraph_core::Tensor;

/// Supplies training batches.
pub trait DataSource {
    /// Returns `(input, expected)` with `batch_size` rows each.
    fn next_batch(&mut self, batch_size: usize) -> Result<(Tensor, Tensor), ModelError>;
}

impl<F> DataSource for F
where
    F: FnMut(usize) -> Result<(Tensor, Tensor), ModelError>,
{
    fn next_batch(&mut self, batch_size: usize) -> Result<(Tensor, Tensor), ModelError> {
        self(batch_size)
    }
}

/// A fixed dataset served in order, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    inputs: Tensor,
    targets: Tensor,
    cursor: usize,
}

impl InMemoryDataset {
    /// `inputs` and `targets` hold one sample per row.
    pub fn new(inputs: Tensor, targets: Tensor) -> Result<Self, ModelError> {
        if inputs.rows() != targets.rows() {
            return Err(ModelError::InvalidConfig(format!(
                "{} input rows but {} target rows",
                inputs.rows(),
                targets.rows()
            )));
        }
        if inputs.rows() == 0 {
            return Err(ModelError::InvalidConfig("dataset has no samples".to_string()));
        }
        Ok(InMemoryDataset {
            inputs,
            targets,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.inputs.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.rows() == 0
    }

    fn gather(source: &Tensor, start: usize, batch_size: usize) -> Result<Tensor, ModelError> {
        let mut batch = Tensor::zeros(batch_size, source.cols())?;
        for i in 0..batch_size {
            let row = (start + i) % source.rows();
            for j in 0..source.cols() {
                batch.set_at(i, j, source.get(row, j)?)?;
            }
        }
        Ok(batch)
    }
}

impl DataSource for InMemoryDataset {
    fn next_batch(&mut self, batch_size: usize) -> Result<(Tensor, Tensor), ModelError> {
        let input = Self::gather(&self.inputs, self.cursor, batch_size)?;
        let expected = Self::gather(&self.targets, self.cursor, batch_size)?;
        self.cursor = (self.cursor + batch_size) % self.len();
        Ok((input, expected))
    }
}

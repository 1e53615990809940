use rand::Rng;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// One mini-batch gathered from a dataset.
#[derive(Debug, Clone)]
pub struct Batch {
    pub features: Matrix,
    pub labels: Vec<usize>,
}

/// Draws `batch_size` row indices uniformly from `[0, n)` with replacement.
///
/// Duplicates are expected and `batch_size` may exceed `n`.
pub fn sample_indices<R: Rng + ?Sized>(n: usize, batch_size: usize, rng: &mut R) -> Result<Vec<usize>> {
    if n == 0 {
        return Err(Error::EmptyDataset);
    }
    if batch_size == 0 {
        return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
    }

    Ok((0..batch_size).map(|_| rng.gen_range(0..n)).collect())
}

/// Samples a batch with replacement and gathers its rows and labels.
pub fn sample_batch<R: Rng + ?Sized>(dataset: &Dataset, batch_size: usize, rng: &mut R) -> Result<Batch> {
    let indices = sample_indices(dataset.len(), batch_size, rng)?;

    Ok(Batch {
        features: dataset.features().select_rows(&indices),
        labels: indices.iter().map(|&i| dataset.labels()[i]).collect(),
    })
}

use rand::Rng;
use rand_distr::StandardNormal;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Gaussian blobs: `per_class` points around every centre, with isotropic
/// standard deviation `spread`. Class `k` is the blob around `centers[k]`.
///
/// Rows are grouped by class; training samples batches at random so the
/// order does not matter.
pub fn gaussian_blobs<R: Rng + ?Sized>(
    centers: &[Vec<f64>],
    per_class: usize,
    spread: f64,
    rng: &mut R,
) -> Result<Dataset> {
    let dim = centers.first().map_or(0, Vec::len);
    if centers.iter().any(|c| c.len() != dim) {
        return Err(Error::InvalidConfig("blob centres must share one dimension".into()));
    }

    let mut data = Vec::with_capacity(centers.len() * per_class);
    let mut labels = Vec::with_capacity(centers.len() * per_class);

    for (class, center) in centers.iter().enumerate() {
        for _ in 0..per_class {
            data.push(
                center
                    .iter()
                    .map(|&c| c + spread * rng.sample::<f64, _>(StandardNormal))
                    .collect(),
            );
            labels.push(class);
        }
    }

    Dataset::new(
        Matrix {
            rows: data.len(),
            cols: dim,
            data,
        },
        labels,
    )
}

/// `num_classes` centres spaced evenly on a circle of `radius` in 2-D.
pub fn circle_centers(num_classes: usize, radius: f64) -> Vec<Vec<f64>> {
    (0..num_classes)
        .map(|k| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 / num_classes as f64;
            vec![radius * angle.cos(), radius * angle.sin()]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn blobs_have_balanced_labels_around_centres() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let centers = circle_centers(3, 10.0);

        let ds = gaussian_blobs(&centers, 50, 0.5, &mut rng).unwrap();

        assert_eq!(ds.len(), 150);
        assert_eq!(ds.dim(), 2);
        assert_eq!(ds.class_counts(3), vec![50, 50, 50]);

        for (row, &label) in ds.features().data.iter().zip(ds.labels()) {
            let c = &centers[label];
            let dist = ((row[0] - c[0]).powi(2) + (row[1] - c[1]).powi(2)).sqrt();
            assert!(dist < 5.0);
        }
    }

    #[test]
    fn ragged_centres_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let centers = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(gaussian_blobs(&centers, 1, 1.0, &mut rng).is_err());
    }
}

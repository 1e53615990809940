use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Row-wise softmax of an (N, C) score matrix.
///
/// Each row is shifted by its maximum before exponentiating. Softmax is
/// invariant to a per-row shift, so this only changes the numerics: the
/// largest exponent is `exp(0) = 1` and nothing overflows.
///
/// Returns `Error::EmptyScores` when `C == 0`.
pub fn softmax(z: &Matrix) -> Result<Matrix> {
    if z.cols == 0 {
        return Err(Error::EmptyScores);
    }

    Ok(Matrix {
        rows: z.rows,
        cols: z.cols,
        data: z.data.iter().map(|row| softmax_row(row)).collect(),
    })
}

/// Softmax of a single score vector. `scores` must not be empty.
pub fn softmax_row(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn score_matrix() -> impl Strategy<Value = Vec<Vec<f64>>> {
        (1usize..6, 1usize..8).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(
                proptest::collection::vec(-50.0f64..50.0, cols..=cols),
                rows..=rows,
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn rows_are_probability_distributions(data in score_matrix()) {
            let z = Matrix::from_data(data).unwrap();
            let p = softmax(&z).unwrap();

            prop_assert_eq!(p.shape(), z.shape());
            for row in &p.data {
                let sum: f64 = row.iter().sum();
                prop_assert!((sum - 1.0).abs() < 1e-9);
                prop_assert!(row.iter().all(|&x| (0.0..=1.0).contains(&x)));
            }
        }

        #[test]
        fn shift_invariant_per_row(data in score_matrix(), shift in -100.0f64..100.0) {
            let z = Matrix::from_data(data).unwrap();
            let shifted = Matrix {
                rows: z.rows,
                cols: z.cols,
                data: z
                    .data
                    .iter()
                    .enumerate()
                    .map(|(i, row)| row.iter().map(|x| x + shift * (i as f64 + 1.0)).collect())
                    .collect(),
            };

            let a = softmax(&z).unwrap();
            let b = softmax(&shifted).unwrap();
            for (ra, rb) in a.data.iter().zip(&b.data) {
                for (x, y) in ra.iter().zip(rb) {
                    prop_assert!((x - y).abs() < 1e-9);
                }
            }
        }
    }
}

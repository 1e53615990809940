use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Centred finite-difference gradient of a scalar function of `w`.
///
/// Every entry is perturbed by `±h` in turn:
///   df/dw_ij ≈ (f(w + h·e_ij) - f(w - h·e_ij)) / 2h
pub fn numerical_gradient<F>(mut f: F, w: &Matrix, h: f64) -> Result<Matrix>
where
    F: FnMut(&Matrix) -> Result<f64>,
{
    let mut probe = w.clone();
    let mut grad = Matrix::zeros(w.rows, w.cols);

    for i in 0..w.rows {
        for j in 0..w.cols {
            let original = probe.data[i][j];

            probe.data[i][j] = original + h;
            let plus = f(&probe)?;
            probe.data[i][j] = original - h;
            let minus = f(&probe)?;
            probe.data[i][j] = original;

            grad.data[i][j] = (plus - minus) / (2.0 * h);
        }
    }

    Ok(grad)
}

/// Largest entry-wise relative error `|a - b| / max(|a| + |b|, 1e-12)`.
pub fn max_relative_error(a: &Matrix, b: &Matrix) -> Result<f64> {
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch {
            op: "max_relative_error",
            left: a.shape(),
            right: b.shape(),
        });
    }

    Ok(a.data
        .iter()
        .flatten()
        .zip(b.data.iter().flatten())
        .map(|(x, y)| (x - y).abs() / (x.abs() + y.abs()).max(1e-12))
        .fold(0.0, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_of_sum_of_squares() {
        let w = Matrix::from_data(vec![vec![1.0, -2.0], vec![0.5, 3.0]]).unwrap();
        let grad = numerical_gradient(|w| Ok(w.sum_of_squares()), &w, 1e-5).unwrap();
        let expected = w.map(|v| 2.0 * v);
        assert!(max_relative_error(&grad, &expected).unwrap() < 1e-8);
    }

    #[test]
    fn relative_error_checks_shapes() {
        assert!(max_relative_error(&Matrix::zeros(1, 2), &Matrix::zeros(2, 1)).is_err());
        assert_eq!(max_relative_error(&Matrix::zeros(2, 2), &Matrix::zeros(2, 2)).unwrap(), 0.0);
    }
}

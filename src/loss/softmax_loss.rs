use crate::activation::softmax::softmax;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Floor for the true-class probability inside `ln()`, so that a probability
/// that underflowed to exactly zero gives a large finite loss instead of +inf.
const EPS: f64 = 1e-12;

/// Softmax cross-entropy loss with L2 regularization, and its gradient with
/// respect to the weights.
///
/// - `w`   : weights, shape (D, C)
/// - `x`   : batch of inputs, shape (N, D)
/// - `y`   : class labels, length N, each in `[0, C)`
/// - `reg` : regularization strength
///
/// Returns `(loss, dW)` where `dW` has the shape of `w`:
///
/// ```text
/// P     = softmax(X·W)
/// loss  = -1/N · Σ ln P[i, y_i]  +  0.5 · reg · Σ W²
/// dW    = Xᵀ · (P - onehot(y)) / N  +  reg · W
/// ```
pub fn softmax_loss_and_grad(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<(f64, Matrix)> {
    if y.len() != x.rows {
        return Err(Error::ShapeMismatch {
            op: "softmax_loss_and_grad labels",
            left: x.shape(),
            right: (y.len(), 1),
        });
    }
    if x.rows == 0 {
        return Err(Error::EmptyBatch);
    }
    check_labels(y, w.cols)?;

    let n = x.rows as f64;

    // Forward pass.
    let scores = x.matmul(w)?;
    let probs = softmax(&scores)?;

    let data_loss = probs
        .data
        .iter()
        .zip(y)
        .map(|(row, &label)| -row[label].max(EPS).ln())
        .sum::<f64>()
        / n;
    let (reg_loss, reg_grad) = l2_penalty(w, reg);

    // Backward pass: dL/dscores = (P - onehot(y)) / N.
    let mut dscores = probs;
    for (row, &label) in dscores.data.iter_mut().zip(y) {
        row[label] -= 1.0;
        for v in row.iter_mut() {
            *v /= n;
        }
    }

    let mut grad = x.transpose().matmul(&dscores)?;
    grad.scaled_add(1.0, &reg_grad)?;

    Ok((data_loss + reg_loss, grad))
}

/// L2 penalty `0.5 · reg · Σ W²` and its gradient `reg · W`.
pub fn l2_penalty(w: &Matrix, reg: f64) -> (f64, Matrix) {
    (0.5 * reg * w.sum_of_squares(), w.map(|v| reg * v))
}

fn check_labels(y: &[usize], num_classes: usize) -> Result<()> {
    match y.iter().position(|&label| label >= num_classes) {
        Some(index) => Err(Error::LabelOutOfRange {
            index,
            label: y[index],
            num_classes,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::grad_check::{max_relative_error, numerical_gradient};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_problem(seed: u64, n: usize, d: usize, c: usize) -> (Matrix, Matrix, Vec<usize>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let w = Matrix::random_normal(d, c, 0.01, &mut rng);
        let x = Matrix::random_normal(n, d, 1.0, &mut rng);
        let y = (0..n).map(|_| rng.gen_range(0..c)).collect();
        (w, x, y)
    }

    #[test]
    fn initial_loss_is_close_to_ln_c() {
        // With near-zero weights every class gets probability ~1/C.
        let (w, x, y) = random_problem(1, 50, 8, 10);
        let (loss, _) = softmax_loss_and_grad(&w, &x, &y, 0.0).unwrap();
        assert!((loss - (10.0f64).ln()).abs() < 0.1, "loss = {loss}");
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let (w, x, y) = random_problem(2, 6, 5, 3);
        let reg = 0.1;

        let (_, analytic) = softmax_loss_and_grad(&w, &x, &y, reg).unwrap();
        let numeric = numerical_gradient(
            |w| softmax_loss_and_grad(w, &x, &y, reg).map(|(loss, _)| loss),
            &w,
            1e-5,
        )
        .unwrap();

        for (a_row, n_row) in analytic.data.iter().zip(&numeric.data) {
            for (a, n) in a_row.iter().zip(n_row) {
                assert!((a - n).abs() < 1e-5, "analytic {a} vs numeric {n}");
            }
        }
        assert!(max_relative_error(&analytic, &numeric).unwrap() < 1e-4);
    }

    #[test]
    fn regularization_adds_closed_form_terms() {
        let (w, x, y) = random_problem(3, 10, 4, 3);
        let reg = 2.5;

        let (loss0, grad0) = softmax_loss_and_grad(&w, &x, &y, 0.0).unwrap();
        let (loss1, grad1) = softmax_loss_and_grad(&w, &x, &y, reg).unwrap();

        let expected_loss = 0.5 * reg * w.sum_of_squares();
        assert!((loss1 - loss0 - expected_loss).abs() < 1e-12);

        for i in 0..w.rows {
            for j in 0..w.cols {
                let diff = grad1.data[i][j] - grad0.data[i][j];
                assert!((diff - reg * w.data[i][j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn confident_correct_predictions_have_near_zero_loss() {
        // Identity inputs and a large diagonal weight matrix: each row puts
        // almost all of its mass on the true class.
        let x = Matrix::from_data(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        let w = x.map(|v| v * 50.0);
        let y = vec![0, 1, 2];

        let (loss, _) = softmax_loss_and_grad(&w, &x, &y, 0.0).unwrap();
        assert!(loss >= 0.0);
        assert!(loss < 1e-10, "loss = {loss}");
    }

    #[test]
    fn underflowed_true_class_probability_stays_finite() {
        let x = Matrix::from_data(vec![vec![1.0]]).unwrap();
        let w = Matrix::from_data(vec![vec![0.0, 5000.0]]).unwrap();

        let (loss, grad) = softmax_loss_and_grad(&w, &x, &[0], 0.0).unwrap();
        assert!(loss.is_finite());
        assert!((loss + EPS.ln()).abs() < 1e-9);
        assert!(grad.data[0].iter().all(|g| g.is_finite()));
    }

    #[test]
    fn rejects_bad_inputs() {
        let w = Matrix::zeros(3, 2);
        let x = Matrix::zeros(2, 3);

        assert!(matches!(
            softmax_loss_and_grad(&w, &x, &[0], 0.0),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            softmax_loss_and_grad(&w, &x, &[0, 2], 0.0),
            Err(Error::LabelOutOfRange { index: 1, label: 2, num_classes: 2 })
        ));
        assert!(matches!(
            softmax_loss_and_grad(&w, &Matrix::zeros(2, 4), &[0, 1], 0.0),
            Err(Error::ShapeMismatch { op: "matmul", .. })
        ));
        assert!(matches!(
            softmax_loss_and_grad(&w, &Matrix::zeros(0, 3), &[], 0.0),
            Err(Error::EmptyBatch)
        ));
    }
}

use log::info;
use rand::Rng;

use crate::data::dataset::Dataset;
use crate::data::sampler::sample_batch;
use crate::error::{Error, Result};
use crate::loss::softmax_loss::softmax_loss_and_grad;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;
use crate::train::iteration_stats::IterationStats;
use crate::train::loss_history::LossHistory;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Runs `config.num_iters` steps of mini-batch SGD on `weights` and returns
/// the batch loss of every step.
///
/// # Arguments
/// - `weights`  : (D, C) weight matrix; updated in place
/// - `dataset`  : training rows and labels; labels must be `< C`
/// - `config`   : hyperparameters
/// - `rng`      : source of batch indices
/// - `observer` : optional callback, invoked on every logged iteration
///
/// Each step samples `batch_size` rows with replacement, computes the
/// softmax loss and gradient, records the loss and applies
/// `weights -= learning_rate * grad`. Non-finite losses are not caught; they
/// simply show up in the returned history.
pub fn sgd_loop<R: Rng + ?Sized>(
    weights: &mut Matrix,
    dataset: &Dataset,
    config: &TrainConfig,
    rng: &mut R,
    mut observer: Option<&mut dyn FnMut(IterationStats)>,
) -> Result<LossHistory> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if dataset.dim() != weights.rows {
        return Err(Error::ShapeMismatch {
            op: "sgd_loop",
            left: dataset.features().shape(),
            right: weights.shape(),
        });
    }
    dataset.validate_labels(weights.cols)?;

    let optimizer = Sgd::new(config.learning_rate);
    let mut history = LossHistory::with_capacity(config.num_iters);

    for it in 0..config.num_iters {
        let batch = sample_batch(dataset, config.batch_size, rng)?;

        let (loss, grad) = softmax_loss_and_grad(weights, &batch.features, &batch.labels, config.reg)?;
        history.push(loss);

        optimizer.step(weights, &grad)?;

        if it % config.log_every == 0 {
            if config.verbose {
                info!("iteration {} / {}: loss {:.3}", it, config.num_iters, loss);
            }
            if let Some(ref mut notify) = observer {
                notify(IterationStats {
                    iteration: it,
                    total_iters: config.num_iters,
                    loss,
                });
            }
        }
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{circle_centers, gaussian_blobs};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn blobs(seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        gaussian_blobs(&circle_centers(3, 5.0), 40, 0.3, &mut rng).unwrap()
    }

    #[test]
    fn history_has_one_entry_per_iteration() {
        let ds = blobs(0);
        let mut w = Matrix::zeros(2, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let config = TrainConfig::new(0.1, 0.0, 37, 8).quiet();
        let history = sgd_loop(&mut w, &ds, &config, &mut rng, None).unwrap();

        assert_eq!(history.len(), 37);
        assert!(history.as_slice().iter().all(|&l| l >= 0.0));
    }

    #[test]
    fn zero_iterations_leave_weights_untouched() {
        let ds = blobs(0);
        let mut w = Matrix::zeros(2, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let config = TrainConfig::new(0.1, 0.0, 0, 8).quiet();
        let history = sgd_loop(&mut w, &ds, &config, &mut rng, None).unwrap();

        assert!(history.is_empty());
        assert_eq!(w, Matrix::zeros(2, 3));
    }

    #[test]
    fn observer_sees_every_logged_iteration() {
        let ds = blobs(2);
        let mut w = Matrix::zeros(2, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = Vec::new();

        let config = TrainConfig {
            log_every: 10,
            ..TrainConfig::new(0.1, 0.0, 25, 4).quiet()
        };
        let mut record = |s: IterationStats| seen.push(s.iteration);
        sgd_loop(&mut w, &ds, &config, &mut rng, Some(&mut record)).unwrap();

        assert_eq!(seen, vec![0, 10, 20]);
    }

    #[test]
    fn preconditions_are_checked_up_front() {
        let ds = blobs(0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = TrainConfig::new(0.1, 0.0, 5, 4).quiet();

        let mut wrong_dim = Matrix::zeros(3, 3);
        assert!(matches!(
            sgd_loop(&mut wrong_dim, &ds, &config, &mut rng, None),
            Err(Error::ShapeMismatch { .. })
        ));

        let mut too_few_classes = Matrix::zeros(2, 2);
        assert!(matches!(
            sgd_loop(&mut too_few_classes, &ds, &config, &mut rng, None),
            Err(Error::LabelOutOfRange { .. })
        ));

        let empty = Dataset::new(Matrix::zeros(0, 2), vec![]).unwrap();
        let mut w = Matrix::zeros(2, 3);
        assert!(matches!(
            sgd_loop(&mut w, &empty, &config, &mut rng, None),
            Err(Error::EmptyDataset)
        ));
    }
}

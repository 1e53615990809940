use std::path::Path;

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::softmax::softmax;
use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::train::iteration_stats::IterationStats;
use crate::train::loop_fn::sgd_loop;
use crate::train::loss_history::LossHistory;
use crate::train::train_config::TrainConfig;

/// Standard deviation of the initial weights. Small enough that the initial
/// softmax output is close to uniform.
pub const INIT_SCALE: f64 = 0.001;

/// Lifecycle of the weight matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClassifierState {
    /// No weights yet.
    Fresh,
    /// Holds a (D, C) weight matrix, possibly partially trained.
    Ready { weights: Matrix },
}

/// Linear softmax classifier: `scores = X · W`.
///
/// A classifier starts `Fresh` and becomes `Ready` through exactly one call to
/// [`SoftmaxClassifier::initialize`]. Training keeps the current weights, so
/// repeated `train` calls continue where the last one stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxClassifier {
    num_classes: usize,
    state: ClassifierState,
}

impl SoftmaxClassifier {
    /// Creates a fresh classifier for `num_classes` classes (at least 2).
    pub fn new(num_classes: usize) -> Result<Self> {
        if num_classes < 2 {
            return Err(Error::InvalidConfig(format!(
                "num_classes must be at least 2, got {}",
                num_classes
            )));
        }
        Ok(SoftmaxClassifier {
            num_classes,
            state: ClassifierState::Fresh,
        })
    }

    /// Wraps an existing (D, C) weight matrix in a ready classifier.
    pub fn from_weights(weights: Matrix) -> Result<Self> {
        let mut classifier = SoftmaxClassifier::new(weights.cols)?;
        classifier.state = ClassifierState::Ready { weights };
        Ok(classifier)
    }

    /// Allocates `dim × num_classes` weights drawn from `INIT_SCALE * N(0, 1)`.
    ///
    /// Returns `Error::AlreadyInitialized` if the classifier already has
    /// weights; those are left untouched.
    pub fn initialize<R: Rng + ?Sized>(&mut self, dim: usize, rng: &mut R) -> Result<()> {
        if self.is_ready() {
            return Err(Error::AlreadyInitialized);
        }
        let weights = Matrix::random_normal(dim, self.num_classes, INIT_SCALE, rng);
        debug!("initialized weights {:?}", weights.shape());
        self.state = ClassifierState::Ready { weights };
        Ok(())
    }

    /// Trains with mini-batch SGD and returns the per-iteration loss history
    /// (length `config.num_iters`).
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        dataset: &Dataset,
        config: &TrainConfig,
        rng: &mut R,
    ) -> Result<LossHistory> {
        self.train_with_observer(dataset, config, rng, None)
    }

    /// Like [`train`](Self::train), additionally reporting progress to `observer`.
    pub fn train_with_observer<R: Rng + ?Sized>(
        &mut self,
        dataset: &Dataset,
        config: &TrainConfig,
        rng: &mut R,
        observer: Option<&mut dyn FnMut(IterationStats)>,
    ) -> Result<LossHistory> {
        let num_classes = self.num_classes;
        let weights = match &mut self.state {
            ClassifierState::Ready { weights } => weights,
            ClassifierState::Fresh => return Err(Error::NotInitialized),
        };
        info!(
            "training on {} rows × {} features, {} classes: lr={} reg={} iters={} batch={}",
            dataset.len(),
            dataset.dim(),
            num_classes,
            config.learning_rate,
            config.reg,
            config.num_iters,
            config.batch_size
        );
        sgd_loop(weights, dataset, config, rng, observer)
    }

    /// Class scores `X · W`, shape (N, C).
    pub fn scores(&self, x: &Matrix) -> Result<Matrix> {
        x.matmul(self.ready_weights()?)
    }

    /// Predicted label of every row: the index of its largest score.
    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        Ok(self.scores(x)?.argmax_rows())
    }

    /// Per-class probabilities of every row.
    pub fn predict_proba(&self, x: &Matrix) -> Result<Matrix> {
        softmax(&self.scores(x)?)
    }

    /// Fraction of rows whose predicted label equals `y`.
    pub fn evaluate(&self, x: &Matrix, y: &[usize]) -> Result<f64> {
        let predicted = self.predict(x)?;
        accuracy(&predicted, y)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ClassifierState::Ready { .. })
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn weights(&self) -> Option<&Matrix> {
        match &self.state {
            ClassifierState::Ready { weights } => Some(weights),
            ClassifierState::Fresh => None,
        }
    }

    fn ready_weights(&self) -> Result<&Matrix> {
        self.weights().ok_or(Error::NotInitialized)
    }

    /// Serializes the classifier to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a classifier previously written by `save_json`.
    pub fn load_json(path: &Path) -> Result<SoftmaxClassifier> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let classifier: SoftmaxClassifier = serde_json::from_reader(reader)?;
        if let Some(w) = classifier.weights() {
            if w.cols != classifier.num_classes {
                return Err(Error::ShapeMismatch {
                    op: "load_json",
                    left: w.shape(),
                    right: (w.rows, classifier.num_classes),
                });
            }
        }
        Ok(classifier)
    }
}

/// Fraction of positions where `predicted` equals `truth`.
pub fn accuracy(predicted: &[usize], truth: &[usize]) -> Result<f64> {
    if predicted.len() != truth.len() {
        return Err(Error::ShapeMismatch {
            op: "accuracy",
            left: (predicted.len(), 1),
            right: (truth.len(), 1),
        });
    }
    if truth.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let correct = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    Ok(correct as f64 / truth.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn fresh_classifier_refuses_to_train_or_predict() {
        let mut clf = SoftmaxClassifier::new(3).unwrap();
        let ds = Dataset::new(Matrix::zeros(4, 2), vec![0, 1, 2, 0]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(!clf.is_ready());
        assert!(clf.weights().is_none());
        assert!(matches!(
            clf.train(&ds, &TrainConfig::default().quiet(), &mut rng),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(clf.predict(ds.features()), Err(Error::NotInitialized)));
    }

    #[test]
    fn initialize_happens_once() {
        let mut clf = SoftmaxClassifier::new(4).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        clf.initialize(5, &mut rng).unwrap();
        let before = clf.weights().cloned().unwrap();
        assert_eq!(before.shape(), (5, 4));
        assert!(before.data.iter().flatten().all(|w| w.abs() < 0.01));

        assert!(matches!(clf.initialize(5, &mut rng), Err(Error::AlreadyInitialized)));
        assert_eq!(clf.weights(), Some(&before));
    }

    #[test]
    fn rejects_single_class() {
        assert!(SoftmaxClassifier::new(1).is_err());
    }

    #[test]
    fn labels_beyond_class_count_are_rejected() {
        let mut clf = SoftmaxClassifier::new(2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        clf.initialize(1, &mut rng).unwrap();

        let ds = Dataset::new(Matrix::zeros(3, 1), vec![0, 1, 2]).unwrap();
        assert!(matches!(
            clf.train(&ds, &TrainConfig::default().quiet(), &mut rng),
            Err(Error::LabelOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn zero_weights_predict_class_zero() {
        let clf = SoftmaxClassifier::from_weights(Matrix::zeros(2, 4)).unwrap();
        let x = Matrix::from_data(vec![
            vec![1.0, -3.0],
            vec![0.5, 0.5],
            vec![9.0, 2.0],
            vec![-1.0, 0.0],
        ])
        .unwrap();

        assert_eq!(clf.predict(&x).unwrap(), vec![0, 0, 0, 0]);
        // Balanced labels: exactly one row per class is right.
        assert!((clf.evaluate(&x, &[0, 1, 2, 3]).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn predict_proba_rows_sum_to_one() {
        let w = Matrix::from_data(vec![vec![1.0, -1.0, 0.5]]).unwrap();
        let clf = SoftmaxClassifier::from_weights(w).unwrap();
        let x = Matrix::from_data(vec![vec![2.0], vec![-3.0]]).unwrap();

        let p = clf.predict_proba(&x).unwrap();
        for row in &p.data {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert_eq!(clf.predict(&x).unwrap(), vec![0, 1]);
    }

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[0, 1, 2, 2], &[0, 1, 1, 2]).unwrap(), 0.75);
        assert!(accuracy(&[0], &[0, 1]).is_err());
        assert!(matches!(accuracy(&[], &[]), Err(Error::EmptyDataset)));
    }

    #[test]
    fn evaluate_checks_feature_dimension() {
        let clf = SoftmaxClassifier::from_weights(Matrix::zeros(3, 2)).unwrap();
        assert!(matches!(
            clf.evaluate(&Matrix::zeros(2, 4), &[0, 1]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    fn temp_model(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("softmax-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn diverged_weights_survive_save_and_load() {
        let w = Matrix::from_data(vec![vec![f64::NAN, 1.0], vec![f64::INFINITY, 0.0]]).unwrap();
        let clf = SoftmaxClassifier::from_weights(w).unwrap();
        let path = temp_model("nan-model");

        clf.save_json(&path).unwrap();
        let loaded = SoftmaxClassifier::load_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let w = loaded.weights().unwrap();
        assert!(w.data[0][0].is_nan());
        assert_eq!(w.data[0][1], 1.0);
        assert_eq!(w.data[1], vec![f64::INFINITY, 0.0]);
        assert_eq!(loaded.num_classes(), 2);
    }

    #[test]
    fn ragged_saved_weights_are_rejected() {
        let path = temp_model("ragged-model");
        std::fs::write(
            &path,
            r#"{"num_classes":2,"state":{"state":"ready","weights":{"rows":1,"cols":2,"data":[[5.0]]}}}"#,
        )
        .unwrap();

        let result = SoftmaxClassifier::load_json(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(Error::Json(_))));
    }
}

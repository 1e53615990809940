use std::path::Path;
use std::time::Instant;

use chrono::Local;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::classifier::SoftmaxClassifier;
use crate::config::{DatasetSource, RunConfig};
use crate::data::dataset::Split;
use crate::data::preprocess::preprocess;
use crate::data::synthetic::{circle_centers, gaussian_blobs};
use crate::data::{cifar, idx};
use crate::error::{Error, Result};
use crate::report::loss_plot::save_loss_plot;
use crate::report::markdown::{TrainingReport, LOSS_FILE, WEIGHTS_FILE};
use crate::report::weights_image::{save_weights_image, ImageLayout};
use crate::train::loss_history::LossHistory;

pub const MODEL_FILE: &str = "model.json";
pub const HISTORY_FILE: &str = "loss_history.json";

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub classifier: SoftmaxClassifier,
    pub history: LossHistory,
    pub report: TrainingReport,
}

/// Raw (unpreprocessed) data plus the image geometry of one sample.
pub fn load_data<R: Rng + ?Sized>(config: &RunConfig, rng: &mut R) -> Result<(Split, ImageLayout)> {
    let has_bias = config.preprocess.append_bias;
    match &config.dataset {
        DatasetSource::Cifar10 { dir } => {
            let split = cifar::load_split(dir)?;
            let side = cifar::IMAGE_SIDE as u32;
            let layout = ImageLayout {
                width: side,
                height: side,
                channels: cifar::CHANNELS as u32,
                has_bias,
            };
            Ok((split, layout))
        }
        DatasetSource::Idx { train_images, train_labels, test_images, test_labels } => {
            let train = idx::load_idx_pair(train_images, train_labels)?;
            let test = idx::load_idx_pair(test_images, test_labels)?;
            if (train.rows, train.cols) != (test.rows, test.cols) {
                return Err(Error::DataFormat(format!(
                    "train images are {}×{} but test images are {}×{}",
                    train.rows, train.cols, test.rows, test.cols
                )));
            }
            let layout = ImageLayout {
                width: train.cols as u32,
                height: train.rows as u32,
                channels: 1,
                has_bias,
            };
            Ok((Split { train: train.dataset, test: test.dataset }, layout))
        }
        DatasetSource::Blobs { per_class, test_per_class, spread, radius } => {
            let centers = circle_centers(config.num_classes, *radius);
            let train = gaussian_blobs(&centers, *per_class, *spread, rng)?;
            let test = gaussian_blobs(&centers, *test_per_class, *spread, rng)?;
            // One grayscale pixel per coordinate.
            let layout = ImageLayout {
                width: train.dim() as u32,
                height: 1,
                channels: 1,
                has_bias,
            };
            Ok((Split { train, test }, layout))
        }
    }
}

/// Runs a full training session: load, preprocess, initialize, train,
/// evaluate, then write the report, images and model into `config.output_dir`.
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let (raw, layout) = load_data(config, &mut rng)?;
    let split = preprocess(raw, &config.preprocess)?;
    // Training labels are checked by the SGD loop.
    split.test.validate_labels(config.num_classes)?;
    info!(
        "train {} rows, test {} rows, {} features; class counts {:?}",
        split.train.len(),
        split.test.len(),
        split.train.dim(),
        split.train.class_counts(config.num_classes)
    );

    let mut classifier = SoftmaxClassifier::new(config.num_classes)?;
    classifier.initialize(split.train.dim(), &mut rng)?;

    let started = Instant::now();
    let history = classifier.train(&split.train, &config.training, &mut rng)?;
    let elapsed = started.elapsed();
    let finished_at = Local::now();

    let train_accuracy = classifier.evaluate(split.train.features(), split.train.labels())?;
    let test_accuracy = classifier.evaluate(split.test.features(), split.test.labels())?;
    info!("train accuracy {:.4}, test accuracy {:.4}", train_accuracy, test_accuracy);

    let report = TrainingReport::new(
        &config.training,
        finished_at,
        elapsed,
        history.last(),
        train_accuracy,
        test_accuracy,
    );

    write_outputs(config, &layout, &classifier, &history, &report)?;

    Ok(RunOutcome {
        classifier,
        history,
        report,
    })
}

fn write_outputs(
    config: &RunConfig,
    layout: &ImageLayout,
    classifier: &SoftmaxClassifier,
    history: &LossHistory,
    report: &TrainingReport,
) -> Result<()> {
    let dir: &Path = &config.output_dir;
    std::fs::create_dir_all(dir)?;

    report.write_to(dir)?;
    let weights = classifier.weights().ok_or(Error::NotInitialized)?;
    save_weights_image(weights, layout, config.image_scale, &dir.join(WEIGHTS_FILE))?;
    save_loss_plot(history, &dir.join(LOSS_FILE))?;

    classifier.save_json(&dir.join(MODEL_FILE))?;
    history.save_json(&dir.join(HISTORY_FILE))?;
    info!("wrote model and loss history to {}", dir.display());
    Ok(())
}

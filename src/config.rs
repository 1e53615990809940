use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::data::preprocess::PreprocessOptions;
use crate::error::{Error, Result};
use crate::train::train_config::TrainConfig;

/// Where the training and test data come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSource {
    /// CIFAR-10 binary batches (`data_batch_{1..5}.bin`, `test_batch.bin`).
    Cifar10 { dir: PathBuf },
    /// MNIST-style IDX image/label files.
    Idx {
        train_images: PathBuf,
        train_labels: PathBuf,
        test_images: PathBuf,
        test_labels: PathBuf,
    },
    /// Gaussian blobs on a circle, one per class. Needs no files.
    Blobs {
        per_class: usize,
        test_per_class: usize,
        spread: f64,
        radius: f64,
    },
}

/// Everything one run of the training entry point needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub dataset: DatasetSource,
    /// Report, images and model are written here.
    pub output_dir: PathBuf,
    /// Class count C; every label must lie in `[0, C)`.
    pub num_classes: usize,
    /// Seed for weight initialization and batch sampling.
    pub seed: u64,
    pub preprocess: PreprocessOptions,
    pub training: TrainConfig,
    /// Each weight pixel is drawn as a `image_scale × image_scale` square.
    pub image_scale: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            dataset: DatasetSource::Cifar10 {
                dir: PathBuf::from("data/cifar-10-batches-bin"),
            },
            output_dir: PathBuf::from("output/seminar2"),
            num_classes: 10,
            seed: 0,
            preprocess: PreprocessOptions::default(),
            training: TrainConfig::default(),
            image_scale: 4,
        }
    }
}

impl RunConfig {
    /// Reads the config from `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<RunConfig> {
        if !path.exists() {
            info!("{} not found, using default configuration", path.display());
            return Ok(RunConfig::default());
        }
        let config = RunConfig::load_json(path)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_json(path: &Path) -> Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: RunConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_classes < 2 {
            return Err(Error::InvalidConfig(format!(
                "num_classes must be at least 2, got {}",
                self.num_classes
            )));
        }
        if self.image_scale == 0 {
            return Err(Error::InvalidConfig("image_scale must be at least 1".into()));
        }
        if let DatasetSource::Blobs { per_class, test_per_class, .. } = self.dataset {
            if per_class == 0 || test_per_class == 0 {
                return Err(Error::InvalidConfig("blobs need at least one point per class".into()));
            }
        }
        self.training.validate()
    }
}

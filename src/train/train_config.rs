use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hyperparameters for one `sgd_loop` run.
///
/// # Fields
/// - `learning_rate` : SGD step size
/// - `reg`           : L2 regularization strength
/// - `num_iters`     : number of SGD steps (one sampled batch each)
/// - `batch_size`    : rows per batch, drawn with replacement
/// - `verbose`       : log progress every `log_every` iterations
/// - `log_every`     : progress interval; iteration 0 is always logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub reg: f64,
    pub num_iters: usize,
    pub batch_size: usize,
    pub verbose: bool,
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 1e-3,
            reg: 1e-1,
            num_iters: 10_000,
            batch_size: 64,
            verbose: true,
            log_every: 100,
        }
    }
}

impl TrainConfig {
    /// Creates a config with the given hyperparameters and default logging.
    pub fn new(learning_rate: f64, reg: f64, num_iters: usize, batch_size: usize) -> Self {
        TrainConfig {
            learning_rate,
            reg,
            num_iters,
            batch_size,
            ..TrainConfig::default()
        }
    }

    /// Turns progress logging off.
    pub fn quiet(mut self) -> Self {
        self.verbose = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        if self.log_every == 0 {
            return Err(Error::InvalidConfig("log_every must be at least 1".into()));
        }
        if !(self.reg >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "reg must be non-negative, got {}",
                self.reg
            )));
        }
        Ok(())
    }
}

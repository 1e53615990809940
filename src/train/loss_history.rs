use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::json_float;

/// Per-iteration batch losses, in the order they were computed.
///
/// Serialized as a plain JSON array; a diverged run's NaN/inf losses are
/// written as strings so the file still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LossHistory(#[serde(with = "json_float::flat")] Vec<f64>);

impl LossHistory {
    pub fn with_capacity(n: usize) -> Self {
        LossHistory(Vec::with_capacity(n))
    }

    pub fn push(&mut self, loss: f64) {
        self.0.push(loss);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Means of consecutive non-overlapping windows; a shorter trailing
    /// window is averaged too. Smooths out batch-to-batch noise.
    pub fn window_means(&self, window: usize) -> Vec<f64> {
        if window == 0 {
            return Vec::new();
        }
        self.0
            .chunks(window)
            .map(|w| w.iter().sum::<f64>() / w.len() as f64)
            .collect()
    }
}

impl LossHistory {
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<LossHistory> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

impl From<Vec<f64>> for LossHistory {
    fn from(v: Vec<f64>) -> Self {
        LossHistory(v)
    }
}

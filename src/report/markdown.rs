use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use log::info;

use crate::error::Result;
use crate::train::train_config::TrainConfig;

pub const REPORT_FILE: &str = "report.md";
pub const WEIGHTS_FILE: &str = "weights.png";
pub const LOSS_FILE: &str = "loss.png";

/// Summary of one training run, rendered as a short Markdown page.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub finished_at: DateTime<Local>,
    pub elapsed: Duration,
    pub learning_rate: f64,
    pub reg: f64,
    pub num_iters: usize,
    pub batch_size: usize,
    /// Loss of the last iteration; `None` when no iterations ran.
    pub final_loss: Option<f64>,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
}

impl TrainingReport {
    /// Takes the hyperparameters from `config`; the rest is filled in by the caller.
    pub fn new(
        config: &TrainConfig,
        finished_at: DateTime<Local>,
        elapsed: Duration,
        final_loss: Option<f64>,
        train_accuracy: f64,
        test_accuracy: f64,
    ) -> Self {
        TrainingReport {
            finished_at,
            elapsed,
            learning_rate: config.learning_rate,
            reg: config.reg,
            num_iters: config.num_iters,
            batch_size: config.batch_size,
            final_loss,
            train_accuracy,
            test_accuracy,
        }
    }

    /// Renders the report. Lines ending in two spaces are Markdown hard breaks.
    pub fn render(&self) -> String {
        let final_loss = match self.final_loss {
            Some(loss) => loss.to_string(),
            None => "n/a".to_owned(),
        };

        format!(
            "# Training Softmax classifier  \n\
             datetime: {datetime}  \n\
             Well done in: {seconds} seconds  \n\
             learning_rate = {lr}  \n\
             reg = {reg}  \n\
             num_iters = {iters}  \n\
             batch_size = {batch}  \n\
             \n\
             Final loss: {final_loss}   \n\
             Train accuracy: {train}   \n\
             Test accuracy: {test}  \n    \n\
             <img src=\"{weights}\">  \n\
             <br>\n\
             <img src=\"{loss}\">\n",
            datetime = self.finished_at.format("%Y-%m-%d %H:%M:%S"),
            seconds = self.elapsed.as_secs(),
            lr = self.learning_rate,
            reg = self.reg,
            iters = self.num_iters,
            batch = self.batch_size,
            final_loss = final_loss,
            train = self.train_accuracy,
            test = self.test_accuracy,
            weights = WEIGHTS_FILE,
            loss = LOSS_FILE,
        )
    }

    /// Writes `report.md` into `dir`, replacing any previous report.
    /// `dir` must already exist.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, self.render())?;
        info!("wrote report to {}", path.display());
        Ok(path)
    }
}

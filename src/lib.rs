pub mod error;
pub mod math;
pub mod activation;
pub mod loss;
pub mod optim;
pub mod data;
pub mod train;
pub mod classifier;
pub mod report;
pub mod config;
pub mod pipeline;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use activation::softmax::softmax;
pub use loss::softmax_loss::softmax_loss_and_grad;
pub use optim::sgd::Sgd;
pub use data::{Dataset, Split};
pub use train::{LossHistory, TrainConfig};
pub use classifier::SoftmaxClassifier;
pub use report::TrainingReport;
pub use config::{DatasetSource, RunConfig};

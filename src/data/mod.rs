pub mod cifar;
pub mod dataset;
pub mod idx;
pub mod preprocess;
pub mod sampler;
pub mod synthetic;

pub use dataset::{Dataset, Split};
pub use preprocess::{preprocess, PreprocessOptions};
pub use sampler::{sample_batch, Batch};

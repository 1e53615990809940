pub mod classifier;

pub use classifier::{accuracy, ClassifierState, SoftmaxClassifier, INIT_SCALE};

pub mod softmax;

pub use softmax::{softmax, softmax_row};

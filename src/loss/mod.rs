pub mod grad_check;
pub mod softmax_loss;

pub use grad_check::{max_relative_error, numerical_gradient};
pub use softmax_loss::{l2_penalty, softmax_loss_and_grad};

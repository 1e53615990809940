pub mod json_float;
pub mod matrix;

pub use matrix::{argmax, Matrix};

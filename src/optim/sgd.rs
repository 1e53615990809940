use crate::error::Result;
use crate::math::matrix::Matrix;

/// Plain stochastic gradient descent: no momentum, no decay.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update in place: `weights -= learning_rate * grad`.
    pub fn step(&self, weights: &mut Matrix, grad: &Matrix) -> Result<()> {
        weights.scaled_add(-self.learning_rate, grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_against_the_gradient() {
        let mut w = Matrix::from_data(vec![vec![1.0, 2.0]]).unwrap();
        let g = Matrix::from_data(vec![vec![10.0, -10.0]]).unwrap();

        Sgd::new(0.1).step(&mut w, &g).unwrap();

        assert!((w.data[0][0] - 0.0).abs() < 1e-12);
        assert!((w.data[0][1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn step_rejects_mismatched_gradient() {
        let mut w = Matrix::zeros(2, 2);
        assert!(Sgd::new(0.1).step(&mut w, &Matrix::zeros(2, 3)).is_err());
    }
}

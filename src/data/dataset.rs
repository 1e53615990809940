use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Feature matrix (N, D) paired with N integer class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Matrix,
    labels: Vec<usize>,
}

impl Dataset {
    /// Pairs features with labels. Row counts must match.
    pub fn new(features: Matrix, labels: Vec<usize>) -> Result<Dataset> {
        if features.rows != labels.len() {
            return Err(Error::ShapeMismatch {
                op: "Dataset::new",
                left: features.shape(),
                right: (labels.len(), 1),
            });
        }
        Ok(Dataset { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature dimension D.
    pub fn dim(&self) -> usize {
        self.features.cols
    }

    pub fn features(&self) -> &Matrix {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut Matrix {
        &mut self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn max_label(&self) -> Option<usize> {
        self.labels.iter().copied().max()
    }

    /// Checks that every label is a valid index for `num_classes` classes.
    pub fn validate_labels(&self, num_classes: usize) -> Result<()> {
        match self.labels.iter().position(|&label| label >= num_classes) {
            Some(index) => Err(Error::LabelOutOfRange {
                index,
                label: self.labels[index],
                num_classes,
            }),
            None => Ok(()),
        }
    }

    /// Number of rows carrying each label, for `num_classes` classes.
    pub fn class_counts(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; num_classes];
        for &label in &self.labels {
            if let Some(c) = counts.get_mut(label) {
                *c += 1;
            }
        }
        counts
    }
}

/// Train / test pair handed from data preparation to training.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

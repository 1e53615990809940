use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::json_float;

/// Dense row-major matrix of `f64`.
///
/// `data` always holds exactly `rows` rows of `cols` values each.
/// Deserialization checks this, and non-finite entries survive a JSON
/// round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    #[serde(with = "json_float::nested")]
    pub data: Vec<Vec<f64>>,
}

/// Unchecked wire form of [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    #[serde(with = "json_float::nested")]
    data: Vec<Vec<f64>>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = Error;

    fn try_from(raw: RawMatrix) -> Result<Matrix> {
        let declared = (raw.rows, raw.cols);
        let found = (raw.data.len(), raw.data.first().map_or(raw.cols, Vec::len));
        if declared != found || raw.data.iter().any(|row| row.len() != raw.cols) {
            return Err(Error::ShapeMismatch {
                op: "Matrix deserialize",
                left: declared,
                right: found,
            });
        }
        Ok(Matrix {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples every entry from `scale * N(0, 1)`.
    pub fn random_normal<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> Matrix {
        let data = (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| scale * rng.sample::<f64, _>(StandardNormal))
                    .collect()
            })
            .collect();

        Matrix { rows, cols, data }
    }

    /// Builds a matrix from row vectors. All rows must have the same length;
    /// an empty `data` gives a 0×0 matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, Vec::len);
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(Error::ShapeMismatch {
                op: "from_data",
                left: (data.len(), cols),
                right: (1, bad.len()),
            });
        }

        Ok(Matrix {
            rows: data.len(),
            cols,
            data,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for (i, row) in self.data.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                res.data[j][i] = x;
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Matrix product `self · rhs`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                op: "matmul",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        // i-k-j order keeps the inner loop on contiguous rows of `rhs`.
        for (out_row, lhs_row) in res.data.iter_mut().zip(&self.data) {
            for (&a, rhs_row) in lhs_row.iter().zip(&rhs.data) {
                for (out, &b) in out_row.iter_mut().zip(rhs_row) {
                    *out += a * b;
                }
            }
        }

        Ok(res)
    }

    /// In-place `self += alpha * other`.
    pub fn scaled_add(&mut self, alpha: f64, other: &Matrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                op: "scaled_add",
                left: self.shape(),
                right: other.shape(),
            });
        }

        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            for (x, &y) in row.iter_mut().zip(other_row) {
                *x += alpha * y;
            }
        }

        Ok(())
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum()
    }

    /// Gathers the given rows, in order. Indices may repeat.
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        Matrix {
            rows: indices.len(),
            cols: self.cols,
            data: indices.iter().map(|&i| self.data[i].clone()).collect(),
        }
    }

    /// Index of the largest entry of every row. Ties go to the lowest index.
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.data.iter().map(|row| argmax(row)).collect()
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        self.data.iter().map(|row| row[j]).collect()
    }

    /// Mean of every column. Empty for a matrix with no rows.
    pub fn column_means(&self) -> Vec<f64> {
        if self.rows == 0 {
            return Vec::new();
        }

        let mut sums = vec![0.0; self.cols];
        for row in &self.data {
            for (s, &x) in sums.iter_mut().zip(row) {
                *s += x;
            }
        }

        let n = self.rows as f64;
        sums.into_iter().map(|s| s / n).collect()
    }

    /// Subtracts `offsets[j]` from every entry of column `j`.
    pub fn sub_row_vector(&mut self, offsets: &[f64]) -> Result<()> {
        if offsets.len() != self.cols {
            return Err(Error::ShapeMismatch {
                op: "sub_row_vector",
                left: self.shape(),
                right: (1, offsets.len()),
            });
        }

        for row in &mut self.data {
            for (x, &o) in row.iter_mut().zip(offsets) {
                *x -= o;
            }
        }

        Ok(())
    }

    /// Appends a column filled with `value`.
    pub fn push_column(&mut self, value: f64) {
        for row in &mut self.data {
            row.push(value);
        }
        self.cols += 1;
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

/// Index of the maximum element in a slice; the first one wins on ties.
/// A NaN counts as the maximum, so the first NaN is returned if there is one.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x.is_nan() {
            return i;
        }
        if x > v[best] {
            best = i;
        }
    }
    best
}

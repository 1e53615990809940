use log::info;
use serde::{Deserialize, Serialize};

use crate::data::dataset::Split;
use crate::error::Result;

/// How raw pixel features are turned into training inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Multiplier applied to every raw feature first (1/255 maps bytes to [0, 1]).
    pub scale: f64,
    /// Subtract the per-feature training mean from both splits.
    pub subtract_mean: bool,
    /// Append a constant 1.0 column so the last weight row acts as a bias.
    pub append_bias: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        PreprocessOptions {
            scale: 1.0 / 255.0,
            subtract_mean: true,
            append_bias: true,
        }
    }
}

/// Applies `options` to both splits in place and returns them.
///
/// The mean is taken over the training split only and then subtracted from
/// the test split as well.
pub fn preprocess(mut split: Split, options: &PreprocessOptions) -> Result<Split> {
    for ds in [&mut split.train, &mut split.test] {
        if options.scale != 1.0 {
            let scale = options.scale;
            let scaled = ds.features().map(|x| x * scale);
            *ds.features_mut() = scaled;
        }
    }

    if options.subtract_mean {
        let mean = split.train.features().column_means();
        if !mean.is_empty() {
            split.train.features_mut().sub_row_vector(&mean)?;
            split.test.features_mut().sub_row_vector(&mean)?;
        }
    }

    if options.append_bias {
        split.train.features_mut().push_column(1.0);
        split.test.features_mut().push_column(1.0);
    }

    info!(
        "preprocessed data: train {:?}, test {:?}",
        split.train.features().shape(),
        split.test.features().shape()
    );
    Ok(split)
}

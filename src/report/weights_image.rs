use std::path::Path;

use image::{Rgb, RgbImage};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Pixels between neighbouring class tiles.
const GAP: u32 = 4;

/// How a weight column maps back onto an image.
///
/// Pixels are channel-major: all of channel 0 row by row, then channel 1, …
/// `channels` is 1 (grayscale) or 3 (RGB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLayout {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    /// The last weight row belongs to the bias feature and is not drawn.
    pub has_bias: bool,
}

impl ImageLayout {
    pub fn pixel_features(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Weight rows this layout expects.
    pub fn expected_rows(&self) -> usize {
        self.pixel_features() + usize::from(self.has_bias)
    }
}

/// Renders every class column of `weights` as an image tile, each enlarged
/// `scale` times, tiled left to right.
///
/// Each tile is min–max rescaled on its own to the full 0..=255 range, so the
/// picture shows the shape of a template, not its magnitude.
pub fn render_weights(weights: &Matrix, layout: &ImageLayout, scale: u32) -> Result<RgbImage> {
    if weights.rows != layout.expected_rows() {
        return Err(Error::ShapeMismatch {
            op: "render_weights",
            left: weights.shape(),
            right: (layout.expected_rows(), weights.cols),
        });
    }
    if !(layout.channels == 1 || layout.channels == 3) || scale == 0 {
        return Err(Error::InvalidConfig(format!(
            "cannot draw {} channel(s) at scale {}",
            layout.channels, scale
        )));
    }

    let too_large = || {
        Error::InvalidConfig(format!(
            "{} class tiles of {}×{} pixels at scale {} do not fit in an image",
            weights.cols, layout.width, layout.height, scale
        ))
    };
    let classes = u32::try_from(weights.cols).map_err(|_| too_large())?;
    let tile_w = layout.width.checked_mul(scale).ok_or_else(too_large)?;
    let tile_h = layout.height.checked_mul(scale).ok_or_else(too_large)?;
    let total_w = classes
        .checked_mul(tile_w)
        .and_then(|w| w.checked_add(classes.saturating_sub(1).checked_mul(GAP)?))
        .ok_or_else(too_large)?;
    let mut img = RgbImage::from_pixel(total_w.max(1), tile_h.max(1), Rgb([255, 255, 255]));

    let plane = (layout.width * layout.height) as usize;
    for class in 0..weights.cols {
        let mut column = weights.column(class);
        column.truncate(layout.pixel_features());
        let levels = rescale_to_u8(&column);

        let x0 = class as u32 * (tile_w + GAP);
        for y in 0..layout.height {
            for x in 0..layout.width {
                let idx = (y * layout.width + x) as usize;
                let rgb = if layout.channels == 3 {
                    [levels[idx], levels[plane + idx], levels[2 * plane + idx]]
                } else {
                    [levels[idx]; 3]
                };
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(x0 + x * scale + dx, y * scale + dy, Rgb(rgb));
                    }
                }
            }
        }
    }

    Ok(img)
}

/// Renders the weights and writes them as a PNG to `path`.
pub fn save_weights_image(weights: &Matrix, layout: &ImageLayout, scale: u32, path: &Path) -> Result<()> {
    let img = render_weights(weights, layout, scale)?;
    img.save(path)?;
    info!("wrote weight templates to {}", path.display());
    Ok(())
}

/// Maps `values` linearly so that min → 0 and max → 255. A constant input
/// maps to all zeros.
fn rescale_to_u8(values: &[f64]) -> Vec<u8> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if range > 0.0 {
                (255.0 * (v - min) / range).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        })
        .collect()
}

//! Parser for pairs of IDX binary files (image + label) as used by MNIST and
//! its derivatives (Fashion-MNIST, EMNIST, …).
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```
use std::path::Path;

use log::debug;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Decoded IDX pair plus the image geometry from the header.
#[derive(Debug, Clone)]
pub struct IdxImages {
    pub dataset: Dataset,
    pub rows: usize,
    pub cols: usize,
}

/// Reads and parses an IDX image/label file pair from disk.
pub fn load_idx_pair(images: &Path, labels: &Path) -> Result<IdxImages> {
    let image_bytes = std::fs::read(images)?;
    let label_bytes = std::fs::read(labels)?;
    debug!(
        "read {} image bytes from {} and {} label bytes from {}",
        image_bytes.len(),
        images.display(),
        label_bytes.len(),
        labels.display()
    );
    parse_idx_pair(&image_bytes, &label_bytes)
}

/// Parses in-memory IDX3 image bytes and IDX1 label bytes.
///
/// Pixels are kept as raw `0.0..=255.0` values; scaling is left to
/// preprocessing.
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<IdxImages> {
    // ── Image file validation ───────────────────────────────────────────────

    check_header(image_bytes, 3, 16, "image")?;

    let n_items = read_be_u32(image_bytes, 4);
    let rows = read_be_u32(image_bytes, 8);
    let cols = read_be_u32(image_bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        Error::DataFormat(format!(
            "IDX image file: rows * cols overflows usize (rows={}, cols={}).",
            rows, cols
        ))
    })?;
    let data_len = n_items.checked_mul(n_pixels).ok_or_else(|| {
        Error::DataFormat(format!(
            "IDX image file: n_items * n_pixels overflows usize (n_items={}, n_pixels={}).",
            n_items, n_pixels
        ))
    })?;

    if image_bytes.len() - 16 < data_len {
        return Err(Error::DataFormat(format!(
            "IDX image file too short: header declares {} items of {}×{} pixels \
             ({} data bytes needed after header), but file is only {} bytes total.",
            n_items,
            rows,
            cols,
            data_len,
            image_bytes.len()
        )));
    }

    // ── Label file validation ───────────────────────────────────────────────

    check_header(label_bytes, 1, 8, "label")?;

    let label_count = read_be_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(Error::DataFormat(format!(
            "IDX file mismatch: image file declares {} items but label file declares {}.",
            n_items, label_count
        )));
    }
    if label_bytes.len() - 8 < n_items {
        return Err(Error::DataFormat(format!(
            "IDX label file too short: header declares {} labels but file is only {} bytes.",
            n_items,
            label_bytes.len()
        )));
    }

    // ── Build dataset ───────────────────────────────────────────────────────

    let data = if n_pixels == 0 {
        vec![Vec::new(); n_items]
    } else {
        image_bytes[16..16 + data_len]
            .chunks_exact(n_pixels)
            .map(|chunk| chunk.iter().map(|&px| px as f64).collect())
            .collect()
    };
    let features = Matrix {
        rows: n_items,
        cols: n_pixels,
        data,
    };
    let labels = label_bytes[8..8 + n_items].iter().map(|&b| b as usize).collect();

    Ok(IdxImages {
        dataset: Dataset::new(features, labels)?,
        rows,
        cols,
    })
}

fn check_header(bytes: &[u8], dims: u8, header_len: usize, kind: &str) -> Result<()> {
    if bytes.len() < header_len {
        return Err(Error::DataFormat(format!(
            "IDX {} file too short: expected at least {} header bytes, got {}.",
            kind,
            header_len,
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(Error::DataFormat(format!(
            "IDX {} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            kind, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(Error::DataFormat(format!(
            "IDX {} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            kind, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(Error::DataFormat(format!(
            "IDX {} file: byte 3 (dimensions) must be {}, got {}.",
            kind, dims, bytes[3]
        )));
    }
    Ok(())
}

fn read_be_u32(bytes: &[u8], offset: usize) -> usize {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx3(n: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
        let mut out = vec![0, 0, 0x08, 0x03];
        out.extend_from_slice(&n.to_be_bytes());
        out.extend_from_slice(&rows.to_be_bytes());
        out.extend_from_slice(&cols.to_be_bytes());
        out.extend_from_slice(pixels);
        out
    }

    fn idx1(labels: &[u8]) -> Vec<u8> {
        let mut out = vec![0, 0, 0x08, 0x01];
        out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        out.extend_from_slice(labels);
        out
    }

    #[test]
    fn parses_two_tiny_images() {
        let images = idx3(2, 2, 2, &[0, 255, 10, 20, 1, 2, 3, 4]);
        let labels = idx1(&[7, 3]);

        let parsed = parse_idx_pair(&images, &labels).unwrap();

        assert_eq!((parsed.rows, parsed.cols), (2, 2));
        assert_eq!(parsed.dataset.len(), 2);
        assert_eq!(parsed.dataset.features().row(0), &[0.0, 255.0, 10.0, 20.0]);
        assert_eq!(parsed.dataset.labels(), &[7, 3]);
    }

    #[test]
    fn rejects_truncated_pixels() {
        let images = idx3(2, 2, 2, &[0, 1, 2]);
        let labels = idx1(&[0, 1]);
        assert!(matches!(parse_idx_pair(&images, &labels), Err(Error::DataFormat(_))));
    }

    #[test]
    fn rejects_wrong_dimension_byte() {
        let mut images = idx3(1, 1, 1, &[0]);
        images[3] = 0x02;
        assert!(parse_idx_pair(&images, &idx1(&[0])).is_err());
    }

    #[test]
    fn rejects_count_mismatch() {
        let images = idx3(2, 1, 1, &[0, 1]);
        assert!(parse_idx_pair(&images, &idx1(&[0])).is_err());
    }
}

//! CIFAR-10 binary format.
//!
//! Each record is 3073 bytes: one label byte followed by 3072 pixel bytes
//! (1024 red, then 1024 green, then 1024 blue, each plane row-major 32×32).
//! Batch files are plain concatenations of records.

use std::path::Path;

use log::{debug, info};

use crate::data::dataset::{Dataset, Split};
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

pub const IMAGE_SIDE: usize = 32;
pub const CHANNELS: usize = 3;
pub const PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE * CHANNELS;
pub const RECORD_LEN: usize = 1 + PIXELS;
pub const NUM_CLASSES: usize = 10;

pub const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
pub const TEST_FILE: &str = "test_batch.bin";

/// Parses the records of one batch file. Pixels stay raw `0.0..=255.0`.
pub fn parse_records(bytes: &[u8]) -> Result<Dataset> {
    if bytes.len() % RECORD_LEN != 0 {
        return Err(Error::DataFormat(format!(
            "CIFAR-10 batch length {} is not a multiple of the {}-byte record size",
            bytes.len(),
            RECORD_LEN
        )));
    }

    let mut data = Vec::with_capacity(bytes.len() / RECORD_LEN);
    let mut labels = Vec::with_capacity(bytes.len() / RECORD_LEN);

    for (i, record) in bytes.chunks_exact(RECORD_LEN).enumerate() {
        let label = record[0] as usize;
        if label >= NUM_CLASSES {
            return Err(Error::DataFormat(format!(
                "CIFAR-10 record {} has label {}, expected 0..{}",
                i, label, NUM_CLASSES
            )));
        }
        labels.push(label);
        data.push(record[1..].iter().map(|&px| px as f64).collect());
    }

    let features = Matrix {
        rows: data.len(),
        cols: PIXELS,
        data,
    };
    Dataset::new(features, labels)
}

/// Reads and concatenates the named batch files from `dir`.
pub fn load_batches(dir: &Path, files: &[&str]) -> Result<Dataset> {
    let mut bytes = Vec::new();
    for name in files {
        let path = dir.join(name);
        let chunk = std::fs::read(&path)?;
        debug!("read {} bytes from {}", chunk.len(), path.display());
        bytes.extend_from_slice(&chunk);
    }
    parse_records(&bytes)
}

/// Loads the standard 50 000 / 10 000 train/test split.
pub fn load_split(dir: &Path) -> Result<Split> {
    let train = load_batches(dir, &TRAIN_FILES)?;
    let test = load_batches(dir, &[TEST_FILE])?;
    info!(
        "loaded CIFAR-10 from {}: {} train, {} test",
        dir.display(),
        train.len(),
        test.len()
    );
    Ok(Split { train, test })
}

use thiserror::Error;

/// Errors produced by the classifier, its math kernels and its I/O helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// Two operands of a linear-algebra operation have incompatible shapes.
    #[error("{op}: incompatible shapes {left:?} and {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A label is not a valid class index for the configured class count.
    #[error("label {label} at row {index} is out of range for {num_classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    /// Softmax was asked to normalise rows with zero columns.
    #[error("softmax is undefined for score rows with zero classes")]
    EmptyScores,

    /// Loss was requested for a batch with no rows.
    #[error("loss is undefined for an empty batch")]
    EmptyBatch,

    /// Training or sampling was requested on a dataset with no rows.
    #[error("dataset has no rows")]
    EmptyDataset,

    /// The classifier has no weights yet; call `initialize` first.
    #[error("classifier is not initialized")]
    NotInitialized,

    /// `initialize` was called on a classifier that already holds weights.
    #[error("classifier is already initialized")]
    AlreadyInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A dataset file is truncated or has an unexpected header.
    #[error("malformed data: {0}")]
    DataFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A layer's configuration does not fit the shape its predecessor produces.
    #[error("Type consistency: {0}")]
    TypeConsistency(String),

    #[error("Cannot build a network without layers")]
    EmptyNetwork,

    /// The last layer must be fully connected and emit `n_out` values per row.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Batch index {index} out of range for {partition} partition ({n_batches} batches)")]
    BatchOutOfRange {
        partition: &'static str,
        index: usize,
        n_batches: usize,
    },

    #[error("Early stopping recorded no improvement (min_epochs={min_epochs}, max_epochs={max_epochs})")]
    NoImprovementRecorded { min_epochs: usize, max_epochs: usize },

    #[error("Training diverged at epoch {epoch}: non-finite error")]
    Diverged { epoch: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

use serde::{Deserialize, Serialize};

/// Errors recorded at the end of one epoch by `Network::train`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean of the pre-update training costs of this epoch's batches.
    pub train_error: f64,
    /// Mean validation cost after the epoch's updates.
    pub valid_error: f64,
    /// Wall-clock duration of the epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Why `train_early_stopping` stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// More than `patience` epochs passed without a new best validation error.
    Patience,
    /// The epoch counter reached `max_epochs`.
    MaxEpochs,
}

/// Outcome of an early-stopping run, taken after the best checkpoint has
/// been restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub stop_reason: StopReason,
    /// Epoch counter when training stopped, before restoring.
    pub epochs_run: usize,
    pub best_epoch: usize,
    pub best_valid_error: f64,
    /// Mean test error of the restored model.
    pub test_error: f64,
    pub elapsed_ms: u64,
}

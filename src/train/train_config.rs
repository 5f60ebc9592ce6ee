use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a `train_early_stopping` run.
///
/// # Fields
/// - `patience`           - epochs without a new best validation error
///                          tolerated before stopping
/// - `min_epochs`         - epochs that never count as a new best
/// - `max_epochs`         - hard cap on the epoch counter
/// - `log_progress`       - log `(epoch, train, valid)` at info level every epoch
/// - `halt_on_divergence` - stop with `Error::Diverged` on a non-finite error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyStoppingConfig {
    pub patience: usize,
    pub min_epochs: usize,
    pub max_epochs: usize,
    pub log_progress: bool,
    pub halt_on_divergence: bool,
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        EarlyStoppingConfig {
            patience: 15,
            min_epochs: 0,
            max_epochs: 50000,
            log_progress: true,
            halt_on_divergence: false,
        }
    }
}

impl EarlyStoppingConfig {
    pub fn new(patience: usize, min_epochs: usize, max_epochs: usize) -> Self {
        EarlyStoppingConfig {
            patience,
            min_epochs,
            max_epochs,
            ..EarlyStoppingConfig::default()
        }
    }

    /// Fails when, starting from `epochs` completed epochs, no epoch could
    /// ever be eligible for a checkpoint.
    pub fn check_reachable(&self, epochs: usize) -> Result<()> {
        if self.min_epochs.max(epochs) >= self.max_epochs {
            return Err(Error::NoImprovementRecorded {
                min_epochs: self.min_epochs,
                max_epochs: self.max_epochs,
            });
        }
        Ok(())
    }

    pub fn load_json(path: &str) -> Result<EarlyStoppingConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;

/// Floating-point width values are rounded to when loaded or updated.
///
/// Storage is always `f64`; `Single` rounds every dataset value and every
/// updated parameter through `f32`, reproducing single-precision training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    #[default]
    Single,
    Double,
}

impl Precision {
    pub fn coerce(&self, x: f64) -> f64 {
        match self {
            Precision::Single => x as f32 as f64,
            Precision::Double => x,
        }
    }

    pub fn coerce_matrix(&self, m: Matrix) -> Matrix {
        match self {
            Precision::Single => m.map(|x| x as f32 as f64),
            Precision::Double => m,
        }
    }
}

/// What to do with partition rows that do not fill a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// `n_batches = rows / batch_size`; trailing rows are never visited.
    #[default]
    Drop,
    /// Every partition's row count must be a multiple of the batch size.
    Reject,
}

/// Global hyperparameters of a network.
///
/// Fields:
/// - `seed`          - seeds the RNG shared by every layer's initialisation
/// - `batch_size`    - rows per batch for all four batch functions
/// - `learning_rate` - step size of the momentum update
/// - `momentum`      - decay of the velocity accumulators, in `[0, 1)`
/// - `cost`          - cost reported by the output layer
/// - `precision`     - numeric width applied to data and parameters
/// - `remainder`     - handling of partial trailing batches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub seed: u64,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub cost: LossType,
    pub precision: Precision,
    pub remainder: RemainderPolicy,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            seed: 0,
            batch_size: 32,
            learning_rate: 0.01,
            momentum: 0.9,
            cost: LossType::default(),
            precision: Precision::default(),
            remainder: RemainderPolicy::default(),
        }
    }
}

impl NetworkConfig {
    pub fn new(seed: u64, batch_size: usize, learning_rate: f64, momentum: f64) -> Self {
        NetworkConfig {
            seed,
            batch_size,
            learning_rate,
            momentum,
            ..NetworkConfig::default()
        }
    }

    pub fn with_cost(mut self, cost: LossType) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::InvalidConfig(format!(
                "momentum must lie in [0, 1), got {}",
                self.momentum
            )));
        }
        Ok(())
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Loads a config; missing fields take their `Default` values.
    pub fn load_json(path: &str) -> Result<NetworkConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: NetworkConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_hyperparameters() {
        assert!(NetworkConfig::new(0, 0, 0.1, 0.5).validate().is_err());
        assert!(NetworkConfig::new(0, 4, 0.0, 0.5).validate().is_err());
        assert!(NetworkConfig::new(0, 4, 0.1, 1.0).validate().is_err());
        assert!(NetworkConfig::new(0, 4, 0.1, 0.0).validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: NetworkConfig =
            serde_json::from_str(r#"{ "batch_size": 8, "cost": "mse" }"#).unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.cost, LossType::Mse);
        assert_eq!(config.momentum, NetworkConfig::default().momentum);
    }

    #[test]
    fn single_precision_rounds_through_f32() {
        let x = 0.1_f64;
        assert_eq!(Precision::Single.coerce(x), 0.1_f32 as f64);
        assert_eq!(Precision::Double.coerce(x), x);
    }
}

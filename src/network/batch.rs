use serde::{Deserialize, Serialize};

use crate::data::dataset::{Dataset, PartitionKind};
use crate::error::{Error, Result};
use crate::layers::LayerGrads;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::momentum::Momentum;

/// Batch counts fixed when a network is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub batch_size: usize,
    pub n_train: usize,
    pub n_valid: usize,
    pub n_test: usize,
}

impl BatchPlan {
    pub fn new(dataset: &Dataset, batch_size: usize) -> BatchPlan {
        BatchPlan {
            batch_size,
            n_train: dataset.train.n_batches(batch_size),
            n_valid: dataset.valid.n_batches(batch_size),
            n_test: dataset.test.n_batches(batch_size),
        }
    }

    pub fn n_batches(&self, kind: PartitionKind) -> usize {
        match kind {
            PartitionKind::Train => self.n_train,
            PartitionKind::Valid => self.n_valid,
            PartitionKind::Test => self.n_test,
        }
    }

    /// Fails unless `index` is in `[0, n_batches)` for `kind`.
    pub fn check(&self, kind: PartitionKind, index: usize) -> Result<()> {
        let n_batches = self.n_batches(kind);
        if index >= n_batches {
            return Err(Error::BatchOutOfRange {
                partition: kind.name(),
                index,
                n_batches,
            });
        }
        Ok(())
    }
}

impl Network {
    fn slice(&self, kind: PartitionKind, index: usize) -> Result<(Matrix, Matrix)> {
        self.plan.check(kind, index)?;
        Ok(self.dataset.partition(kind).batch(index, self.plan.batch_size))
    }

    /// Cost on batch `index` of `kind`, no side effects.
    pub fn error_batch(&self, kind: PartitionKind, index: usize) -> Result<f64> {
        let (x, y) = self.slice(kind, index)?;
        self.cost(&x, &y)
    }

    /// One momentum step on training batch `index`. Returns the cost measured
    /// before the update. This is the only operation that changes parameters
    /// or velocities.
    pub fn train_batch(&mut self, index: usize) -> Result<f64> {
        let (x, y) = self.slice(PartitionKind::Train, index)?;
        let (cost, grads) = self.cost_and_gradients(&x, &y)?;
        let rule = Momentum::new(
            self.config.learning_rate,
            self.config.momentum,
            self.config.precision,
        );
        let state = &mut self.state;
        for (l, g) in grads.iter().enumerate() {
            let (params, velocities) = rule.apply(&state.params[l], &state.velocities[l], g);
            state.params[l] = params;
            state.velocities[l] = velocities;
        }
        Ok(cost)
    }

    pub fn train_error_batch(&self, index: usize) -> Result<f64> {
        self.error_batch(PartitionKind::Train, index)
    }

    pub fn valid_error_batch(&self, index: usize) -> Result<f64> {
        self.error_batch(PartitionKind::Valid, index)
    }

    pub fn test_error_batch(&self, index: usize) -> Result<f64> {
        self.error_batch(PartitionKind::Test, index)
    }

    /// Gradients of the cost on batch `index` of `kind`, without updating.
    pub fn gradients(&self, kind: PartitionKind, index: usize) -> Result<Vec<LayerGrads>> {
        let (x, y) = self.slice(kind, index)?;
        Ok(self.cost_and_gradients(&x, &y)?.1)
    }

    /// Mean of the per-batch costs over every whole batch of `kind`.
    pub fn mean_error(&self, kind: PartitionKind) -> Result<f64> {
        let n = self.plan.n_batches(kind);
        if n == 0 {
            return Err(Error::InvalidDataset(format!(
                "{} partition has no whole batch of {}",
                kind.name(),
                self.plan.batch_size
            )));
        }
        let mut total = 0.0;
        for i in 0..n {
            total += self.error_batch(kind, i)?;
        }
        Ok(total / n as f64)
    }

    pub fn train_error(&self) -> Result<f64> {
        self.mean_error(PartitionKind::Train)
    }

    pub fn valid_error(&self) -> Result<f64> {
        self.mean_error(PartitionKind::Valid)
    }

    pub fn test_error(&self) -> Result<f64> {
        self.mean_error(PartitionKind::Test)
    }

    /// Network output for up to `batch_size` rows of `x`.
    ///
    /// `x` is padded with zero rows (or truncated) to one batch, run through
    /// the network, and the first `min(x.rows, batch_size)` output rows are
    /// returned. Rows never interact, so padding does not change them.
    pub fn output(&self, x: &Matrix) -> Result<Matrix> {
        self.check_input(x)?;
        let rows = x.rows.min(self.plan.batch_size);
        let batch = x.resize_rows(self.plan.batch_size);
        Ok(self.forward(&batch)?.slice_rows(0, rows))
    }
}

use std::time::Instant;

use log::info;

use crate::error::{Error, Result};
use crate::network::network::Network;
use crate::network::state::ModelState;
use crate::train::early_stopping::EarlyStopping;
use crate::train::epoch_stats::{EpochStats, StopReason, TrainingReport};
use crate::train::train_config::EarlyStoppingConfig;

impl Network {
    /// Runs one epoch: `train_batch` over every training batch in ascending
    /// order, then the validation error. Both means are appended to the
    /// history.
    pub fn train(&mut self) -> Result<EpochStats> {
        let t_start = Instant::now();
        self.state.epochs += 1;

        let n = self.plan.n_train;
        let mut total = 0.0;
        for i in 0..n {
            total += self.train_batch(i)?;
        }
        let train_error = total / n as f64;
        let valid_error = self.valid_error()?;

        self.state.train_errors.push(train_error);
        self.state.valid_errors.push(valid_error);

        Ok(EpochStats {
            epoch: self.state.epochs,
            train_error,
            valid_error,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        })
    }

    /// Trains until patience runs out or `max_epochs` is reached, then
    /// restores the state of the epoch with the lowest validation error and
    /// measures the test error once.
    ///
    /// # Errors
    /// - `NoImprovementRecorded` if no epoch can be eligible for a checkpoint
    ///   (checked before training) or none improved on the initial best
    /// - `Diverged` when `halt_on_divergence` is set and an error is not finite
    pub fn train_early_stopping(&mut self, config: &EarlyStoppingConfig) -> Result<TrainingReport> {
        config.check_reachable(self.state.epochs)?;
        let t_start = Instant::now();

        let mut tracker: EarlyStopping<ModelState> = EarlyStopping::new(config);
        let mut stop_reason = StopReason::MaxEpochs;

        while self.state.epochs < config.max_epochs {
            let stats = self.train()?;

            if config.halt_on_divergence
                && !(stats.train_error.is_finite() && stats.valid_error.is_finite())
            {
                return Err(Error::Diverged { epoch: stats.epoch });
            }
            if config.log_progress {
                info!("({}, {}, {})", stats.epoch, stats.train_error, stats.valid_error);
            }

            let state = &self.state;
            if tracker.observe(stats.epoch, stats.valid_error, || state.clone()) {
                stop_reason = StopReason::Patience;
                break;
            }
        }

        let epochs_run = self.state.epochs;
        let best_epoch = tracker.best_epoch();
        let best_valid_error = tracker.best_error();
        let best = tracker.into_best().ok_or(Error::NoImprovementRecorded {
            min_epochs: config.min_epochs,
            max_epochs: config.max_epochs,
        })?;
        self.restore(best)?;

        let test_error = self.test_error()?;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        info!("Testing error = {}", test_error);
        info!("Time elapsed: {:.3}s", elapsed_ms as f64 / 1000.0);

        Ok(TrainingReport {
            stop_reason,
            epochs_run,
            best_epoch,
            best_valid_error,
            test_error,
            elapsed_ms,
        })
    }
}

use log::debug;

use crate::train::train_config::EarlyStoppingConfig;

/// Tracks the best validation error seen so far and holds one checkpoint of
/// type `S` taken at that epoch.
///
/// Epochs up to and including `min_epochs` are ignored entirely. After that,
/// a strictly lower validation error replaces the checkpoint, and `observe`
/// reports that patience ran out once `epoch − best_epoch > patience`.
#[derive(Debug)]
pub struct EarlyStopping<S> {
    patience: usize,
    min_epochs: usize,
    best_error: f64,
    best_epoch: usize,
    best: Option<S>,
}

impl<S> EarlyStopping<S> {
    pub fn new(config: &EarlyStoppingConfig) -> Self {
        EarlyStopping {
            patience: config.patience,
            min_epochs: config.min_epochs,
            best_error: f64::INFINITY,
            best_epoch: 0,
            best: None,
        }
    }

    /// Records the validation error of `epoch`. `checkpoint` is only called
    /// when the epoch is a new best. Returns `true` when patience is exhausted.
    pub fn observe<F>(&mut self, epoch: usize, valid_error: f64, checkpoint: F) -> bool
    where
        F: FnOnce() -> S,
    {
        if epoch <= self.min_epochs {
            return false;
        }
        if valid_error < self.best_error {
            debug!("epoch {epoch}: new best validation error {valid_error}");
            self.best = Some(checkpoint());
            self.best_error = valid_error;
            self.best_epoch = epoch;
        }
        epoch.saturating_sub(self.best_epoch) > self.patience
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    pub fn best_error(&self) -> f64 {
        self.best_error
    }

    pub fn into_best(self) -> Option<S> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeds `errors` as epochs 1.. and returns (stop epoch, checkpoint).
    fn run(errors: &[f64], config: &EarlyStoppingConfig) -> (Option<usize>, Option<usize>) {
        let mut tracker = EarlyStopping::new(config);
        for (i, &e) in errors.iter().enumerate() {
            let epoch = i + 1;
            if tracker.observe(epoch, e, || epoch) {
                return (Some(epoch), tracker.into_best());
            }
        }
        (None, tracker.into_best())
    }

    #[test]
    fn keeps_minimum_and_stops_after_patience() {
        // minimum at epoch 4
        let errors = [0.9, 0.7, 0.5, 0.4, 0.45, 0.5, 0.6, 0.7, 0.8, 0.9];
        let (stop, best) = run(&errors, &EarlyStoppingConfig::new(3, 0, 100));
        assert_eq!(best, Some(4));
        assert_eq!(stop, Some(4 + 3 + 1));
    }

    #[test]
    fn epochs_up_to_min_epochs_never_checkpoint() {
        let errors = [0.1, 0.2, 0.3, 0.25, 0.4];
        let (_, best) = run(&errors, &EarlyStoppingConfig::new(10, 2, 100));
        assert_eq!(best, Some(4));
    }

    #[test]
    fn equal_errors_are_not_improvements() {
        let errors = [0.5, 0.5, 0.5];
        let (stop, best) = run(&errors, &EarlyStoppingConfig::new(1, 0, 100));
        assert_eq!(best, Some(1));
        assert_eq!(stop, Some(3));
    }

    #[test]
    fn nan_errors_never_checkpoint() {
        let errors = [f64::NAN; 4];
        let (stop, best) = run(&errors, &EarlyStoppingConfig::new(2, 0, 100));
        assert_eq!(best, None);
        assert_eq!(stop, Some(3));
    }
}

use serde::{Deserialize, Serialize};

use crate::layers::LayerParams;

/// Everything training mutates: parameters, velocities, and history.
///
/// Parameter matrices are reference counted and replaced, never written in
/// place, so `clone()` is a cheap checkpoint that later training steps cannot
/// disturb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// One entry per layer, in layer order.
    pub params: Vec<LayerParams>,
    /// Momentum accumulators, shaped like `params`.
    pub velocities: Vec<LayerParams>,
    /// Completed epochs.
    pub epochs: usize,
    /// Mean training error of each completed epoch.
    pub train_errors: Vec<f64>,
    /// Mean validation error of each completed epoch.
    pub valid_errors: Vec<f64>,
}

impl ModelState {
    /// Fresh state: zero velocities, epoch 0, empty histories.
    pub fn new(params: Vec<LayerParams>) -> ModelState {
        let velocities = params.iter().map(LayerParams::zeros_like).collect();
        ModelState {
            params,
            velocities,
            epochs: 0,
            train_errors: Vec::new(),
            valid_errors: Vec::new(),
        }
    }
}

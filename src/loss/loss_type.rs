use serde::{Deserialize, Serialize};

use crate::loss::{AbsTanhLoss, HuberLoss, MaeLoss, MseLoss};
use crate::math::matrix::Matrix;

/// Selects the cost the output layer reports and the trainer minimises.
///
/// - `AbsTanh` - mean |tanh(residual)|; the default, robust to outliers.
/// - `Mae`     - mean absolute error.
/// - `Mse`     - mean-squared error.
/// - `Huber`   - Huber loss (δ=1.0).
///
/// All four are symmetric in the residual and zero when it is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    AbsTanh,
    Mae,
    Mse,
    Huber,
}

impl LossType {
    /// Scalar cost averaged over every element of the batch.
    pub fn loss(&self, predicted: &Matrix, expected: &Matrix) -> f64 {
        match self {
            LossType::AbsTanh => AbsTanhLoss::loss(predicted, expected),
            LossType::Mae => MaeLoss::loss(predicted, expected),
            LossType::Mse => MseLoss::loss(predicted, expected),
            LossType::Huber => HuberLoss::loss(predicted, expected),
        }
    }

    /// ∂cost/∂predicted, same shape as `predicted`.
    pub fn derivative(&self, predicted: &Matrix, expected: &Matrix) -> Matrix {
        match self {
            LossType::AbsTanh => AbsTanhLoss::derivative(predicted, expected),
            LossType::Mae => MaeLoss::derivative(predicted, expected),
            LossType::Mse => MseLoss::derivative(predicted, expected),
            LossType::Huber => HuberLoss::derivative(predicted, expected),
        }
    }
}

use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        predicted.zip_map(expected, |p, y| (p - y).powi(2)).mean()
    }

    /// Per-element gradient: 2 (predicted - expected) / n
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        let n = predicted.data.len() as f64;
        predicted.zip_map(expected, |p, y| 2.0 * (p - y) / n)
    }
}

use crate::math::matrix::Matrix;

/// Mean absolute error squashed through tanh: mean(|tanh(predicted − expected)|).
///
/// Behaves like MAE for small residuals and saturates at 1 for large ones, so a
/// handful of outliers cannot dominate a batch.
pub struct AbsTanhLoss;

impl AbsTanhLoss {
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        predicted.zip_map(expected, |p, y| (p - y).tanh().abs()).mean()
    }

    /// sign(p − y) · (1 − tanh²(p − y)) / n, zero where the residual is zero.
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        let n = predicted.data.len() as f64;
        predicted.zip_map(expected, |p, y| {
            let d = p - y;
            if d == 0.0 {
                return 0.0;
            }
            let t = d.tanh();
            d.signum() * (1.0 - t * t) / n
        })
    }
}

use crate::math::matrix::Matrix;

pub struct MaeLoss;

impl MaeLoss {
    /// Scalar MAE: mean(|predicted - expected|)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        predicted.zip_map(expected, |p, y| (p - y).abs()).mean()
    }

    /// Per-element subgradient: sign(p - y) / n  (0 when equal)
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        let n = predicted.data.len() as f64;
        predicted.zip_map(expected, |p, y| {
            let diff = p - y;
            if diff > 0.0 { 1.0 / n } else if diff < 0.0 { -1.0 / n } else { 0.0 }
        })
    }
}

use crate::math::matrix::Matrix;

pub struct HuberLoss;

const DELTA: f64 = 1.0;

impl HuberLoss {
    /// mean(h(predicted − expected)) with
    /// h(x) = 0.5·x² if |x| ≤ δ, else δ·(|x| − 0.5·δ)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        predicted
            .zip_map(expected, |p, y| {
                let x = p - y;
                if x.abs() <= DELTA {
                    0.5 * x * x
                } else {
                    DELTA * (x.abs() - 0.5 * DELTA)
                }
            })
            .mean()
    }

    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        let n = predicted.data.len() as f64;
        predicted.zip_map(expected, |p, y| {
            let x = p - y;
            let g = if x.abs() <= DELTA { x } else { DELTA * x.signum() };
            g / n
        })
    }
}

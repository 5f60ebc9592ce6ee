use crate::layers::{LayerGrads, LayerParams};
use crate::math::matrix::Matrix;
use crate::network::config::Precision;

/// Momentum SGD with an exponentially-averaged gradient:
///
/// ```text
/// v ← μ·v + (1 − μ)·g
/// θ ← θ − η·v
/// ```
///
/// Updates return fresh values; the inputs are left untouched so earlier
/// checkpoints stay valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    pub learning_rate: f64,
    pub momentum: f64,
    pub precision: Precision,
}

impl Momentum {
    pub fn new(learning_rate: f64, momentum: f64, precision: Precision) -> Momentum {
        Momentum {
            learning_rate,
            momentum,
            precision,
        }
    }

    /// One update of a single parameter. Returns `(θ', v')`.
    pub fn step(&self, param: &Matrix, velocity: &Matrix, grad: &Matrix) -> (Matrix, Matrix) {
        let mu = self.momentum;
        let velocity = velocity.zip_map(grad, |v, g| self.precision.coerce(mu * v + (1.0 - mu) * g));
        let param = param.zip_map(&velocity, |p, v| self.precision.coerce(p - self.learning_rate * v));
        (param, velocity)
    }

    /// Updates a layer's weights and biases. Returns `(params', velocities')`.
    pub fn apply(
        &self,
        params: &LayerParams,
        velocities: &LayerParams,
        grads: &LayerGrads,
    ) -> (LayerParams, LayerParams) {
        let (w, vw) = self.step(&params.weights, &velocities.weights, &grads.weights);
        let (b, vb) = self.step(&params.biases, &velocities.biases, &grads.biases);
        (LayerParams::new(w, b), LayerParams::new(vw, vb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scalar_sequence_matches_closed_form() {
        let rule = Momentum::new(0.1, 0.5, Precision::Double);
        let grad = Matrix::from_rows(vec![vec![1.0]]).unwrap();
        let mut theta = Matrix::from_rows(vec![vec![1.0]]).unwrap();
        let mut velocity = Matrix::zeros(1, 1);

        let expected_v = [0.5, 0.75, 0.875];
        let expected_drop = [0.05, 0.075, 0.0875];
        for (v_want, drop) in expected_v.iter().zip(expected_drop.iter()) {
            let before = theta.data[0];
            let (t, v) = rule.step(&theta, &velocity, &grad);
            assert_abs_diff_eq!(v.data[0], *v_want, epsilon = 1e-12);
            assert_abs_diff_eq!(before - t.data[0], *drop, epsilon = 1e-12);
            theta = t;
            velocity = v;
        }
    }

    #[test]
    fn apply_leaves_inputs_untouched() {
        let rule = Momentum::new(0.5, 0.0, Precision::Double);
        let params = LayerParams::new(Matrix::zeros(2, 2), Matrix::zeros(1, 2));
        let velocities = params.zeros_like();
        let grads = LayerGrads {
            weights: Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap(),
            biases: Matrix::from_rows(vec![vec![-2.0, 2.0]]).unwrap(),
        };
        let (new_params, new_velocities) = rule.apply(&params, &velocities, &grads);
        assert_eq!(new_params.weights.data, vec![-0.5, -1.0, -1.5, -2.0]);
        assert_eq!(new_params.biases.data, vec![1.0, -1.0]);
        assert_eq!(new_velocities.weights.data, grads.weights.data);
        assert!(params.weights.data.iter().all(|&w| w == 0.0));
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::{LayerGrads, LayerParams, OutputShape, Trace};
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::network::config::Precision;

/// Affine map over the flattened input followed by an activation:
/// `a = f(x·W + b)` with `W` of shape `(input_length, output_length)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullyConnectedLayer {
    pub input_length: usize,
    pub output_length: usize,
    pub activation: ActivationFunction,
    /// Cost reported when this layer terminates the network.
    pub cost: LossType,
}

impl FullyConnectedLayer {
    pub fn new(
        input_length: usize,
        output_length: usize,
        activation: ActivationFunction,
        cost: LossType,
    ) -> Result<FullyConnectedLayer> {
        if input_length == 0 || output_length == 0 {
            return Err(Error::TypeConsistency(format!(
                "fully connected layer needs non-zero widths, got {} -> {}",
                input_length, output_length
            )));
        }
        Ok(FullyConnectedLayer {
            input_length,
            output_length,
            activation,
            cost,
        })
    }

    pub fn output_shape(&self) -> OutputShape {
        OutputShape::Flat { length: self.output_length }
    }

    /// Glorot-uniform weights, zero biases.
    pub fn init_params<R: Rng>(&self, rng: &mut R, precision: Precision) -> LayerParams {
        let bound = self.activation.init_gain()
            * (6.0 / (self.input_length + self.output_length) as f64).sqrt();
        let weights = Matrix::uniform(self.input_length, self.output_length, bound, rng);
        LayerParams::new(
            precision.coerce_matrix(weights),
            Matrix::zeros(1, self.output_length),
        )
    }

    pub fn forward(&self, params: &LayerParams, x: &Matrix) -> (Matrix, Trace) {
        let z = (x * &*params.weights).add_row_vector(&params.biases);
        let a = self.activation.apply(&z);
        (a, Trace { z, argmax: Vec::new() })
    }

    pub fn backward(
        &self,
        params: &LayerParams,
        x: &Matrix,
        trace: &Trace,
        upstream: &Matrix,
    ) -> (LayerGrads, Matrix) {
        // δ = ∂cost/∂a ⊙ f'(z)
        let delta = self.activation.backprop(&trace.z, upstream);
        let weights = &x.transpose() * &delta;
        let biases = delta.column_sums();
        let input_grad = &delta * &params.weights.transpose();
        (LayerGrads { weights, biases }, input_grad)
    }

    /// Scalar cost of `output` against `target`.
    pub fn cost(&self, output: &Matrix, target: &Matrix) -> Result<f64> {
        if target.cols != self.output_length || target.rows != output.rows {
            return Err(Error::ShapeMismatch(format!(
                "target is {}x{}, layer output is {}x{}",
                target.rows, target.cols, output.rows, self.output_length
            )));
        }
        Ok(self.cost.loss(output, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_widths_are_rejected() {
        let err = FullyConnectedLayer::new(0, 3, ActivationFunction::Tanh, LossType::Mse).unwrap_err();
        assert!(matches!(err, Error::TypeConsistency(_)));
    }

    #[test]
    fn forward_is_affine_then_activation() {
        let layer = FullyConnectedLayer::new(2, 1, ActivationFunction::Identity, LossType::Mse).unwrap();
        let params = LayerParams::new(
            Matrix::from_rows(vec![vec![2.0], vec![-1.0]]).unwrap(),
            Matrix::from_rows(vec![vec![0.5]]).unwrap(),
        );
        let x = Matrix::from_rows(vec![vec![1.0, 3.0], vec![0.0, 0.0]]).unwrap();
        let (a, _) = layer.forward(&params, &x);
        assert_eq!(a.to_rows(), vec![vec![-0.5], vec![0.5]]);
    }

    #[test]
    fn glorot_bound_is_respected() {
        let layer = FullyConnectedLayer::new(10, 5, ActivationFunction::Tanh, LossType::Mse).unwrap();
        let params = layer.init_params(&mut StdRng::seed_from_u64(3), Precision::Double);
        let bound = (6.0_f64 / 15.0).sqrt();
        assert!(params.weights.data.iter().all(|w| w.abs() <= bound));
        assert!(params.biases.data.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn cost_checks_target_width() {
        let layer = FullyConnectedLayer::new(2, 2, ActivationFunction::Identity, LossType::Mae).unwrap();
        let out = Matrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        let good = Matrix::from_rows(vec![vec![0.0, 4.0]]).unwrap();
        let bad = Matrix::from_rows(vec![vec![0.0]]).unwrap();
        assert_abs_diff_eq!(layer.cost(&out, &good).unwrap(), 1.5);
        assert!(matches!(layer.cost(&out, &bad), Err(Error::ShapeMismatch(_))));
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::{InputShape, LayerGrads, LayerParams, OutputShape, Trace};
use crate::math::matrix::Matrix;
use crate::network::config::Precision;

/// 1D convolution (valid, stride 1) followed by an activation and
/// non-overlapping max pooling.
///
/// Weights are stored as a `(filters, channels * filter_length)` matrix:
/// row `f`, column `c * filter_length + k` is tap `k` of filter `f` on input
/// channel `c`. Biases are `(1, filters)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvPoolLayer {
    pub input: InputShape,
    pub filters: usize,
    pub filter_length: usize,
    pub pool_size: usize,
    pub activation: ActivationFunction,
}

impl ConvPoolLayer {
    pub fn new(
        input: InputShape,
        filters: usize,
        filter_length: usize,
        pool_size: usize,
        activation: ActivationFunction,
    ) -> Result<ConvPoolLayer> {
        if filters == 0 || filter_length == 0 || pool_size == 0 {
            return Err(Error::TypeConsistency(format!(
                "filters ({}), filter_length ({}) and pool_size ({}) must be positive",
                filters, filter_length, pool_size
            )));
        }
        if input.channels == 0 || filter_length > input.length {
            return Err(Error::TypeConsistency(format!(
                "filter of length {} does not fit an input of {} channels x {} samples",
                filter_length, input.channels, input.length
            )));
        }
        let layer = ConvPoolLayer {
            input,
            filters,
            filter_length,
            pool_size,
            activation,
        };
        if layer.pooled_length() == 0 {
            return Err(Error::TypeConsistency(format!(
                "pool of {} is wider than the {} convolved samples",
                pool_size,
                layer.conv_length()
            )));
        }
        Ok(layer)
    }

    /// Samples per channel after the valid convolution.
    pub fn conv_length(&self) -> usize {
        self.input.length - self.filter_length + 1
    }

    /// Samples per channel after pooling; trailing samples that do not fill a
    /// window are dropped.
    pub fn pooled_length(&self) -> usize {
        self.conv_length() / self.pool_size
    }

    pub fn output_shape(&self) -> OutputShape {
        OutputShape::Feature {
            channels: self.filters,
            length: self.pooled_length(),
        }
    }

    pub fn init_params<R: Rng>(&self, rng: &mut R, precision: Precision) -> LayerParams {
        let fan_in = (self.input.channels * self.filter_length) as f64;
        let fan_out = (self.filters * self.filter_length) as f64 / self.pool_size as f64;
        let bound = self.activation.init_gain() * (6.0 / (fan_in + fan_out)).sqrt();
        let weights = Matrix::uniform(
            self.filters,
            self.input.channels * self.filter_length,
            bound,
            rng,
        );
        LayerParams::new(precision.coerce_matrix(weights), Matrix::zeros(1, self.filters))
    }

    pub fn forward(&self, params: &LayerParams, x: &Matrix) -> (Matrix, Trace) {
        let (channels, in_len, k_len) = (self.input.channels, self.input.length, self.filter_length);
        let conv_len = self.conv_length();
        let pooled_len = self.pooled_length();
        let w = &params.weights;

        let mut z = Matrix::zeros(x.rows, self.filters * conv_len);
        for b in 0..x.rows {
            let xr = x.row(b);
            let zr = z.row_mut(b);
            for f in 0..self.filters {
                let wr = w.row(f);
                let bias = params.biases.data[f];
                for t in 0..conv_len {
                    let mut acc = bias;
                    for c in 0..channels {
                        let taps = &wr[c * k_len..(c + 1) * k_len];
                        let window = &xr[c * in_len + t..c * in_len + t + k_len];
                        acc += taps.iter().zip(window).map(|(a, b)| a * b).sum::<f64>();
                    }
                    zr[f * conv_len + t] = acc;
                }
            }
        }

        let a = self.activation.apply(&z);
        let mut out = Matrix::zeros(x.rows, self.filters * pooled_len);
        let mut argmax = Vec::with_capacity(x.rows * self.filters * pooled_len);
        for b in 0..x.rows {
            let ar = a.row(b);
            for f in 0..self.filters {
                for j in 0..pooled_len {
                    let start = f * conv_len + j * self.pool_size;
                    let mut best = start;
                    for t in start + 1..start + self.pool_size {
                        if ar[t] > ar[best] {
                            best = t;
                        }
                    }
                    out.set(b, f * pooled_len + j, ar[best]);
                    argmax.push(best);
                }
            }
        }
        (out, Trace { z, argmax })
    }

    pub fn backward(
        &self,
        params: &LayerParams,
        x: &Matrix,
        trace: &Trace,
        upstream: &Matrix,
    ) -> (LayerGrads, Matrix) {
        let (channels, in_len, k_len) = (self.input.channels, self.input.length, self.filter_length);
        let conv_len = self.conv_length();
        let pooled_width = self.filters * self.pooled_length();

        // Route each pooled gradient back to the sample that won its window.
        let mut grad_a = Matrix::zeros(x.rows, self.filters * conv_len);
        for b in 0..x.rows {
            let up = upstream.row(b);
            let winners = &trace.argmax[b * pooled_width..(b + 1) * pooled_width];
            let gr = grad_a.row_mut(b);
            for (g, &t) in up.iter().zip(winners) {
                gr[t] += g;
            }
        }
        let delta = self.activation.backprop(&trace.z, &grad_a);

        let w = &params.weights;
        let mut grad_w = Matrix::zeros(w.rows, w.cols);
        let mut grad_b = Matrix::zeros(1, self.filters);
        let mut grad_x = Matrix::zeros(x.rows, x.cols);
        for b in 0..x.rows {
            let xr = x.row(b);
            let dr = delta.row(b);
            for f in 0..self.filters {
                for t in 0..conv_len {
                    let d = dr[f * conv_len + t];
                    if d == 0.0 {
                        continue;
                    }
                    grad_b.data[f] += d;
                    for c in 0..channels {
                        for k in 0..k_len {
                            let xi = c * in_len + t + k;
                            let wi = c * k_len + k;
                            grad_w.data[f * w.cols + wi] += d * xr[xi];
                            grad_x.data[b * x.cols + xi] += d * w.data[f * w.cols + wi];
                        }
                    }
                }
            }
        }
        (
            LayerGrads {
                weights: grad_w,
                biases: grad_b,
            },
            grad_x,
        )
    }
}

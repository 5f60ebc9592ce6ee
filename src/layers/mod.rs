pub mod conv_pool;
pub mod fully_connected;

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::matrix::Matrix;
use crate::network::config::Precision;

pub use conv_pool::ConvPoolLayer;
pub use fully_connected::FullyConnectedLayer;

/// Geometry a layer reads: `channels` signals of `length` samples per row,
/// stored channel-major in one matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputShape {
    pub channels: usize,
    pub length: usize,
}

impl InputShape {
    pub fn width(&self) -> usize {
        self.channels * self.length
    }
}

/// Semantic shape of a layer's output, excluding the batch dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputShape {
    /// `(batch, channels, 1, length)` feature maps.
    Feature { channels: usize, length: usize },
    /// `(batch, length)` vectors.
    Flat { length: usize },
}

impl OutputShape {
    /// Values per row once flattened.
    pub fn width(&self) -> usize {
        match *self {
            OutputShape::Feature { channels, length } => channels * length,
            OutputShape::Flat { length } => length,
        }
    }

    pub fn dims(&self, batch: usize) -> Vec<usize> {
        match *self {
            OutputShape::Feature { channels, length } => vec![batch, channels, 1, length],
            OutputShape::Flat { length } => vec![batch, length],
        }
    }
}

/// Trainable parameters of one layer.
///
/// Values are shared immutably; an update swaps in new matrices, so cloning a
/// `LayerParams` is a checkpoint that later updates never touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerParams {
    pub weights: Arc<Matrix>,
    pub biases: Arc<Matrix>,
}

impl LayerParams {
    pub fn new(weights: Matrix, biases: Matrix) -> LayerParams {
        LayerParams {
            weights: Arc::new(weights),
            biases: Arc::new(biases),
        }
    }

    /// Zero matrices of the same shapes, used for velocity accumulators.
    pub fn zeros_like(&self) -> LayerParams {
        LayerParams::new(
            Matrix::zeros(self.weights.rows, self.weights.cols),
            Matrix::zeros(self.biases.rows, self.biases.cols),
        )
    }
}

/// ∂cost/∂θ for one layer's weights and biases.
#[derive(Debug, Clone)]
pub struct LayerGrads {
    pub weights: Matrix,
    pub biases: Matrix,
}

/// Intermediate values of a forward pass kept for the backward pass.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Pre-activation values.
    pub z: Matrix,
    /// Flat index (within the row) of the winning sample of each pooling
    /// window. Empty for fully connected layers.
    pub argmax: Vec<usize>,
}

/// One stage of the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Layer {
    ConvolutionalPool(ConvPoolLayer),
    FullyConnected(FullyConnectedLayer),
}

impl Layer {
    pub fn input_shape(&self) -> InputShape {
        match self {
            Layer::ConvolutionalPool(l) => l.input,
            Layer::FullyConnected(l) => InputShape { channels: 1, length: l.input_length },
        }
    }

    pub fn output_shape(&self) -> OutputShape {
        match self {
            Layer::ConvolutionalPool(l) => l.output_shape(),
            Layer::FullyConnected(l) => l.output_shape(),
        }
    }

    /// The input the next layer sees when it reads this layer's output.
    pub fn as_input(&self) -> InputShape {
        match self.output_shape() {
            OutputShape::Feature { channels, length } => InputShape { channels, length },
            OutputShape::Flat { length } => InputShape { channels: 1, length },
        }
    }

    /// `(rows, cols)` of the weight and bias matrices.
    pub fn param_shapes(&self) -> ((usize, usize), (usize, usize)) {
        match self {
            Layer::ConvolutionalPool(l) => (
                (l.filters, l.input.channels * l.filter_length),
                (1, l.filters),
            ),
            Layer::FullyConnected(l) => ((l.input_length, l.output_length), (1, l.output_length)),
        }
    }

    pub fn init_params<R: Rng>(&self, rng: &mut R, precision: Precision) -> LayerParams {
        match self {
            Layer::ConvolutionalPool(l) => l.init_params(rng, precision),
            Layer::FullyConnected(l) => l.init_params(rng, precision),
        }
    }

    pub fn forward(&self, params: &LayerParams, x: &Matrix) -> (Matrix, Trace) {
        match self {
            Layer::ConvolutionalPool(l) => l.forward(params, x),
            Layer::FullyConnected(l) => l.forward(params, x),
        }
    }

    /// Returns the parameter gradients and ∂cost/∂x given ∂cost/∂output.
    pub fn backward(
        &self,
        params: &LayerParams,
        x: &Matrix,
        trace: &Trace,
        upstream: &Matrix,
    ) -> (LayerGrads, Matrix) {
        match self {
            Layer::ConvolutionalPool(l) => l.backward(params, x, trace, upstream),
            Layer::FullyConnected(l) => l.backward(params, x, trace, upstream),
        }
    }
}

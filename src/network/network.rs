use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::layers::{FullyConnectedLayer, Layer, LayerGrads, Trace};
use crate::math::matrix::Matrix;
use crate::network::batch::BatchPlan;
use crate::network::builder::{check_chain, check_head};
use crate::network::config::NetworkConfig;
use crate::network::state::ModelState;

/// A built network: fixed topology, its dataset, batch plans and the state
/// training mutates. Created by `NetworkBuilder::build`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub(crate) config: NetworkConfig,
    pub(crate) layers: Vec<Layer>,
    pub(crate) dataset: Dataset,
    pub(crate) plan: BatchPlan,
    pub(crate) state: ModelState,
}

impl Network {
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn plan(&self) -> &BatchPlan {
        &self.plan
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn n_in(&self) -> usize {
        self.dataset.n_in()
    }

    pub fn n_out(&self) -> usize {
        self.dataset.n_out()
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn epochs(&self) -> usize {
        self.state.epochs
    }

    pub fn train_errors(&self) -> &[f64] {
        &self.state.train_errors
    }

    pub fn valid_errors(&self) -> &[f64] {
        &self.state.valid_errors
    }

    /// Replaces the live state, e.g. with an earlier checkpoint. The state
    /// must fit this topology and carry one history entry per epoch.
    pub fn restore(&mut self, state: ModelState) -> Result<()> {
        check_state(&self.layers, &state, self.n_in())?;
        self.state = state;
        Ok(())
    }

    /// Fails unless `x` has one column per network input.
    pub(crate) fn check_input(&self, x: &Matrix) -> Result<()> {
        if x.cols != self.n_in() {
            return Err(Error::TypeConsistency(format!(
                "input rows have {} values, network reads {}",
                x.cols,
                self.n_in()
            )));
        }
        Ok(())
    }

    fn head(&self) -> Result<&FullyConnectedLayer> {
        match self.layers.last() {
            Some(Layer::FullyConnected(l)) => Ok(l),
            _ => Err(Error::ShapeMismatch("last layer must be fully connected".into())),
        }
    }

    /// Runs `x` through every layer, keeping each layer's input and trace.
    fn forward_traced(&self, x: &Matrix) -> (Vec<Matrix>, Vec<Trace>) {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut traces = Vec::with_capacity(self.layers.len());
        activations.push(x.clone());
        for (layer, params) in self.layers.iter().zip(&self.state.params) {
            let (out, trace) = layer.forward(params, &activations[activations.len() - 1]);
            activations.push(out);
            traces.push(trace);
        }
        (activations, traces)
    }

    /// Output of the last layer for every row of `x`.
    pub fn forward(&self, x: &Matrix) -> Result<Matrix> {
        self.check_input(x)?;
        let mut current = x.clone();
        for (layer, params) in self.layers.iter().zip(&self.state.params) {
            current = layer.forward(params, &current).0;
        }
        Ok(current)
    }

    /// Scalar cost of the network on `(x, y)`.
    pub fn cost(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        let head = self.head()?;
        head.cost(&self.forward(x)?, y)
    }

    /// Cost on `(x, y)` and ∂cost/∂θ for every layer, in layer order.
    pub fn cost_and_gradients(&self, x: &Matrix, y: &Matrix) -> Result<(f64, Vec<LayerGrads>)> {
        let head = self.head()?;
        self.check_input(x)?;
        let (activations, traces) = self.forward_traced(x);
        let output = &activations[activations.len() - 1];
        let cost = head.cost(output, y)?;

        let mut upstream = head.cost.derivative(output, y);
        let mut grads = Vec::with_capacity(self.layers.len());
        for i in (0..self.layers.len()).rev() {
            let (g, input_grad) = self.layers[i].backward(
                &self.state.params[i],
                &activations[i],
                &traces[i],
                &upstream,
            );
            grads.push(g);
            upstream = input_grad;
        }
        grads.reverse();
        Ok((cost, grads))
    }

    /// Serializes configuration, topology, parameters, velocities, history
    /// and dataset to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network written by `save_json`, re-checking that its
    /// topology and parameters are consistent.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        network.config.validate()?;
        network
            .dataset
            .check_remainder(network.config.batch_size, network.config.remainder)?;
        check_head(&network.layers, network.n_out())?;
        check_state(&network.layers, &network.state, network.n_in())?;
        if network.plan != BatchPlan::new(&network.dataset, network.config.batch_size) {
            return Err(Error::InvalidDataset("batch plan does not match dataset".into()));
        }
        Ok(network)
    }
}

/// Parameters and velocities must fit `layers`, and the history must hold
/// exactly one entry per completed epoch.
fn check_state(layers: &[Layer], state: &ModelState, n_in: usize) -> Result<()> {
    check_chain(layers, &state.params, n_in)?;
    check_chain(layers, &state.velocities, n_in)?;
    if state.train_errors.len() != state.epochs || state.valid_errors.len() != state.epochs {
        return Err(Error::TypeConsistency(format!(
            "{} epochs but {} training and {} validation errors recorded",
            state.epochs,
            state.train_errors.len(),
            state.valid_errors.len()
        )));
    }
    Ok(())
}

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activation::activation::ActivationFunction;
use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::layers::{ConvPoolLayer, FullyConnectedLayer, InputShape, Layer, LayerParams};
use crate::network::batch::BatchPlan;
use crate::network::config::NetworkConfig;
use crate::network::network::Network;
use crate::network::state::ModelState;

/// Assembles a network one layer at a time.
///
/// Each layer only looks at its immediate predecessor to work out its input
/// geometry, so layers must be added input-first. Parameters are drawn from a
/// single RNG seeded by `config.seed`, in the order layers are added.
#[derive(Debug)]
pub struct NetworkBuilder {
    config: NetworkConfig,
    dataset: Dataset,
    rng: StdRng,
    layers: Vec<Layer>,
    params: Vec<LayerParams>,
}

impl NetworkBuilder {
    pub fn new(config: NetworkConfig, dataset: Dataset) -> Result<NetworkBuilder> {
        config.validate()?;
        dataset.check_remainder(config.batch_size, config.remainder)?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(NetworkBuilder {
            config,
            dataset,
            rng,
            layers: Vec::new(),
            params: Vec::new(),
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn n_in(&self) -> usize {
        self.dataset.n_in()
    }

    pub fn n_out(&self) -> usize {
        self.dataset.n_out()
    }

    /// What the next layer reads: the raw input as one channel, or the
    /// current last layer's output.
    fn next_input(&self) -> InputShape {
        match self.layers.last() {
            None => InputShape { channels: 1, length: self.dataset.n_in() },
            Some(layer) => layer.as_input(),
        }
    }

    fn push(&mut self, layer: Layer) {
        let params = layer.init_params(&mut self.rng, self.config.precision);
        debug!(
            "layer {}: {:?} -> {:?}",
            self.layers.len(),
            layer.input_shape(),
            layer.output_shape()
        );
        self.layers.push(layer);
        self.params.push(params);
    }

    pub fn add_convolutional_pool_layer(
        &mut self,
        filters: usize,
        filter_length: usize,
        pool_size: usize,
        activation: ActivationFunction,
    ) -> Result<&mut Self> {
        let input = self.next_input();
        let layer = ConvPoolLayer::new(input, filters, filter_length, pool_size, activation)?;
        self.push(Layer::ConvolutionalPool(layer));
        Ok(self)
    }

    /// `output_length` of `None` means the target width `n_out`. A
    /// convolutional predecessor is read flattened (`channels × length`).
    pub fn add_fully_connected_layer(
        &mut self,
        output_length: Option<usize>,
        activation: ActivationFunction,
    ) -> Result<&mut Self> {
        let input_length = self.next_input().width();
        let output_length = output_length.unwrap_or(self.dataset.n_out());
        let layer =
            FullyConnectedLayer::new(input_length, output_length, activation, self.config.cost)?;
        self.push(Layer::FullyConnected(layer));
        Ok(self)
    }

    /// Freezes the topology, zeroes velocities, fixes the batch plans and
    /// resets training history.
    pub fn build(self) -> Result<Network> {
        check_head(&self.layers, self.dataset.n_out())?;
        let plan = BatchPlan::new(&self.dataset, self.config.batch_size);
        debug!(
            "built network of {} layers; batches train={} valid={} test={}",
            self.layers.len(),
            plan.n_train,
            plan.n_valid,
            plan.n_test
        );
        Ok(Network {
            config: self.config,
            layers: self.layers,
            dataset: self.dataset,
            plan,
            state: ModelState::new(self.params),
        })
    }
}

/// The network must end in a fully connected layer emitting `n_out` values.
pub(crate) fn check_head(layers: &[Layer], n_out: usize) -> Result<()> {
    match layers.last() {
        None => Err(Error::EmptyNetwork),
        Some(Layer::FullyConnected(l)) if l.output_length == n_out => Ok(()),
        Some(Layer::FullyConnected(l)) => Err(Error::ShapeMismatch(format!(
            "last layer emits {} values, targets have {}",
            l.output_length, n_out
        ))),
        Some(Layer::ConvolutionalPool(_)) => Err(Error::ShapeMismatch(
            "last layer must be fully connected".into(),
        )),
    }
}

/// Every layer must read exactly what its predecessor emits, and every
/// parameter set must match its layer.
pub(crate) fn check_chain(layers: &[Layer], params: &[LayerParams], n_in: usize) -> Result<()> {
    if params.len() != layers.len() {
        return Err(Error::TypeConsistency(format!(
            "{} parameter sets for {} layers",
            params.len(),
            layers.len()
        )));
    }
    let mut width = n_in;
    for (i, (layer, p)) in layers.iter().zip(params).enumerate() {
        if layer.input_shape().width() != width {
            return Err(Error::TypeConsistency(format!(
                "layer {} reads {} values but receives {}",
                i,
                layer.input_shape().width(),
                width
            )));
        }
        let (w_shape, b_shape) = layer.param_shapes();
        if (p.weights.rows, p.weights.cols) != w_shape || (p.biases.rows, p.biases.cols) != b_shape {
            return Err(Error::TypeConsistency(format!(
                "layer {} parameters do not match its shape",
                i
            )));
        }
        width = layer.output_shape().width();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::Partition;

    fn dataset(n_in: usize, n_out: usize) -> Dataset {
        let part = |rows: usize| {
            let x = (0..rows).map(|r| vec![r as f64 * 0.1; n_in]).collect();
            let y = (0..rows).map(|r| vec![r as f64 * 0.01; n_out]).collect();
            Partition::from_rows(x, y).unwrap()
        };
        Dataset::new(part(8), part(4), part(4)).unwrap()
    }

    fn builder() -> NetworkBuilder {
        NetworkBuilder::new(NetworkConfig::new(1, 4, 0.1, 0.5), dataset(20, 3)).unwrap()
    }

    #[test]
    fn conv_chain_infers_shapes() {
        let mut b = builder();
        b.add_convolutional_pool_layer(4, 5, 2, ActivationFunction::Tanh)
            .unwrap()
            .add_convolutional_pool_layer(2, 3, 2, ActivationFunction::Tanh)
            .unwrap()
            .add_fully_connected_layer(Some(6), ActivationFunction::Tanh)
            .unwrap()
            .add_fully_connected_layer(None, ActivationFunction::Identity)
            .unwrap();
        let layers = b.layers();
        // 20 -> conv 16 -> pool 8 ; 4 channels
        assert_eq!(layers[0].as_input(), InputShape { channels: 4, length: 8 });
        // 8 -> conv 6 -> pool 3 ; 2 channels
        assert_eq!(layers[1].input_shape(), InputShape { channels: 4, length: 8 });
        assert_eq!(layers[1].as_input(), InputShape { channels: 2, length: 3 });
        assert_eq!(layers[2].input_shape().width(), 6);
        assert_eq!(layers[3].output_shape().width(), 3);
        assert!(b.build().is_ok());
    }

    #[test]
    fn conv_after_fully_connected_reads_one_channel() {
        let mut b = builder();
        b.add_fully_connected_layer(Some(12), ActivationFunction::Tanh).unwrap();
        b.add_convolutional_pool_layer(2, 3, 2, ActivationFunction::Tanh).unwrap();
        assert_eq!(b.layers()[1].input_shape(), InputShape { channels: 1, length: 12 });
    }

    #[test]
    fn build_requires_fully_connected_head_of_n_out() {
        assert!(matches!(builder().build(), Err(Error::EmptyNetwork)));

        let mut b = builder();
        b.add_convolutional_pool_layer(3, 2, 2, ActivationFunction::Tanh).unwrap();
        assert!(matches!(b.build(), Err(Error::ShapeMismatch(_))));

        let mut b = builder();
        b.add_fully_connected_layer(Some(2), ActivationFunction::Tanh).unwrap();
        assert!(matches!(b.build(), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn incompatible_layer_is_a_type_consistency_error() {
        let mut b = builder();
        b.add_fully_connected_layer(Some(2), ActivationFunction::Tanh).unwrap();
        let err = b
            .add_convolutional_pool_layer(1, 3, 1, ActivationFunction::Tanh)
            .unwrap_err();
        assert!(matches!(err, Error::TypeConsistency(_)));
        assert_eq!(b.layers().len(), 1);
    }

    #[test]
    fn same_seed_gives_same_parameters() {
        let make = || {
            let mut b = builder();
            b.add_fully_connected_layer(None, ActivationFunction::Tanh).unwrap();
            b.build().unwrap()
        };
        assert_eq!(make().state().params, make().state().params);
    }
}

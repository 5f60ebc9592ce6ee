pub mod activation;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use data::dataset::{Dataset, Partition, PartitionKind};
pub use error::{Error, Result};
pub use layers::{InputShape, Layer, LayerParams, OutputShape};
pub use loss::loss_type::LossType;
pub use math::matrix::Matrix;
pub use network::{
    BatchPlan, ModelState, Network, NetworkBuilder, NetworkConfig, Precision, RemainderPolicy,
};
pub use optim::momentum::Momentum;
pub use train::{EarlyStopping, EarlyStoppingConfig, EpochStats, StopReason, TrainingReport};

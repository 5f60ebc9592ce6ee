pub mod dataset;

pub use dataset::{Dataset, Partition, PartitionKind};

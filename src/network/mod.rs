pub mod batch;
pub mod builder;
pub mod config;
pub mod network;
pub mod state;

pub use batch::BatchPlan;
pub use builder::NetworkBuilder;
pub use config::{NetworkConfig, Precision, RemainderPolicy};
pub use network::Network;
pub use state::ModelState;

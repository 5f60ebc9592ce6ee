pub mod early_stopping;
pub mod epoch_stats;
pub mod loop_fn;
pub mod train_config;

pub use early_stopping::EarlyStopping;
pub use epoch_stats::{EpochStats, StopReason, TrainingReport};
pub use train_config::EarlyStoppingConfig;

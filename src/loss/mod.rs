pub mod abs_tanh;
pub mod huber;
pub mod loss_type;
pub mod mae;
pub mod mse;

pub use abs_tanh::AbsTanhLoss;
pub use huber::HuberLoss;
pub use loss_type::LossType;
pub use mae::MaeLoss;
pub use mse::MseLoss;

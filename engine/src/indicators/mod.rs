// Technical indicators used by the forecasters
pub mod sma;

pub use sma::Sma;

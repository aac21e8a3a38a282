//! Domain types for TradeGate

pub mod candle;
pub mod direction;

pub use candle::{validate_series, Candle, CandleError};
pub use direction::TradeDirection;

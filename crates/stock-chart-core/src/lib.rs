pub mod error;
pub mod ohlc;
pub mod period;

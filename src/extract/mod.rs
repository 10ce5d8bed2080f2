//! Candle extraction from chart images
//!
//! - [`shapes`]: grayscale + threshold + external contours -> bounding boxes
//! - [`orderer`]: geometry filter, left-to-right ordering, OHLC synthesis
//! - [`direction`]: which end of a candle body is the open

pub mod direction;
pub mod orderer;
pub mod shapes;

pub use direction::*;
pub use orderer::*;
pub use shapes::*;

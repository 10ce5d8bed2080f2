//! Shape filtering, ordering and OHLC synthesis

use tracing::debug;

use super::{DirectionStrategy, Shape};
use crate::params::ExtractionParams;
use crate::Candle;

/// Turns raw shapes into a time-ordered bar sequence
#[derive(Debug, Clone, Copy, Default)]
pub struct CandleOrderer {
    params: ExtractionParams,
}

impl CandleOrderer {
    pub fn new(params: ExtractionParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &ExtractionParams {
        &self.params
    }

    /// Both dimensions strictly inside the configured bounds
    #[inline]
    pub fn accepts(&self, shape: &Shape) -> bool {
        let p = &self.params;
        p.min_width < shape.width
            && shape.width < p.max_width
            && p.min_height < shape.height
            && shape.height < p.max_height
    }

    /// Drop implausible shapes and sort the rest left to right.
    /// The sort is stable, so shapes sharing an `x` keep detection order.
    pub fn select(&self, shapes: impl IntoIterator<Item = Shape>) -> Vec<Shape> {
        let mut kept: Vec<Shape> = shapes.into_iter().filter(|s| self.accepts(s)).collect();
        kept.sort_by_key(|s| s.x);
        kept
    }

    /// Filter, order and synthesize one bar per surviving shape
    pub fn order<D: DirectionStrategy + ?Sized>(
        &self,
        shapes: impl IntoIterator<Item = Shape>,
        direction: &mut D,
    ) -> Vec<Candle> {
        let kept = self.select(shapes);

        let candles: Vec<Candle> = kept
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                let previous = i.checked_sub(1).map(|j| &kept[j]);
                Candle::from_shape(shape, direction.orient(shape, previous))
            })
            .collect();

        debug!(candles = candles.len(), "candles synthesized");
        candles
    }
}

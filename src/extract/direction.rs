//! Body direction assignment
//!
//! A candle shape only gives the extent of the body; which end is the open
//! cannot be read from the mask. The default [`RandomDirection`] flips a fair
//! coin per shape, so the resulting bar direction carries no information
//! from the image. [`FixedDirection`] and [`SlopeDirection`] are
//! deterministic alternatives; switching to them changes the analysis
//! results and is opt-in.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Shape;

/// Which end of the body is the open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyOrientation {
    /// open = top edge (smaller y), close = bottom edge: visually falling
    OpenAtTop,
    /// open = bottom edge (larger y), close = top edge: visually rising
    OpenAtBottom,
}

impl BodyOrientation {
    /// `(open, close)` for a body spanning `top..bottom`
    #[inline]
    pub fn endpoints(self, top: f64, bottom: f64) -> (f64, f64) {
        match self {
            BodyOrientation::OpenAtTop => (top, bottom),
            BodyOrientation::OpenAtBottom => (bottom, top),
        }
    }
}

/// Picks the body orientation for each shape, in left-to-right order
pub trait DirectionStrategy {
    fn orient(&mut self, shape: &Shape, previous: Option<&Shape>) -> BodyOrientation;
}

impl<D: DirectionStrategy + ?Sized> DirectionStrategy for Box<D> {
    fn orient(&mut self, shape: &Shape, previous: Option<&Shape>) -> BodyOrientation {
        (**self).orient(shape, previous)
    }
}

/// Fair coin flip per shape
#[derive(Debug, Clone)]
pub struct RandomDirection<R: Rng = StdRng> {
    rng: R,
}

impl RandomDirection<StdRng> {
    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible sequence of flips
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomDirection<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DirectionStrategy for RandomDirection<R> {
    fn orient(&mut self, _shape: &Shape, _previous: Option<&Shape>) -> BodyOrientation {
        if self.rng.gen_bool(0.5) {
            BodyOrientation::OpenAtBottom
        } else {
            BodyOrientation::OpenAtTop
        }
    }
}

/// Same orientation for every shape
#[derive(Debug, Clone, Copy)]
pub struct FixedDirection(pub BodyOrientation);

impl DirectionStrategy for FixedDirection {
    fn orient(&mut self, _shape: &Shape, _previous: Option<&Shape>) -> BodyOrientation {
        self.0
    }
}

/// Orientation follows the vertical movement of the body centre relative to
/// the previous shape. Flat moves repeat the last orientation.
#[derive(Debug, Clone, Copy)]
pub struct SlopeDirection {
    last: BodyOrientation,
}

impl Default for SlopeDirection {
    fn default() -> Self {
        Self {
            last: BodyOrientation::OpenAtBottom,
        }
    }
}

impl DirectionStrategy for SlopeDirection {
    fn orient(&mut self, shape: &Shape, previous: Option<&Shape>) -> BodyOrientation {
        if let Some(prev) = previous {
            let (now, before) = (shape.center_y(), prev.center_y());
            if now < before {
                self.last = BodyOrientation::OpenAtBottom;
            } else if now > before {
                self.last = BodyOrientation::OpenAtTop;
            }
        }
        self.last
    }
}

/// Serializable choice of strategy, instantiated once per run
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DirectionPolicy {
    #[default]
    Random,
    Fixed(BodyOrientation),
    Slope,
}

impl DirectionPolicy {
    /// Build a fresh strategy. `seed` only affects [`DirectionPolicy::Random`].
    pub fn strategy(self, seed: Option<u64>) -> Box<dyn DirectionStrategy> {
        match self {
            DirectionPolicy::Random => match seed {
                Some(seed) => Box::new(RandomDirection::seeded(seed)),
                None => Box::new(RandomDirection::from_entropy()),
            },
            DirectionPolicy::Fixed(orientation) => Box::new(FixedDirection(orientation)),
            DirectionPolicy::Slope => Box::new(SlopeDirection::default()),
        }
    }
}

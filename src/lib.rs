//! # candlescope - candlestick chart reader
//!
//! Reads a candlestick chart screenshot, synthesizes an OHLC series from the
//! candle shapes found in it and folds a fixed battery of technical
//! indicators into a buy/sell/neutral decision.
//!
//! The extracted prices are pixel coordinates, not currency, and the body
//! direction of each bar is chosen by a [`DirectionStrategy`] (a fair coin
//! flip by default). Treat the output as a heuristic reading of the picture.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use candlescope::prelude::*;
//!
//! let analyzer = AnalyzerBuilder::new()
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let analysis = analyzer.analyze_path("chart.png", "BTCUSDT", "1h").unwrap();
//! println!(
//!     "{:?} ({:?}), score {}",
//!     analysis.decision.operation, analysis.decision.confidence, analysis.decision.score
//! );
//! ```

pub mod decision;
pub mod extract;
pub mod indicators;
pub mod params;
pub mod report;

use std::path::Path;

use image::DynamicImage;
use rayon::prelude::*;
use tracing::{debug, warn};

use decision::{Decision, DecisionEngine};
use extract::{
    BodyOrientation, CandleOrderer, DirectionPolicy, DirectionStrategy, Shape, ShapeDetector,
};
use indicators::{IndicatorEngine, Verdicts};
use params::{ExtractionParams, IndicatorParams};

pub mod prelude {
    pub use crate::{
        // Pipeline
        analyze_parallel,
        // Decision
        decision::{Confidence, Decision, DecisionEngine, Operation},
        // Extraction
        extract::{
            BodyOrientation, CandleOrderer, DirectionPolicy, DirectionStrategy, FixedDirection,
            RandomDirection, Shape, ShapeDetector, SlopeDirection,
        },
        // Indicators
        indicators::{IndicatorEngine, IndicatorKind, Reading, Verdict, Verdicts},
        // Parameters
        params::{ExtractionParams, IndicatorParams, ParamMeta, ParamType, Parameterized},
        // Errors
        AnalysisError,
        Analysis,
        Analyzer,
        AnalyzerBuilder,
        BatchError,
        BatchResult,
        Candle,
        Chart,
        OHLCExt,
        Period,
        Ratio,
        Result,
        Signal,
        OHLC,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can end an analysis run
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Insufficient data: need {need} bars, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Indicator computation failed: {0}")]
    IndicatorComputation(String),

    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core OHLC data trait. Charts carry no volume, so there is none here.
pub trait OHLC {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

/// Checks shared by every OHLC source
pub trait OHLCExt: OHLC {
    /// Every field must be finite. `high < low` is legal: chart bars keep
    /// screen orientation (see [`Candle`]).
    fn validate(&self) -> Result<()> {
        let fields = [self.open(), self.high(), self.low(), self.close()];
        if fields.iter().any(|v| v.is_nan()) {
            return Err(AnalysisError::IndicatorComputation(
                "NaN in OHLC".to_string(),
            ));
        }
        if fields.iter().any(|v| v.is_infinite()) {
            return Err(AnalysisError::IndicatorComputation(
                "Infinite value in OHLC".to_string(),
            ));
        }
        Ok(())
    }
}

impl<T: OHLC> OHLCExt for T {}

// ============================================================
// CANDLE - one synthesized bar
// ============================================================

/// One bar synthesized from a candle shape.
///
/// All four prices are y pixel coordinates of the source image. `high` is
/// `min(y, y + h)` and `low` is `max(y, y + h)`: the top of the shape on
/// screen is labelled "high" although it is numerically the smaller value.
/// Indicators consume the fields exactly as labelled.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Left edge of the source shape; the bar's position in time
    pub x: u32,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Synthesize a bar from a shape with the given body orientation
    pub fn from_shape(shape: &Shape, orientation: BodyOrientation) -> Self {
        let top = f64::from(shape.top());
        let bottom = shape.bottom() as f64;
        let (open, close) = orientation.endpoints(top, bottom);

        Self {
            x: shape.x,
            open,
            high: top.min(bottom),
            low: top.max(bottom),
            close,
        }
    }
}

impl OHLC for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

// ============================================================
// SIGNAL - closed-set indicator classification
// ============================================================

/// Directional reading of one indicator
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Bullish,
    #[default]
    Neutral,
    Bearish,
}

impl Signal {
    /// Contribution to the decision score
    #[inline]
    pub fn weight(self) -> i32 {
        match self {
            Signal::Bullish => 1,
            Signal::Neutral => 0,
            Signal::Bearish => -1,
        }
    }
}

// ============================================================
// ANALYSIS - result of one run
// ============================================================

/// Everything one run produces: the bars, every verdict and the decision
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    pub symbol: String,
    pub timeframe: String,
    pub candles: Vec<Candle>,
    pub verdicts: Verdicts,
    pub decision: Decision,
}

// ============================================================
// ANALYZER
// ============================================================

/// Run configuration
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalyzerConfig {
    /// Fewer extracted bars than this rejects the run
    pub min_bars: usize,
    pub direction: DirectionPolicy,
    /// Seed for [`DirectionPolicy::Random`]; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_bars: 26,
            direction: DirectionPolicy::Random,
            seed: None,
        }
    }
}

/// Chart image in, decision out.
///
/// Holds configuration only, so one instance can serve any number of
/// concurrent runs. Each run builds its own direction strategy.
#[derive(Debug, Clone)]
pub struct Analyzer {
    detector: ShapeDetector,
    orderer: CandleOrderer,
    indicators: IndicatorEngine,
    decision: DecisionEngine,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    #[inline]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    #[inline]
    pub fn indicator_engine(&self) -> &IndicatorEngine {
        &self.indicators
    }

    /// Fresh direction strategy for one run
    pub fn direction_strategy(&self) -> Box<dyn DirectionStrategy> {
        self.config.direction.strategy(self.config.seed)
    }

    // ===========================================
    // LOW-LEVEL: Extraction
    // ===========================================

    /// Candidate shapes, unfiltered
    pub fn detect_shapes(&self, image: &DynamicImage) -> Vec<Shape> {
        self.detector.detect(image)
    }

    /// Ordered bars using the configured direction policy
    pub fn extract(&self, image: &DynamicImage) -> Vec<Candle> {
        let mut direction = self.direction_strategy();
        self.extract_with(image, direction.as_mut())
    }

    /// Ordered bars using a caller-supplied direction strategy
    pub fn extract_with<D: DirectionStrategy + ?Sized>(
        &self,
        image: &DynamicImage,
        direction: &mut D,
    ) -> Vec<Candle> {
        let shapes = self.detector.detect(image);
        self.orderer.order(shapes, direction)
    }

    // ===========================================
    // HIGH-LEVEL: Full runs
    // ===========================================

    /// Analyze a decoded chart image
    pub fn analyze(&self, image: &DynamicImage, symbol: &str, timeframe: &str) -> Result<Analysis> {
        let mut direction = self.direction_strategy();
        self.analyze_with(image, symbol, timeframe, direction.as_mut())
    }

    /// Analyze with a caller-supplied direction strategy
    pub fn analyze_with<D: DirectionStrategy + ?Sized>(
        &self,
        image: &DynamicImage,
        symbol: &str,
        timeframe: &str,
        direction: &mut D,
    ) -> Result<Analysis> {
        let candles = self.extract_with(image, direction);
        self.analyze_candles(candles, symbol, timeframe)
    }

    /// Analyze an encoded image (PNG, JPEG, ...) held in memory
    pub fn analyze_bytes(&self, bytes: &[u8], symbol: &str, timeframe: &str) -> Result<Analysis> {
        let image = extract::decode(bytes)?;
        self.analyze(&image, symbol, timeframe)
    }

    /// Analyze an image file
    pub fn analyze_path<P: AsRef<Path>>(
        &self,
        path: P,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Analysis> {
        let image = extract::open(path)?;
        self.analyze(&image, symbol, timeframe)
    }

    /// Gate, indicators and decision over an already extracted series
    pub fn analyze_candles(
        &self,
        candles: Vec<Candle>,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Analysis> {
        self.check_len(candles.len())?;

        let verdicts = self.indicators.compute(&candles)?;
        let decision = self.decision.decide(&verdicts);
        debug!(
            symbol,
            timeframe,
            bars = candles.len(),
            score = decision.score,
            "analysis complete"
        );

        Ok(Analysis {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            candles,
            verdicts,
            decision,
        })
    }

    fn check_len(&self, got: usize) -> Result<()> {
        let need = self.config.min_bars;
        if got < need {
            warn!(need, got, "not enough candles extracted");
            return Err(AnalysisError::InsufficientData { need, got });
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating Analyzer instances
#[derive(Debug, Clone, Default)]
pub struct AnalyzerBuilder {
    extraction: ExtractionParams,
    indicators: IndicatorParams,
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extraction parameters (threshold, geometry bounds)
    pub fn extraction(mut self, params: ExtractionParams) -> Self {
        self.extraction = params;
        self
    }

    /// Replace the indicator parameters
    pub fn indicators(mut self, params: IndicatorParams) -> Self {
        self.indicators = params;
        self
    }

    /// Minimum number of bars a run needs
    pub fn min_bars(mut self, min_bars: usize) -> Self {
        self.config.min_bars = min_bars;
        self
    }

    pub fn direction(mut self, policy: DirectionPolicy) -> Self {
        self.config.direction = policy;
        self
    }

    /// Seed the coin flip so repeated runs produce identical bars
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the analyzer
    pub fn build(self) -> Result<Analyzer> {
        self.extraction.validate()?;
        self.indicators.validate()?;

        let required = self.indicators.required_bars();
        if self.config.min_bars < required {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_bars = {} is below the {} bars the indicators need",
                self.config.min_bars, required
            )));
        }

        Ok(Analyzer {
            detector: ShapeDetector::from_params(&self.extraction),
            orderer: CandleOrderer::new(self.extraction),
            indicators: IndicatorEngine::new(self.indicators),
            decision: DecisionEngine,
            config: self.config,
        })
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

/// One chart of a batch
#[derive(Debug, Clone, Copy)]
pub struct Chart<'a> {
    pub symbol: &'a str,
    pub timeframe: &'a str,
    pub image: &'a DynamicImage,
}

/// Result of analyzing a single chart
#[derive(Debug)]
pub struct BatchResult {
    pub symbol: String,
    pub analysis: Analysis,
}

/// Error from analyzing a single chart
#[derive(Debug)]
pub struct BatchError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Parallel analysis of independent charts
pub fn analyze_parallel<'a, I>(analyzer: &Analyzer, charts: I) -> (Vec<BatchResult>, Vec<BatchError>)
where
    I: IntoParallelIterator<Item = Chart<'a>>,
{
    let results: Vec<_> = charts
        .into_par_iter()
        .map(|chart| {
            analyzer
                .analyze(chart.image, chart.symbol, chart.timeframe)
                .map(|analysis| BatchResult {
                    symbol: chart.symbol.to_string(),
                    analysis,
                })
                .map_err(|error| BatchError {
                    symbol: chart.symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorKind;

    fn rising_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let shape = Shape::new(10 + i as u32 * 20, 50 + i as u32 * 5, 10, 40);
                Candle::from_shape(&shape, BodyOrientation::OpenAtTop)
            })
            .collect()
    }

    #[test]
    fn test_ratio_validation() {
        assert!(Ratio::new(0.0).is_ok());
        assert!(Ratio::new(1.0).is_ok());
        assert!(Ratio::new(0.618).is_ok());
        assert!(Ratio::new(-0.1).is_err());
        assert!(Ratio::new(1.1).is_err());
        assert!(Ratio::new(f64::NAN).is_err());
        assert!(Ratio::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(52).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_candle_from_shape_keeps_screen_orientation() {
        let shape = Shape::new(3, 100, 8, 40);

        let up = Candle::from_shape(&shape, BodyOrientation::OpenAtBottom);
        assert_eq!(up.open, 140.0);
        assert_eq!(up.close, 100.0);
        assert_eq!(up.high, 100.0);
        assert_eq!(up.low, 140.0);

        let down = Candle::from_shape(&shape, BodyOrientation::OpenAtTop);
        assert_eq!(down.open, 100.0);
        assert_eq!(down.close, 140.0);
        assert_eq!(down.high, up.high);
        assert_eq!(down.low, up.low);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let bar = Candle {
            x: 0,
            open: f64::NAN,
            high: 1.0,
            low: 2.0,
            close: 1.0,
        };
        assert!(matches!(
            bar.validate(),
            Err(AnalysisError::IndicatorComputation(_))
        ));
    }

    #[test]
    fn test_signal_weight() {
        assert_eq!(Signal::Bullish.weight(), 1);
        assert_eq!(Signal::Neutral.weight(), 0);
        assert_eq!(Signal::Bearish.weight(), -1);
        assert_eq!(Signal::default(), Signal::Neutral);
    }

    #[test]
    fn test_builder_defaults() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        assert_eq!(analyzer.config().min_bars, 26);
        assert_eq!(analyzer.config().direction, DirectionPolicy::Random);
        assert!(analyzer.config().seed.is_none());
    }

    #[test]
    fn test_builder_rejects_min_bars_below_indicator_need() {
        let result = AnalyzerBuilder::new().min_bars(10).build();
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_extraction() {
        let extraction = ExtractionParams {
            min_width: 30,
            max_width: 5,
            ..Default::default()
        };
        let result = AnalyzerBuilder::new().extraction(extraction).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_gate_rejects_25_bars() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        let err = analyzer
            .analyze_candles(rising_candles(25), "BTCUSDT", "1h")
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { need: 26, got: 25 }
        ));
    }

    #[test]
    fn test_gate_accepts_26_bars() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        let analysis = analyzer
            .analyze_candles(rising_candles(26), "BTCUSDT", "1h")
            .unwrap();
        assert_eq!(analysis.candles.len(), 26);
        assert_eq!(analysis.verdicts.len(), IndicatorKind::ALL.len());
    }

    #[test]
    fn test_rising_series_buys() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        let analysis = analyzer
            .analyze_candles(rising_candles(30), "PETR4", "15m")
            .unwrap();

        assert_eq!(
            analysis.verdicts.signal(IndicatorKind::MovingAverages),
            Signal::Bullish
        );
        assert!(analysis.decision.score >= 1);
        assert_eq!(analysis.decision.operation, decision::Operation::Buy);
        assert_eq!(analysis.symbol, "PETR4");
        assert_eq!(analysis.timeframe, "15m");
    }

    #[test]
    fn test_analyze_bytes_rejects_garbage() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        let err = analyzer
            .analyze_bytes(b"definitely not a png", "BTCUSDT", "1h")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ImageDecode(_)));
    }

    #[test]
    fn test_parallel_blank_charts_fail_individually() {
        let analyzer = AnalyzerBuilder::new().seed(1).build().unwrap();
        let blank = DynamicImage::new_rgb8(64, 64);
        let charts = vec![
            Chart {
                symbol: "AAPL",
                timeframe: "1d",
                image: &blank,
            },
            Chart {
                symbol: "GOOGL",
                timeframe: "1d",
                image: &blank,
            },
        ];

        let (results, errors) = analyze_parallel(&analyzer, charts);
        assert!(results.is_empty());
        assert_eq!(errors.len(), 2);
    }
}

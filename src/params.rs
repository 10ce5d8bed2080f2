//! Tunable parameters for extraction and indicators
//!
//! Every threshold the pipeline uses lives in one of two typed structs,
//! [`ExtractionParams`] and [`IndicatorParams`]. Both deserialize with
//! defaults for missing fields and carry metadata enabling:
//! - Grid search over chart styles
//! - Parameter documentation (`candlescope params`)
//! - Construction from loose `name -> value` maps
//!
//! # Example
//!
//! ```rust
//! use candlescope::params::{ExtractionParams, Parameterized};
//!
//! for param in ExtractionParams::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{AnalysisError, Period, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Grayscale intensity, 0..=255
  Intensity,
  /// Size in pixels
  Pixels,
  /// Window length (positive integer)
  Period,
  /// Oscillator level or band multiplier
  Level,
}

/// Metadata for a single parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "max_height")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn intensity(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Intensity, default, range, description }
  }

  pub const fn pixels(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Pixels, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn level(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Level, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value.is_nan() || value < min || value > max {
      return Err(AnalysisError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Level => Ok(()),
      ParamType::Intensity | ParamType::Pixels | ParamType::Period => {
        if value.fract() != 0.0 {
          return Err(AnalysisError::InvalidValue("Integer parameter has a fractional part"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED TRAIT
// ============================================================

/// Parameter sets that can be discovered and built from loose values
pub trait Parameterized: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a parameter set from a HashMap.
  ///
  /// Missing parameters use their default values. Unknown keys are rejected.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Section name for display
  fn section() -> &'static str;
}

/// Reject keys that no parameter of `meta` answers to, and out-of-range values
fn check_known(params: &HashMap<&str, f64>, meta: &[ParamMeta]) -> Result<()> {
  for (key, value) in params {
    match meta.iter().find(|m| m.name == *key) {
      Some(m) => m.validate(*value)?,
      None => return Err(AnalysisError::InvalidConfig(format!("unknown parameter `{}`", key))),
    }
  }
  Ok(())
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  Period::new(value as usize)
}

/// Helper to get a pixel size from params with default fallback
pub fn get_pixels(params: &HashMap<&str, f64>, key: &str, default: u32) -> u32 {
  params.get(key).map(|v| *v as u32).unwrap_or(default)
}

/// Helper to get a float level from params with default fallback
pub fn get_level(params: &HashMap<&str, f64>, key: &str, default: f64) -> f64 {
  params.get(key).copied().unwrap_or(default)
}

// ============================================================
// EXTRACTION PARAMETERS
// ============================================================

/// Threshold and geometry bounds for candle extraction.
///
/// Defaults are tuned for light-background charts around 800-1200 px wide;
/// other resolutions need other bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExtractionParams {
  /// Pixels with intensity at or below this are foreground
  pub threshold: u8,
  /// Exclusive width bounds
  pub min_width: u32,
  pub max_width: u32,
  /// Exclusive height bounds
  pub min_height: u32,
  pub max_height: u32,
}

impl Default for ExtractionParams {
  fn default() -> Self {
    Self { threshold: 180, min_width: 5, max_width: 30, min_height: 20, max_height: 200 }
  }
}

impl ExtractionParams {
  pub fn validate(&self) -> Result<()> {
    if self.min_width >= self.max_width {
      return Err(AnalysisError::InvalidConfig(format!(
        "min_width ({}) must be below max_width ({})",
        self.min_width, self.max_width
      )));
    }
    if self.min_height >= self.max_height {
      return Err(AnalysisError::InvalidConfig(format!(
        "min_height ({}) must be below max_height ({})",
        self.min_height, self.max_height
      )));
    }
    Ok(())
  }
}

static EXTRACTION_META: [ParamMeta; 5] = [
  ParamMeta::intensity("threshold", 180.0, (0.0, 255.0, 5.0), "Foreground intensity cutoff (inclusive)"),
  ParamMeta::pixels("min_width", 5.0, (0.0, 50.0, 1.0), "Shapes must be wider than this"),
  ParamMeta::pixels("max_width", 30.0, (1.0, 200.0, 5.0), "Shapes must be narrower than this"),
  ParamMeta::pixels("min_height", 20.0, (0.0, 200.0, 5.0), "Shapes must be taller than this"),
  ParamMeta::pixels("max_height", 200.0, (1.0, 2000.0, 10.0), "Shapes must be shorter than this"),
];

impl Parameterized for ExtractionParams {
  fn param_meta() -> &'static [ParamMeta] {
    &EXTRACTION_META
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    check_known(params, Self::param_meta())?;
    let d = Self::default();
    let built = Self {
      threshold: params.get("threshold").map(|v| *v as u8).unwrap_or(d.threshold),
      min_width: get_pixels(params, "min_width", d.min_width),
      max_width: get_pixels(params, "max_width", d.max_width),
      min_height: get_pixels(params, "min_height", d.min_height),
      max_height: get_pixels(params, "max_height", d.max_height),
    };
    built.validate()?;
    Ok(built)
  }

  fn section() -> &'static str {
    "extraction"
  }
}

// ============================================================
// INDICATOR PARAMETERS
// ============================================================

/// Window lengths and classification levels for the indicator battery
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
  pub sma_fast: Period,
  pub sma_slow: Period,
  pub ema: Period,
  pub rsi: Period,
  pub rsi_overbought: f64,
  pub rsi_oversold: f64,
  pub macd_fast: Period,
  pub macd_slow: Period,
  pub macd_signal: Period,
  pub bollinger: Period,
  /// Band width in standard deviations
  pub bollinger_dev: f64,
  pub ichimoku_conversion: Period,
  /// Also the forward displacement of the cloud
  pub ichimoku_base: Period,
  pub ichimoku_span_b: Period,
}

impl Default for IndicatorParams {
  fn default() -> Self {
    Self {
      sma_fast: Period::new_const(9),
      sma_slow: Period::new_const(20),
      ema: Period::new_const(20),
      rsi: Period::new_const(14),
      rsi_overbought: 70.0,
      rsi_oversold: 30.0,
      macd_fast: Period::new_const(12),
      macd_slow: Period::new_const(26),
      macd_signal: Period::new_const(9),
      bollinger: Period::new_const(20),
      bollinger_dev: 2.0,
      ichimoku_conversion: Period::new_const(9),
      ichimoku_base: Period::new_const(26),
      ichimoku_span_b: Period::new_const(52),
    }
  }
}

impl IndicatorParams {
  /// Shortest series the battery accepts: the cloud is read
  /// `ichimoku_base` bars before the last one.
  #[inline]
  pub fn required_bars(&self) -> usize {
    self.ichimoku_base.get()
  }

  pub fn validate(&self) -> Result<()> {
    if self.macd_fast >= self.macd_slow {
      return Err(AnalysisError::InvalidConfig(format!(
        "macd_fast ({}) must be below macd_slow ({})",
        self.macd_fast.get(),
        self.macd_slow.get()
      )));
    }
    for (field, value) in [("rsi_overbought", self.rsi_overbought), ("rsi_oversold", self.rsi_oversold)] {
      if !(0.0..=100.0).contains(&value) {
        return Err(AnalysisError::OutOfRange { field, value, min: 0.0, max: 100.0 });
      }
    }
    if self.rsi_oversold >= self.rsi_overbought {
      return Err(AnalysisError::InvalidConfig(format!(
        "rsi_oversold ({}) must be below rsi_overbought ({})",
        self.rsi_oversold, self.rsi_overbought
      )));
    }
    if !self.bollinger_dev.is_finite() || self.bollinger_dev <= 0.0 {
      return Err(AnalysisError::InvalidValue("bollinger_dev must be positive and finite"));
    }
    Ok(())
  }
}

static INDICATOR_META: [ParamMeta; 14] = [
  ParamMeta::period("sma_fast", 9.0, (2.0, 50.0, 1.0), "Fast simple moving average window"),
  ParamMeta::period("sma_slow", 20.0, (5.0, 200.0, 5.0), "Slow simple moving average window"),
  ParamMeta::period("ema", 20.0, (2.0, 200.0, 1.0), "Exponential moving average window"),
  ParamMeta::period("rsi", 14.0, (2.0, 50.0, 1.0), "RSI smoothing window"),
  ParamMeta::level("rsi_overbought", 70.0, (50.0, 100.0, 5.0), "RSI above this is overbought"),
  ParamMeta::level("rsi_oversold", 30.0, (0.0, 50.0, 5.0), "RSI below this is oversold"),
  ParamMeta::period("macd_fast", 12.0, (2.0, 50.0, 1.0), "MACD fast EMA window"),
  ParamMeta::period("macd_slow", 26.0, (5.0, 100.0, 1.0), "MACD slow EMA window"),
  ParamMeta::period("macd_signal", 9.0, (2.0, 50.0, 1.0), "MACD signal EMA window"),
  ParamMeta::period("bollinger", 20.0, (5.0, 100.0, 1.0), "Bollinger window"),
  ParamMeta::level("bollinger_dev", 2.0, (0.5, 4.0, 0.5), "Bollinger band width in standard deviations"),
  ParamMeta::period("ichimoku_conversion", 9.0, (2.0, 50.0, 1.0), "Ichimoku conversion line window"),
  ParamMeta::period("ichimoku_base", 26.0, (5.0, 100.0, 1.0), "Ichimoku base line window and cloud displacement"),
  ParamMeta::period("ichimoku_span_b", 52.0, (10.0, 200.0, 1.0), "Ichimoku leading span B window"),
];

impl Parameterized for IndicatorParams {
  fn param_meta() -> &'static [ParamMeta] {
    &INDICATOR_META
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    check_known(params, Self::param_meta())?;
    let d = Self::default();
    let built = Self {
      sma_fast: get_period(params, "sma_fast", d.sma_fast.get())?,
      sma_slow: get_period(params, "sma_slow", d.sma_slow.get())?,
      ema: get_period(params, "ema", d.ema.get())?,
      rsi: get_period(params, "rsi", d.rsi.get())?,
      rsi_overbought: get_level(params, "rsi_overbought", d.rsi_overbought),
      rsi_oversold: get_level(params, "rsi_oversold", d.rsi_oversold),
      macd_fast: get_period(params, "macd_fast", d.macd_fast.get())?,
      macd_slow: get_period(params, "macd_slow", d.macd_slow.get())?,
      macd_signal: get_period(params, "macd_signal", d.macd_signal.get())?,
      bollinger: get_period(params, "bollinger", d.bollinger.get())?,
      bollinger_dev: get_level(params, "bollinger_dev", d.bollinger_dev),
      ichimoku_conversion: get_period(params, "ichimoku_conversion", d.ichimoku_conversion.get())?,
      ichimoku_base: get_period(params, "ichimoku_base", d.ichimoku_base.get())?,
      ichimoku_span_b: get_period(params, "ichimoku_span_b", d.ichimoku_span_b.get())?,
    };
    built.validate()?;
    Ok(built)
  }

  fn section() -> &'static str {
    "indicators"
  }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_meta_pixels() {
    let meta = ParamMeta::pixels("test_px", 30.0, (10.0, 50.0, 5.0), "Test pixel parameter");

    assert_eq!(meta.name, "test_px");
    assert_eq!(meta.param_type, ParamType::Pixels);
    assert_eq!(meta.default, 30.0);
  }

  #[test]
  fn test_param_meta_period() {
    let meta = ParamMeta::period("test_period", 14.0, (10.0, 20.0, 2.0), "Test period parameter");

    assert_eq!(meta.name, "test_period");
    assert_eq!(meta.param_type, ParamType::Period);
    assert_eq!(meta.default, 14.0);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::level("test", 2.0, (1.5, 2.5, 0.5), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 3);
    assert!((grid[0] - 1.5).abs() < f64::EPSILON);
    assert!((grid[1] - 2.0).abs() < f64::EPSILON);
    assert!((grid[2] - 2.5).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validate_level() {
    let meta = ParamMeta::level("test", 70.0, (50.0, 100.0, 5.0), "Test");

    assert!(meta.validate(72.5).is_ok());
    assert!(meta.validate(50.0).is_ok());
    assert!(meta.validate(100.0).is_ok());
    assert!(meta.validate(49.0).is_err());
    assert!(meta.validate(f64::NAN).is_err());
  }

  #[test]
  fn test_validate_integer_types() {
    let meta = ParamMeta::period("test", 14.0, (10.0, 20.0, 2.0), "Test");

    assert!(meta.validate(14.0).is_ok());
    assert!(meta.validate(14.5).is_err());
    assert!(meta.validate(8.0).is_err());
    assert!(meta.validate(22.0).is_err());
  }

  #[test]
  fn test_defaults_match_meta() {
    let d = ExtractionParams::default();
    let meta = ExtractionParams::param_meta();
    assert_eq!(meta[0].default, f64::from(d.threshold));
    assert_eq!(meta[4].default, f64::from(d.max_height));

    let d = IndicatorParams::default();
    for m in IndicatorParams::param_meta() {
      assert!(m.validate(m.default).is_ok(), "{} default out of its own range", m.name);
    }
    assert_eq!(d.required_bars(), 26);
  }

  #[test]
  fn test_extraction_with_params() {
    let mut params = HashMap::new();
    params.insert("max_width", 60.0);
    params.insert("threshold", 120.0);

    let built = ExtractionParams::with_params(&params).unwrap();
    assert_eq!(built.max_width, 60);
    assert_eq!(built.threshold, 120);
    assert_eq!(built.min_width, 5);
  }

  #[test]
  fn test_with_params_rejects_unknown_key() {
    let mut params = HashMap::new();
    params.insert("volume_period", 20.0);
    assert!(matches!(
      IndicatorParams::with_params(&params),
      Err(AnalysisError::InvalidConfig(_))
    ));
  }

  #[test]
  fn test_indicator_validation() {
    let mut p = IndicatorParams::default();
    p.macd_fast = Period::new_const(30);
    assert!(p.validate().is_err());

    let mut p = IndicatorParams::default();
    p.rsi_oversold = 80.0;
    assert!(p.validate().is_err());

    let mut p = IndicatorParams::default();
    p.bollinger_dev = 0.0;
    assert!(p.validate().is_err());

    assert!(IndicatorParams::default().validate().is_ok());
  }

  #[test]
  fn test_extraction_deserialize_fills_defaults() {
    let p: ExtractionParams = serde_json::from_str(r#"{"max_height": 400}"#).unwrap();
    assert_eq!(p.max_height, 400);
    assert_eq!(p.min_height, 20);
  }

  #[test]
  fn test_get_helpers() {
    let mut params = HashMap::new();
    params.insert("key1", 20.0);

    assert_eq!(get_period(&params, "key1", 14).unwrap().get(), 20);
    assert_eq!(get_period(&params, "key2", 14).unwrap().get(), 14);
    assert_eq!(get_pixels(&params, "key1", 5), 20);
    assert_eq!(get_level(&params, "missing", 2.0), 2.0);
  }
}

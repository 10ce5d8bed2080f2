//! Technical indicator battery
//!
//! Seven independent indicators read an immutable bar slice and each returns
//! its own [`Verdict`]. Nothing is shared between them, so the engine
//! evaluates them in parallel.
//!
//! # Indicators
//!
//! - **Trend**: moving averages (SMA fast/slow + EMA), MACD, Ichimoku cloud
//! - **Momentum**: RSI
//! - **Volatility**: Bollinger bands
//! - **Levels**: Fibonacci retracement (informational), volume advisory

pub mod helpers;

pub mod levels;
pub mod momentum;
pub mod trend;
pub mod volatility;

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::params::IndicatorParams;
use crate::{AnalysisError, OHLCExt, Result, Signal, OHLC};

// ============================================================
// VERDICT TYPES
// ============================================================

/// The seven indicators, in report order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    MovingAverages,
    Rsi,
    Macd,
    Bollinger,
    Ichimoku,
    Fibonacci,
    Volume,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 7] = [
        IndicatorKind::MovingAverages,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
        IndicatorKind::Ichimoku,
        IndicatorKind::Fibonacci,
        IndicatorKind::Volume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorKind::MovingAverages => "moving_averages",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Ichimoku => "ichimoku",
            IndicatorKind::Fibonacci => "fibonacci",
            IndicatorKind::Volume => "volume",
        }
    }

    /// Report heading
    pub fn title(self) -> &'static str {
        match self {
            IndicatorKind::MovingAverages => "Médias Móveis (SMA/EMA)",
            IndicatorKind::Rsi => "Índice de Força Relativa (RSI)",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Bollinger => "Bandas de Bollinger",
            IndicatorKind::Ichimoku => "Nuvem de Ichimoku",
            IndicatorKind::Fibonacci => "Níveis de Fibonacci",
            IndicatorKind::Volume => "Volume e OBV",
        }
    }

    /// Whether the verdict counts towards the decision score
    #[inline]
    pub fn is_scored(self) -> bool {
        !matches!(self, IndicatorKind::Fibonacci | IndicatorKind::Volume)
    }
}

/// Fibonacci level: `price = min_low + ratio * (max_high - min_low)`
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Numbers behind a verdict
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reading {
    MovingAverages {
        sma_fast: f64,
        sma_slow: f64,
        ema: f64,
        close: f64,
    },
    Rsi {
        value: f64,
    },
    Macd {
        macd: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        middle: f64,
        upper: f64,
        lower: f64,
        close: f64,
    },
    Ichimoku {
        span_a: f64,
        span_b: f64,
        close: f64,
    },
    Fibonacci {
        levels: Vec<FibLevel>,
    },
    /// Not enough bars for the window, or no data at all (volume)
    Unavailable,
}

/// Classification of one indicator with its readings and report text
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Verdict {
    pub kind: IndicatorKind,
    pub signal: Signal,
    pub reading: Reading,
    /// Human-readable line for the report; scoring never looks at it
    pub detail: String,
}

impl Verdict {
    pub fn new(kind: IndicatorKind, signal: Signal, reading: Reading, detail: impl Into<String>) -> Self {
        Self {
            kind,
            signal,
            reading,
            detail: detail.into(),
        }
    }

    /// Neutral placeholder when the series is shorter than the window
    pub fn insufficient(kind: IndicatorKind) -> Self {
        Self::new(
            kind,
            Signal::Neutral,
            Reading::Unavailable,
            format!("{}: dados insuficientes.", kind.title()),
        )
    }
}

/// Verdict set of one run, keyed and ordered by indicator
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Verdicts(BTreeMap<IndicatorKind, Verdict>);

impl Verdicts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, verdict: Verdict) {
        self.0.insert(verdict.kind, verdict);
    }

    #[inline]
    pub fn get(&self, kind: IndicatorKind) -> Option<&Verdict> {
        self.0.get(&kind)
    }

    /// Signal of `kind`; a missing verdict reads as neutral
    #[inline]
    pub fn signal(&self, kind: IndicatorKind) -> Signal {
        self.get(kind).map(|v| v.signal).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Verdict> {
        self.0.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Verdict> for Verdicts {
    fn from_iter<I: IntoIterator<Item = Verdict>>(iter: I) -> Self {
        let mut verdicts = Verdicts::new();
        for v in iter {
            verdicts.insert(v);
        }
        verdicts
    }
}

// ============================================================
// ENGINE
// ============================================================

/// Computes the full verdict set over a bar series
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Shortest series [`compute`](Self::compute) accepts
    #[inline]
    pub fn required_bars(&self) -> usize {
        self.params.required_bars()
    }

    /// All seven verdicts.
    ///
    /// Fails on an empty or non-finite series (`IndicatorComputation`) and on
    /// a series shorter than [`required_bars`](Self::required_bars)
    /// (`InsufficientData`). Otherwise every indicator resolves to a verdict.
    pub fn compute<T: OHLC + Sync>(&self, bars: &[T]) -> Result<Verdicts> {
        self.validate_series(bars)?;

        Ok(IndicatorKind::ALL[..]
            .par_iter()
            .map(|&kind| self.compute_one(kind, bars))
            .collect::<Vec<_>>()
            .into_iter()
            .collect())
    }

    /// One indicator, no validation
    pub fn compute_one<T: OHLC>(&self, kind: IndicatorKind, bars: &[T]) -> Verdict {
        let p = &self.params;
        match kind {
            IndicatorKind::MovingAverages => trend::moving_averages(bars, p),
            IndicatorKind::Rsi => momentum::rsi(bars, p),
            IndicatorKind::Macd => trend::macd(bars, p),
            IndicatorKind::Bollinger => volatility::bollinger(bars, p),
            IndicatorKind::Ichimoku => trend::ichimoku(bars, p),
            IndicatorKind::Fibonacci => levels::fibonacci(bars),
            IndicatorKind::Volume => levels::volume(),
        }
    }

    fn validate_series<T: OHLC>(&self, bars: &[T]) -> Result<()> {
        if bars.is_empty() {
            return Err(AnalysisError::IndicatorComputation(
                "empty series".to_string(),
            ));
        }
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                AnalysisError::IndicatorComputation(reason) => {
                    AnalysisError::IndicatorComputation(format!("bar {}: {}", i, reason))
                }
                other => other,
            })?;
        }

        let need = self.required_bars();
        if bars.len() < need {
            return Err(AnalysisError::InsufficientData {
                need,
                got: bars.len(),
            });
        }
        Ok(())
    }
}

// ============================================================
// TESTS
// ============================================================

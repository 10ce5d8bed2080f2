//! Volatility indicators: Bollinger bands

use super::helpers::{closes, exceeds, trailing_mean, trailing_std};
use super::{IndicatorKind, Reading, Verdict};
use crate::params::IndicatorParams;
use crate::{Signal, OHLC};

/// Close against `mean +/- dev * std` of the trailing window (population std).
/// Above the upper band is bearish, below the lower band bullish.
pub fn bollinger<T: OHLC>(bars: &[T], params: &IndicatorParams) -> Verdict {
  let kind = IndicatorKind::Bollinger;
  let closes = closes(bars);
  let period = params.bollinger.get();

  let (Some(middle), Some(std), Some(&close)) = (
    trailing_mean(&closes, period),
    trailing_std(&closes, period),
    closes.last(),
  ) else {
    return Verdict::insufficient(kind);
  };
  let upper = middle + params.bollinger_dev * std;
  let lower = middle - params.bollinger_dev * std;

  let (signal, label) = if exceeds(close, upper, close) {
    (Signal::Bearish, "Acima da banda superior (possível reversão de baixa)")
  } else if exceeds(lower, close, close) {
    (Signal::Bullish, "Abaixo da banda inferior (possível reversão de alta)")
  } else {
    (Signal::Neutral, "Dentro das bandas")
  };

  Verdict::new(
    kind,
    signal,
    Reading::Bollinger { middle, upper, lower, close },
    format!("Bandas de Bollinger: {label}."),
  )
}

//! Momentum indicators: RSI

use super::helpers::closes;
use super::{IndicatorKind, Reading, Verdict};
use crate::params::IndicatorParams;
use crate::{Signal, OHLC};

/// Neutral midpoint; also the value when the series never moved
pub const RSI_NEUTRAL: f64 = 50.0;

/// Wilder RSI over `closes`.
///
/// Gains and losses are smoothed with `alpha = 1 / period`, seeded at zero for
/// the first bar. A series with losses but no gains reads 0, gains but no
/// losses reads 100, and no movement at all reads 50.
pub fn rsi_value(closes: &[f64], period: usize) -> f64 {
  let alpha = 1.0 / period.max(1) as f64;
  let (mut gain, mut loss) = (0.0_f64, 0.0_f64);

  for w in closes.windows(2) {
    let change = w[1] - w[0];
    gain = (1.0 - alpha) * gain + alpha * change.max(0.0);
    loss = (1.0 - alpha) * loss + alpha * (-change).max(0.0);
  }

  match (gain > 0.0, loss > 0.0) {
    (false, false) => RSI_NEUTRAL,
    (true, false) => 100.0,
    _ => 100.0 - 100.0 / (1.0 + gain / loss),
  }
}

/// Above the overbought level is bearish (reversal risk), below the oversold
/// level is bullish.
pub fn rsi<T: OHLC>(bars: &[T], params: &IndicatorParams) -> Verdict {
  let period = params.rsi.get();
  let value = rsi_value(&closes(bars), period);

  let (signal, label) = if value > params.rsi_overbought {
    (Signal::Bearish, "Sobrecomprado")
  } else if value < params.rsi_oversold {
    (Signal::Bullish, "Sobrevendido")
  } else {
    (Signal::Neutral, "Neutro")
  };

  Verdict::new(
    IndicatorKind::Rsi,
    signal,
    Reading::Rsi { value },
    format!("RSI({period}): {value:.1} ({label})."),
  )
}

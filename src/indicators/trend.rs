//! Trend indicators: moving averages, MACD, Ichimoku cloud

use super::helpers::{closes, ema, exceeds, midpoint, trailing_mean};
use super::{IndicatorKind, Reading, Verdict};
use crate::params::IndicatorParams;
use crate::{Signal, OHLC};

// ============================================================
// MOVING AVERAGES
// ============================================================

/// Bullish when the fast SMA is above the slow SMA and the close is above the
/// EMA; bearish when both relations are reversed; neutral otherwise.
pub fn moving_averages<T: OHLC>(bars: &[T], params: &IndicatorParams) -> Verdict {
  let kind = IndicatorKind::MovingAverages;
  let closes = closes(bars);
  let (fast_p, slow_p, ema_p) = (params.sma_fast.get(), params.sma_slow.get(), params.ema.get());

  let (Some(fast), Some(slow), Some(&close)) = (
    trailing_mean(&closes, fast_p),
    trailing_mean(&closes, slow_p),
    closes.last(),
  ) else {
    return Verdict::insufficient(kind);
  };
  if closes.len() < ema_p {
    return Verdict::insufficient(kind);
  }
  let Some(&ema) = ema(&closes, ema_p).last() else {
    return Verdict::insufficient(kind);
  };

  let (signal, label) = if exceeds(fast, slow, close) && exceeds(close, ema, close) {
    (
      Signal::Bullish,
      format!("Alta (MM{fast_p} > MM{slow_p}, Preço > EMA{ema_p})"),
    )
  } else if exceeds(slow, fast, close) && exceeds(ema, close, close) {
    (
      Signal::Bearish,
      format!("Baixa (MM{fast_p} < MM{slow_p}, Preço < EMA{ema_p})"),
    )
  } else {
    (Signal::Neutral, "Neutro".to_string())
  };

  Verdict::new(
    kind,
    signal,
    Reading::MovingAverages { sma_fast: fast, sma_slow: slow, ema, close },
    format!("Tendência por Médias Móveis: {label}."),
  )
}

// ============================================================
// MACD
// ============================================================

/// MACD line (fast EMA - slow EMA) against its signal EMA. Equal lines are
/// neutral.
pub fn macd<T: OHLC>(bars: &[T], params: &IndicatorParams) -> Verdict {
  let kind = IndicatorKind::Macd;
  let closes = closes(bars);

  let fast = ema(&closes, params.macd_fast.get());
  let slow = ema(&closes, params.macd_slow.get());
  let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
  let signal_line = ema(&line, params.macd_signal.get());

  let (Some(&m), Some(&s), Some(&close)) = (line.last(), signal_line.last(), closes.last()) else {
    return Verdict::insufficient(kind);
  };

  let (signal, label) = if exceeds(m, s, close) {
    (Signal::Bullish, "Positivo/Cruzamento de Compra")
  } else if exceeds(s, m, close) {
    (Signal::Bearish, "Negativo/Cruzamento de Venda")
  } else {
    (Signal::Neutral, "Neutro")
  };

  Verdict::new(
    kind,
    signal,
    Reading::Macd { macd: m, signal: s, histogram: m - s },
    format!("MACD: {label}."),
  )
}

// ============================================================
// ICHIMOKU
// ============================================================

/// Close against the cloud drawn for the current bar.
///
/// The spans plotted under the last bar were computed `base` bars earlier, so
/// both are read at index `len - base`:
/// span A = (conversion midpoint + base midpoint) / 2, span B = span-B midpoint.
pub fn ichimoku<T: OHLC>(bars: &[T], params: &IndicatorParams) -> Verdict {
  let kind = IndicatorKind::Ichimoku;
  let displacement = params.ichimoku_base.get();
  let Some(at) = bars.len().checked_sub(displacement) else {
    return Verdict::insufficient(kind);
  };

  let (Some(conversion), Some(base), Some(span_b), Some(last)) = (
    midpoint(bars, at, params.ichimoku_conversion.get()),
    midpoint(bars, at, params.ichimoku_base.get()),
    midpoint(bars, at, params.ichimoku_span_b.get()),
    bars.last(),
  ) else {
    return Verdict::insufficient(kind);
  };
  let span_a = (conversion + base) / 2.0;
  let close = last.close();

  let (signal, label) = if exceeds(close, span_a, close) && exceeds(close, span_b, close) {
    (Signal::Bullish, "Acima da nuvem (tendência de alta)")
  } else if exceeds(span_a, close, close) && exceeds(span_b, close, close) {
    (Signal::Bearish, "Abaixo da nuvem (tendência de baixa)")
  } else {
    (Signal::Neutral, "Dentro da nuvem (indefinido)")
  };

  Verdict::new(
    kind,
    signal,
    Reading::Ichimoku { span_a, span_b, close },
    format!("Ichimoku Cloud: {label}."),
  )
}

// ============================================================
// TESTS
// ============================================================

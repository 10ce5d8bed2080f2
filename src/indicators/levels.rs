//! Informational levels: Fibonacci retracement and the volume advisory.
//! Neither contributes to the decision score.

use super::{FibLevel, IndicatorKind, Reading, Verdict};
use crate::{Ratio, Signal, OHLC};

/// Retracement ratios, low to high
pub const FIBONACCI_RATIOS: [Ratio; 6] = [
  Ratio::new_const(0.0),
  Ratio::new_const(0.236),
  Ratio::new_const(0.382),
  Ratio::new_const(0.5),
  Ratio::new_const(0.618),
  Ratio::new_const(1.0),
];

/// Shown in place of volume-based analysis; charts carry no volume
pub const VOLUME_ADVISORY: &str = "AVISO: Não foi possível calcular o Volume ou OBV (On Balance Volume), \
pois os dados de volume não são extraídos da imagem. A análise seria mais precisa com esses dados.";

/// Retracement levels over the whole visible range:
/// `min_low + ratio * (max_high - min_low)`. Always neutral.
pub fn fibonacci<T: OHLC>(bars: &[T]) -> Verdict {
  let kind = IndicatorKind::Fibonacci;
  if bars.is_empty() {
    return Verdict::insufficient(kind);
  }

  let max_high = bars.iter().map(|b| b.high()).fold(f64::NEG_INFINITY, f64::max);
  let min_low = bars.iter().map(|b| b.low()).fold(f64::INFINITY, f64::min);
  let diff = max_high - min_low;

  let levels: Vec<FibLevel> = FIBONACCI_RATIOS
    .iter()
    .map(|r| FibLevel { ratio: r.get(), price: min_low + r.get() * diff })
    .collect();
  let at = |i: usize| levels[i].price;

  let detail = format!(
    "Retrações de Fibonacci (baseado no range visual): Suportes em {:.2} e {:.2}. Resistências em {:.2}.",
    at(4),
    at(2),
    at(1),
  );

  Verdict::new(kind, Signal::Neutral, Reading::Fibonacci { levels }, detail)
}

/// Fixed advisory; no volume is ever available
pub fn volume() -> Verdict {
  Verdict::new(IndicatorKind::Volume, Signal::Neutral, Reading::Unavailable, VOLUME_ADVISORY)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Candle;

  fn bar(high: f64, low: f64) -> Candle {
    Candle { x: 0, open: high, high, low, close: low }
  }

  #[test]
  fn test_levels_span_visible_range() {
    let bars = [bar(100.0, 140.0), bar(60.0, 90.0), bar(80.0, 200.0)];
    let v = fibonacci(&bars);
    assert_eq!(v.signal, Signal::Neutral);

    // max high 100, min low 90
    match &v.reading {
      Reading::Fibonacci { levels } => {
        let prices: Vec<f64> = levels.iter().map(|l| l.price).collect();
        let expected = [90.0, 92.36, 93.82, 95.0, 96.18, 100.0];
        for (got, want) in prices.iter().zip(expected) {
          assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
      }
      other => panic!("unexpected reading: {other:?}"),
    }
    assert_eq!(
      v.detail,
      "Retrações de Fibonacci (baseado no range visual): Suportes em 96.18 e 93.82. Resistências em 92.36."
    );
  }

  #[test]
  fn test_levels_follow_inverted_range() {
    let bars = [bar(10.0, 50.0), bar(5.0, 70.0)];
    // max high 10, min low 50: negative range, levels descend
    if let Reading::Fibonacci { levels } = fibonacci(&bars).reading {
      assert!(levels.windows(2).all(|w| w[0].price >= w[1].price));
      assert_eq!(levels[0].price, 50.0);
    } else {
      panic!("expected fibonacci reading");
    }
  }

  #[test]
  fn test_empty_series() {
    assert_eq!(fibonacci::<Candle>(&[]).reading, Reading::Unavailable);
  }

  #[test]
  fn test_volume_advisory() {
    let v = volume();
    assert_eq!(v.kind, IndicatorKind::Volume);
    assert_eq!(v.signal, Signal::Neutral);
    assert!(v.detail.starts_with("AVISO"));
  }
}

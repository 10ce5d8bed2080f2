//! Score aggregation and the buy/sell/neutral decision

use tracing::trace;

use crate::indicators::{IndicatorKind, Verdicts};

/// Suggested trade direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Buy,
    Sell,
    Neutral,
}

impl Operation {
    /// Report label
    pub fn label(self) -> &'static str {
        match self {
            Operation::Buy => "COMPRA",
            Operation::Sell => "VENDA",
            Operation::Neutral => "NEUTRA",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Report label
    pub fn label(self) -> &'static str {
        match self {
            Confidence::Low => "baixa",
            Confidence::Medium => "média",
            Confidence::High => "alta",
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Decision {
    pub operation: Operation,
    pub confidence: Confidence,
    /// Sum of the scored signal weights, in `-5..=5`
    pub score: i32,
}

impl Decision {
    /// Total over all integers:
    ///
    /// | score     | operation | confidence |
    /// |-----------|-----------|------------|
    /// | `>= 3`    | Buy       | High       |
    /// | `1..=2`   | Buy       | Medium     |
    /// | `0`       | Neutral   | Low        |
    /// | `-2..=-1` | Sell      | Medium     |
    /// | `<= -3`   | Sell      | High       |
    pub fn from_score(score: i32) -> Self {
        let (operation, confidence) = match score {
            s if s >= 3 => (Operation::Buy, Confidence::High),
            1..=2 => (Operation::Buy, Confidence::Medium),
            s if s <= -3 => (Operation::Sell, Confidence::High),
            -2..=-1 => (Operation::Sell, Confidence::Medium),
            _ => (Operation::Neutral, Confidence::Low),
        };
        Self {
            operation,
            confidence,
            score,
        }
    }
}

/// Folds the scored verdicts into a [`Decision`]. Fibonacci and volume are
/// informational and never move the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine;

impl DecisionEngine {
    pub fn score(&self, verdicts: &Verdicts) -> i32 {
        IndicatorKind::ALL
            .iter()
            .filter(|kind| kind.is_scored())
            .map(|&kind| verdicts.signal(kind).weight())
            .sum()
    }

    pub fn decide(&self, verdicts: &Verdicts) -> Decision {
        let score = self.score(verdicts);
        let decision = Decision::from_score(score);
        trace!(score, operation = ?decision.operation, "decision");
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{Reading, Verdict};
    use crate::Signal;

    fn verdicts(signals: &[(IndicatorKind, Signal)]) -> Verdicts {
        signals
            .iter()
            .map(|&(kind, signal)| Verdict::new(kind, signal, Reading::Unavailable, ""))
            .collect()
    }

    #[test]
    fn test_score_table() {
        let table = [
            (-5, Operation::Sell, Confidence::High),
            (-4, Operation::Sell, Confidence::High),
            (-3, Operation::Sell, Confidence::High),
            (-2, Operation::Sell, Confidence::Medium),
            (-1, Operation::Sell, Confidence::Medium),
            (0, Operation::Neutral, Confidence::Low),
            (1, Operation::Buy, Confidence::Medium),
            (2, Operation::Buy, Confidence::Medium),
            (3, Operation::Buy, Confidence::High),
            (4, Operation::Buy, Confidence::High),
            (5, Operation::Buy, Confidence::High),
        ];
        for (score, op, conf) in table {
            let d = Decision::from_score(score);
            assert_eq!((d.operation, d.confidence, d.score), (op, conf, score), "score {score}");
        }
    }

    #[test]
    fn test_informational_verdicts_do_not_score() {
        let v = verdicts(&[
            (IndicatorKind::Fibonacci, Signal::Bullish),
            (IndicatorKind::Volume, Signal::Bearish),
        ]);
        assert_eq!(DecisionEngine.score(&v), 0);
    }

    #[test]
    fn test_mixed_verdicts() {
        let v = verdicts(&[
            (IndicatorKind::MovingAverages, Signal::Bullish),
            (IndicatorKind::Rsi, Signal::Bearish),
            (IndicatorKind::Macd, Signal::Bullish),
            (IndicatorKind::Bollinger, Signal::Neutral),
            (IndicatorKind::Ichimoku, Signal::Bullish),
        ]);
        let d = DecisionEngine.decide(&v);
        assert_eq!(d.score, 2);
        assert_eq!(d.operation, Operation::Buy);
        assert_eq!(d.confidence, Confidence::Medium);
    }

    #[test]
    fn test_all_bearish() {
        let v = verdicts(
            &IndicatorKind::ALL
                .iter()
                .map(|&k| (k, Signal::Bearish))
                .collect::<Vec<_>>(),
        );
        let d = DecisionEngine.decide(&v);
        assert_eq!(d.score, -5);
        assert_eq!(d.operation, Operation::Sell);
    }

    #[test]
    fn test_empty_is_neutral() {
        let d = DecisionEngine.decide(&Verdicts::new());
        assert_eq!(d.operation, Operation::Neutral);
        assert_eq!(d.confidence, Confidence::Low);
    }

    #[test]
    fn test_labels_and_serde() {
        assert_eq!(Operation::Buy.label(), "COMPRA");
        assert_eq!(Confidence::Medium.label(), "média");
        let json = serde_json::to_string(&Decision::from_score(-4)).unwrap();
        assert_eq!(json, r#"{"operation":"sell","confidence":"high","score":-4}"#);
    }
}

//! Property tests for the extraction and scoring invariants.

use candlescope::prelude::*;
use proptest::prelude::*;

fn shape() -> impl Strategy<Value = Shape> {
    (0u32..2000, 0u32..1000, 0u32..60, 0u32..300)
        .prop_map(|(x, y, w, h)| Shape::new(x, y, w, h))
}

fn signal() -> impl Strategy<Value = Signal> {
    prop_oneof![
        Just(Signal::Bullish),
        Just(Signal::Neutral),
        Just(Signal::Bearish),
    ]
}

fn flat(n: usize, price: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| Candle {
            x: i as u32,
            open: price,
            high: price,
            low: price,
            close: price,
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_only_plausible_shapes_survive(shapes in prop::collection::vec(shape(), 0..200)) {
        let orderer = CandleOrderer::default();
        let p = *orderer.params();
        let kept = orderer.select(shapes.clone());

        for s in &kept {
            prop_assert!(p.min_width < s.width && s.width < p.max_width);
            prop_assert!(p.min_height < s.height && s.height < p.max_height);
        }
        let expected = shapes.iter().filter(|s| orderer.accepts(s)).count();
        prop_assert_eq!(kept.len(), expected);
    }

    #[test]
    fn prop_bars_are_ordered_left_to_right(
        shapes in prop::collection::vec(shape(), 0..200),
        seed in any::<u64>(),
    ) {
        let candles = CandleOrderer::default().order(shapes, &mut RandomDirection::seeded(seed));
        prop_assert!(candles.windows(2).all(|w| w[0].x <= w[1].x));
    }

    #[test]
    fn prop_seeded_extraction_is_deterministic(
        shapes in prop::collection::vec(shape(), 0..200),
        seed in any::<u64>(),
    ) {
        let orderer = CandleOrderer::default();
        let a = orderer.order(shapes.clone(), &mut RandomDirection::seeded(seed));
        let b = orderer.order(shapes, &mut RandomDirection::seeded(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_decision_is_total(score in -5i32..=5) {
        let d = Decision::from_score(score);
        prop_assert_eq!(d.score, score);
        let expected = match score {
            3..=5 => (Operation::Buy, Confidence::High),
            1..=2 => (Operation::Buy, Confidence::Medium),
            0 => (Operation::Neutral, Confidence::Low),
            -2..=-1 => (Operation::Sell, Confidence::Medium),
            _ => (Operation::Sell, Confidence::High),
        };
        prop_assert_eq!((d.operation, d.confidence), expected);
    }

    #[test]
    fn prop_score_counts_scored_signals(signals in prop::collection::vec(signal(), 7)) {
        let verdicts: Verdicts = IndicatorKind::ALL
            .iter()
            .zip(&signals)
            .map(|(&kind, &signal)| Verdict::new(kind, signal, Reading::Unavailable, ""))
            .collect();

        let expected: i32 = signals[..5].iter().map(|s| s.weight()).sum();
        let decision = DecisionEngine.decide(&verdicts);
        prop_assert_eq!(decision.score, expected);
        prop_assert!((-5..=5).contains(&decision.score));
        prop_assert_eq!(decision, Decision::from_score(expected));
    }

    #[test]
    fn prop_constant_series_is_neutral(n in 26usize..120, price in 0.0f64..5000.0) {
        let analyzer = Analyzer::builder().build().unwrap();
        let analysis = analyzer.analyze_candles(flat(n, price), "X", "1h").unwrap();

        for v in analysis.verdicts.iter() {
            prop_assert_eq!(v.signal, Signal::Neutral, "{:?}", v.kind);
        }
        prop_assert_eq!(analysis.decision.score, 0);
        prop_assert_eq!(analysis.decision.operation, Operation::Neutral);
    }

    #[test]
    fn prop_minimum_length_gate(n in 0usize..60) {
        let analyzer = Analyzer::builder().build().unwrap();
        let result = analyzer.analyze_candles(flat(n, 100.0), "X", "1h");
        if n < 26 {
            let insufficient = matches!(result, Err(AnalysisError::InsufficientData { need: 26, got }) if got == n);
            prop_assert!(insufficient);
        } else {
            prop_assert!(result.is_ok());
        }
    }
}

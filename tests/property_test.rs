//! Properties of the compiler that hold for arbitrary inputs.

mod common;

use common::*;
use klineplot::domain::assemble::compile_with_diagnostics;
use klineplot::domain::diagnostic::{Diagnostic, EventKind};
use klineplot::domain::equity::{align, EquitySample};
use klineplot::domain::indicator::simple_moving_average;
use klineplot::domain::marker::{Marker, Orientation};
use klineplot::domain::options::DisplayOptions;
use klineplot::domain::plot::ChartKind;
use klineplot::domain::timestamp::Timestamp;
use proptest::prelude::*;

fn axis(len: usize) -> Vec<String> {
    (0..len).map(|i| format!("2024-01-{:02}", i + 1)).collect()
}

proptest! {
    #[test]
    fn every_series_spans_the_bar_axis(
        closes in proptest::collection::vec(1.0f64..1000.0, 1..28),
        short in 1usize..10,
    ) {
        let dates = axis(closes.len());
        let date_refs: Vec<&str> = dates.iter().map(String::as_str).collect();
        let payload = PayloadBuilder::new()
            .closes(&date_refs, &closes)
            .volumes(&closes)
            .macd(serde_json::json!({}))
            .dkx(serde_json::json!({}))
            .equity(&[(date_refs[0], 1.0)])
            .build();
        let mut options = DisplayOptions::default();
        options.windows.ma_short = short;

        let spec = compile_with_diagnostics(&payload, ChartKind::Kline, &options).spec;
        prop_assert_eq!(spec.categories.len(), closes.len());
        for series in &spec.series {
            prop_assert_eq!(series.data.len(), closes.len(), "{}", series.name);
        }
    }

    #[test]
    fn sma_has_one_value_per_close(
        closes in proptest::collection::vec(proptest::option::of(-50.0f64..50.0), 0..40),
        window in 1usize..12,
    ) {
        let sma = simple_moving_average(&closes, window);
        prop_assert_eq!(sma.len(), closes.len());
        for (close, value) in closes.iter().zip(&sma) {
            prop_assert_eq!(close.is_none(), value.is_none());
        }
    }

    #[test]
    fn equity_changes_only_at_sample_keys(
        values in proptest::collection::vec(0.0f64..1e6, 1..20),
        picks in proptest::collection::vec(any::<bool>(), 20),
    ) {
        let bars: Vec<Timestamp> = axis(values.len()).into_iter().map(Timestamp::text).collect();
        let samples: Vec<EquitySample> = bars
            .iter()
            .zip(&values)
            .zip(&picks)
            .filter(|(_, pick)| **pick)
            .map(|((ts, v), _)| EquitySample { timestamp: ts.clone(), value: *v })
            .collect();

        let aligned = align(&samples, &bars);
        prop_assert_eq!(aligned.len(), bars.len());
        for i in 1..aligned.len() {
            if aligned[i] != aligned[i - 1] {
                prop_assert!(samples.iter().any(|s| s.timestamp == bars[i]));
            }
        }
    }

    #[test]
    fn reversal_quantity_is_net_position(
        size in 1u32..500,
        position in -500i32..500,
        bare in proptest::sample::select(vec!["反手", "反手开仓", "reverse", "Reversal", "flip"]),
        directed in any::<bool>(),
    ) {
        prop_assume!(position != 0);
        let action = match (directed, position > 0) {
            (true, true) => "反手做多",
            (true, false) => "反手做空",
            (false, _) => bare,
        };
        let payload = PayloadBuilder::new()
            .closes(&four_days(), &[1.0, 2.0, 3.0, 4.0])
            .trade(trade("d2", 2.0, action, size as f64, position as f64))
            .build();

        let spec = compile_with_diagnostics(&payload, ChartKind::Kline, &DisplayOptions::default()).spec;
        let Some(Marker::Trade(m)) = spec.markers.first() else {
            return Err(TestCaseError::fail("no trade marker"));
        };
        prop_assert_eq!(m.quantity, position.unsigned_abs() as f64);
        let expected = if position > 0 { Orientation::Up } else { Orientation::Down };
        prop_assert_eq!(m.orientation, expected);
    }

    #[test]
    fn off_axis_trades_are_reported_by_id(offsets in proptest::collection::vec(0usize..8, 1..10)) {
        // offsets 0..4 land on d1..d4, the rest fall off the axis
        let mut builder = PayloadBuilder::new().closes(&four_days(), &[1.0, 2.0, 3.0, 4.0]);
        for offset in &offsets {
            builder = builder.trade(trade(&format!("d{}", offset + 1), 1.0, "买多", 1.0, 1.0));
        }
        let compiled = compile_with_diagnostics(&builder.build(), ChartKind::Kline, &DisplayOptions::default());

        let orphan_ids: Vec<usize> = compiled
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::OrphanEvent { kind: EventKind::Trade, index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        let expected: Vec<usize> = offsets
            .iter()
            .enumerate()
            .filter(|(_, o)| **o >= 4)
            .map(|(id, _)| id)
            .collect();
        prop_assert_eq!(&orphan_ids, &expected);

        let placed = compiled
            .spec
            .markers
            .iter()
            .filter(|m| matches!(m, Marker::Trade(_)))
            .count();
        prop_assert_eq!(placed, offsets.len() - expected.len());
    }
}

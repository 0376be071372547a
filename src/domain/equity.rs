//! Equity curve alignment onto the bar axis.
//!
//! Samples come from the backtest service on their own schedule (often one
//! per day under an intraday bar axis). Alignment forward-fills so the equity
//! pane has exactly one value per bar.

use crate::domain::timestamp::Timestamp;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct EquitySample {
    pub timestamp: Timestamp,
    pub value: f64,
}

/// One equity value per bar timestamp.
///
/// A bar takes the sample with the same timestamp, else the sample whose
/// day-level key matches, else the previous bar's value. Before any match the
/// first sample's value is used (0 when there are no samples). When several
/// samples share a key the later one wins.
pub fn align(samples: &[EquitySample], bar_timestamps: &[Timestamp]) -> Vec<f64> {
    let mut exact: HashMap<&Timestamp, f64> = HashMap::with_capacity(samples.len());
    let mut by_day: HashMap<String, f64> = HashMap::with_capacity(samples.len());
    for sample in samples {
        exact.insert(&sample.timestamp, sample.value);
        if let Some(day) = sample.timestamp.date_key() {
            by_day.insert(day, sample.value);
        }
    }

    let mut last_value = samples.first().map(|s| s.value).unwrap_or(0.0);
    let mut aligned = Vec::with_capacity(bar_timestamps.len());

    for ts in bar_timestamps {
        if let Some(v) = exact.get(ts) {
            last_value = *v;
        } else if let Some(v) = ts.date_key().and_then(|day| by_day.get(&day)) {
            last_value = *v;
        }
        aligned.push(last_value);
    }

    aligned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::text(s)
    }

    fn sample(s: &str, value: f64) -> EquitySample {
        EquitySample {
            timestamp: ts(s),
            value,
        }
    }

    #[test]
    fn forward_fills_between_samples() {
        let samples = vec![sample("d1", 100.0), sample("d3", 120.0)];
        let axis = vec![ts("d1"), ts("d2"), ts("d3"), ts("d4")];
        assert_eq!(align(&samples, &axis), vec![100.0, 100.0, 120.0, 120.0]);
    }

    #[test]
    fn empty_samples_yield_zeros() {
        let axis = vec![ts("d1"), ts("d2")];
        assert_eq!(align(&[], &axis), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_axis_yields_empty() {
        let samples = vec![sample("d1", 100.0)];
        assert!(align(&samples, &[]).is_empty());
    }

    #[test]
    fn leading_bars_take_first_sample_value() {
        let samples = vec![sample("2024-01-03", 105.0), sample("2024-01-04", 110.0)];
        let axis = vec![ts("2024-01-01"), ts("2024-01-02"), ts("2024-01-03")];
        assert_eq!(align(&samples, &axis), vec![105.0, 105.0, 105.0]);
    }

    #[test]
    fn daily_samples_match_intraday_bars_by_date() {
        let samples = vec![sample("2024-01-02", 100.0), sample("2024-01-03", 90.0)];
        let axis = vec![
            ts("2024-01-02 09:00:00"),
            ts("2024-01-02 10:00:00"),
            ts("2024-01-03 09:00:00"),
            ts("2024-01-03 10:00:00"),
            ts("2024-01-04 09:00:00"),
        ];
        assert_eq!(
            align(&samples, &axis),
            vec![100.0, 100.0, 90.0, 90.0, 90.0]
        );
    }

    #[test]
    fn exact_match_beats_date_match() {
        let samples = vec![
            sample("2024-01-02", 100.0),
            sample("2024-01-02 10:00:00", 101.0),
        ];
        let axis = vec![ts("2024-01-02 09:00:00"), ts("2024-01-02 10:00:00")];
        // Both samples share the day key; the later one owns it.
        assert_eq!(align(&samples, &axis), vec![101.0, 101.0]);
    }

    #[test]
    fn non_iso_text_only_matches_exactly() {
        let samples = vec![sample("02/01/2024", 100.0), sample("03/01/2024", 80.0)];
        let axis = vec![ts("02/01/2024 09:00"), ts("03/01/2024")];
        assert_eq!(align(&samples, &axis), vec![100.0, 80.0]);
    }
}

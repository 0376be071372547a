//! OHLCV bars and the canonical time axis.
//!
//! The normalizer turns the payload's parallel `dates`/`values`/`volumes`
//! arrays into a [`BarAxis`] of equal-length timestamps and slots. Rows that
//! cannot be read become [`BarSlot::Gap`] so every later stage can rely on one
//! slot per timestamp.

use crate::domain::diagnostic::Diagnostic;
use crate::domain::payload::{number_of, KlineData};
use crate::domain::timestamp::Timestamp;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    /// close >= open
    pub fn is_rising(&self) -> bool {
        self.close >= self.open
    }

    /// (3 * close + low + open + high) / 6
    pub fn weighted_mid(&self) -> f64 {
        (3.0 * self.close + self.low + self.open + self.high) / 6.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BarSlot {
    Bar(Bar),
    Gap,
}

impl BarSlot {
    pub fn bar(&self) -> Option<&Bar> {
        match self {
            BarSlot::Bar(bar) => Some(bar),
            BarSlot::Gap => None,
        }
    }

    pub fn close(&self) -> Option<f64> {
        self.bar().map(|b| b.close)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarAxis {
    pub timestamps: Vec<Timestamp>,
    pub slots: Vec<BarSlot>,
}

impl BarAxis {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn closes(&self) -> Vec<Option<f64>> {
        self.slots.iter().map(BarSlot::close).collect()
    }

    pub fn timestamp_set(&self) -> HashSet<&Timestamp> {
        self.timestamps.iter().collect()
    }

    /// Last non-gap bar with its timestamp.
    pub fn last_bar(&self) -> Option<(&Timestamp, &Bar)> {
        self.timestamps
            .iter()
            .zip(&self.slots)
            .rev()
            .find_map(|(ts, slot)| slot.bar().map(|bar| (ts, bar)))
    }

    pub fn has_volume(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.bar().is_some_and(|b| b.volume.is_some()))
    }
}

/// Build the bar axis from the payload's kline block.
///
/// The axis is as long as `dates`. Rows past the end of `dates` have no
/// category and are ignored; dates without a row become gaps. Volumes are
/// attached only when their length matches the axis.
pub fn normalize(kline: &KlineData) -> (BarAxis, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let len = kline.dates.len();

    if kline.values.len() != len {
        diagnostics.push(Diagnostic::AxisMismatch {
            series: "values".to_string(),
            expected: len,
            actual: kline.values.len(),
        });
    }

    let volumes = match &kline.volumes {
        Some(v) if v.len() == len => Some(v.as_slice()),
        Some(v) if !v.is_empty() => {
            diagnostics.push(Diagnostic::AxisMismatch {
                series: "volumes".to_string(),
                expected: len,
                actual: v.len(),
            });
            None
        }
        _ => None,
    };

    let mut slots = Vec::with_capacity(len);
    for index in 0..len {
        let slot = match kline.values.get(index) {
            Some(row) => match parse_row(row) {
                Ok(mut bar) => {
                    bar.volume = volumes.and_then(|v| v[index]);
                    BarSlot::Bar(bar)
                }
                Err(reason) => {
                    diagnostics.push(Diagnostic::MalformedBar { index, reason });
                    BarSlot::Gap
                }
            },
            None => {
                diagnostics.push(Diagnostic::MalformedBar {
                    index,
                    reason: "no row for date",
                });
                BarSlot::Gap
            }
        };
        slots.push(slot);
    }

    let axis = BarAxis {
        timestamps: kline.dates.clone(),
        slots,
    };
    (axis, diagnostics)
}

/// Read one `values` row.
///
/// Layouts: `[open, close]`, `[open, close, low]`, `[open, close, low, high]`
/// and `[key, open, close, low, high, ...]`. Close is mandatory; a missing
/// open falls back to close and missing extremes to the body's range.
fn parse_row(row: &Value) -> Result<Bar, &'static str> {
    let fields = row.as_array().ok_or("row is not an array")?;
    if fields.len() < 2 {
        return Err("row has fewer than 2 fields");
    }

    let offset = if fields.len() >= 5 { 1 } else { 0 };
    let field = |i: usize| fields.get(offset + i).and_then(number_of);

    let close = field(1).ok_or("missing close")?;
    let open = field(0).unwrap_or(close);
    let low = field(2).unwrap_or(open.min(close));
    let high = field(3).unwrap_or(open.max(close));

    Ok(Bar {
        open,
        high,
        low,
        close,
        volume: None,
    })
}

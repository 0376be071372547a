//! Indicator overlays resolved against the bar axis.
//!
//! A supplied array is trusted only when it has exactly one value per bar;
//! anything else is replaced by a locally computed fallback so the result
//! always spans the full axis.

pub mod dkx;
pub mod ema;
pub mod macd;
pub mod sma;

pub use dkx::calculate_dkx;
pub use ema::exponential_moving_average;
pub use macd::calculate_macd;
pub use sma::simple_moving_average;

use crate::domain::diagnostic::Diagnostic;
use serde::Serialize;
use std::fmt;

/// How indicator values are written into the plot spec.
///
/// `Fixed2` renders two-decimal strings, matching the legacy dashboards.
/// `Raw` keeps full-precision numbers for consumers that compute further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    Fixed2,
    #[default]
    Raw,
}

impl std::str::FromStr for NumberFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed2" | "fixed" => Ok(NumberFormat::Fixed2),
            "raw" => Ok(NumberFormat::Raw),
            other => Err(format!("unknown number format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSource {
    Supplied,
    Computed,
}

impl fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesSource::Supplied => write!(f, "supplied"),
            SeriesSource::Computed => write!(f, "computed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub source: SeriesSource,
}

/// Moving average overlay: supplied array if it fits, else SMA of closes.
pub fn resolve(
    name: &str,
    supplied: Option<&[Option<f64>]>,
    closes: &[Option<f64>],
    window: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> IndicatorSeries {
    resolve_with(name, supplied, closes.len(), diagnostics, || {
        simple_moving_average(closes, window)
    })
}

/// General form of [`resolve`] with a caller-provided fallback.
///
/// An absent array falls back silently; a present one of the wrong length is
/// reported as [`Diagnostic::AxisMismatch`] before falling back.
pub fn resolve_with<F>(
    name: &str,
    supplied: Option<&[Option<f64>]>,
    axis_len: usize,
    diagnostics: &mut Vec<Diagnostic>,
    fallback: F,
) -> IndicatorSeries
where
    F: FnOnce() -> Vec<Option<f64>>,
{
    match supplied {
        Some(values) if values.len() == axis_len => IndicatorSeries {
            name: name.to_string(),
            values: values.to_vec(),
            source: SeriesSource::Supplied,
        },
        other => {
            if let Some(values) = other {
                diagnostics.push(Diagnostic::AxisMismatch {
                    series: name.to_string(),
                    expected: axis_len,
                    actual: values.len(),
                });
            }
            let mut values = fallback();
            values.resize(axis_len, None);
            IndicatorSeries {
                name: name.to_string(),
                values,
                source: SeriesSource::Computed,
            }
        }
    }
}

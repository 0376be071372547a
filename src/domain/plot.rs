//! Renderer-agnostic plot specification.
//!
//! Plain data: panes, series bound to panes by index, markers bound to the
//! price pane, and the shared category axis. Nothing here has behavior
//! beyond construction helpers and serialization.

use crate::domain::indicator::NumberFormat;
use crate::domain::layout::{PaneKind, PaneRegion};
use crate::domain::marker::Marker;
use crate::domain::metrics::MetricRow;
use crate::domain::timestamp::Timestamp;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Placeholder written for values that cannot be plotted.
pub const MISSING: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Kline,
    Equity,
    WinLoss,
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kline" | "candlestick" => Ok(ChartKind::Kline),
            "equity" => Ok(ChartKind::Equity),
            "pie" | "win_loss" | "winloss" => Ok(ChartKind::WinLoss),
            other => Err(format!("unknown chart kind '{}'", other)),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChartKind::Kline => "kline",
            ChartKind::Equity => "equity",
            ChartKind::WinLoss => "pie",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    pub title: String,
    pub kind: ChartKind,
    /// Set when there was nothing to plot; only `title` is meaningful then.
    pub placeholder: bool,
    /// Shared category axis for every pane.
    pub categories: Vec<Timestamp>,
    pub panes: Vec<Pane>,
    pub series: Vec<Series>,
    pub markers: Vec<Marker>,
    pub legend: Vec<String>,
    pub zoom: Option<ZoomWindow>,
    pub summary: Vec<MetricRow>,
}

impl PlotSpec {
    pub fn placeholder(kind: ChartKind, label: &str) -> Self {
        PlotSpec {
            title: label.to_string(),
            kind,
            placeholder: true,
            categories: Vec::new(),
            panes: Vec::new(),
            series: Vec::new(),
            markers: Vec::new(),
            legend: Vec::new(),
            zoom: None,
            summary: Vec::new(),
        }
    }

    pub fn pane_index(&self, kind: PaneKind) -> Option<usize> {
        self.panes.iter().position(|p| p.kind == kind)
    }

    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn series_in(&self, kind: PaneKind) -> impl Iterator<Item = &Series> {
        let pane = self.pane_index(kind);
        self.series
            .iter()
            .filter(move |s| pane.is_some() && s.pane == pane)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pane {
    pub kind: PaneKind,
    pub top: f64,
    pub height: f64,
    pub x_axis: XAxis,
    pub y_axis: YAxis,
}

impl Pane {
    pub fn from_region(region: &PaneRegion, is_bottom: bool) -> Self {
        Pane {
            kind: region.kind,
            top: region.top,
            height: region.height,
            x_axis: XAxis {
                show_labels: is_bottom,
                boundary_gap: true,
            },
            y_axis: YAxis {
                scale: true,
                split_number: if region.kind == PaneKind::Price { 5 } else { 2 },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    pub show_labels: bool,
    pub boundary_gap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    /// Fit the axis to the data instead of starting at zero.
    pub scale: bool,
    pub split_number: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Candlestick,
    Line,
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    /// Index into [`PlotSpec::panes`]; `None` for axis-less series (pie).
    pub pane: Option<usize>,
    pub data: SeriesData,
    pub style: SeriesStyle,
    pub tooltip: TooltipRule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Candles(Vec<Option<Candle>>),
    Values(Vec<DataPoint>),
    Slices(Vec<Slice>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Candles(c) => c.len(),
            SeriesData::Values(v) => v.len(),
            SeriesData::Slices(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `[open, close, low, high]`, the order candlestick renderers expect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
}

impl Serialize for Candle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.open, self.close, self.low, self.high].serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataPoint {
    Number(f64),
    /// Pre-formatted number (fixed-decimal display).
    Text(String),
    Missing,
}

impl DataPoint {
    pub fn from_value(value: Option<f64>, format: NumberFormat) -> Self {
        match (value, format) {
            (Some(v), _) if !v.is_finite() => DataPoint::Missing,
            (Some(v), NumberFormat::Raw) => DataPoint::Number(v),
            (Some(v), NumberFormat::Fixed2) => DataPoint::Text(format!("{:.2}", v)),
            (None, _) => DataPoint::Missing,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataPoint::Number(v) => Some(*v),
            DataPoint::Text(s) => s.parse().ok(),
            DataPoint::Missing => None,
        }
    }
}

impl Serialize for DataPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataPoint::Number(v) => serializer.serialize_f64(*v),
            DataPoint::Text(s) => serializer.serialize_str(s),
            DataPoint::Missing => serializer.serialize_str(MISSING),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub color: Option<&'static str>,
    pub line_width: Option<f64>,
    /// Fill the area under a line.
    pub area: bool,
    /// Per-point colors, e.g. volume bars following candle direction.
    pub item_colors: Option<Vec<&'static str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipRule {
    /// Open, close, low and high on separate lines.
    Ohlc,
    /// One value with two decimals, `-` when missing.
    Value,
    /// Slice value and its percentage of the whole.
    Share,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoomWindow {
    pub start: f64,
    pub end: f64,
    pub inside: bool,
    pub slider: bool,
    /// Panes whose x-axes move together.
    pub panes: Vec<usize>,
}

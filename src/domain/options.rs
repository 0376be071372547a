//! Display options for one compilation.
//!
//! One options struct replaces the per-screen chart builders: which optional
//! panes to show, how indicator numbers are written, which markers appear
//! and how the plot area is split.

use crate::domain::error::ChartError;
use crate::domain::indicator::{dkx, macd, NumberFormat};
use crate::domain::layout::{LayoutBudget, OPTIONAL_PANE_COUNT};
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub const DEFAULT_QUANTITY_UNIT: &str = "手";
pub const DEFAULT_NO_DATA_LABEL: &str = "暂无数据";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerMode {
    /// Every trade on the axis.
    #[default]
    All,
    /// Only the most recent opening or reversal trade.
    LatestEntry,
}

impl FromStr for MarkerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(MarkerMode::All),
            "latest_entry" | "latest-entry" | "latest" => Ok(MarkerMode::LatestEntry),
            other => Err(format!("unknown marker mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorWindows {
    pub ma_short: usize,
    pub ma_medium: usize,
    pub ma_long: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub dkx_period: usize,
    pub dkx_ma_period: usize,
}

impl Default for IndicatorWindows {
    fn default() -> Self {
        IndicatorWindows {
            ma_short: 5,
            ma_medium: 20,
            ma_long: 55,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            dkx_period: dkx::DEFAULT_PERIOD,
            dkx_ma_period: dkx::DEFAULT_MA_PERIOD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    /// Overrides the per-kind default title.
    pub title: Option<String>,
    pub number_format: NumberFormat,
    pub show_volume: bool,
    pub show_macd: bool,
    pub show_momentum: bool,
    pub show_equity: bool,
    pub marker_mode: MarkerMode,
    pub show_position_status: bool,
    pub quantity_unit: String,
    pub no_data_label: String,
    pub windows: IndicatorWindows,
    pub layout: LayoutBudget,
    pub zoom_start: f64,
    pub zoom_end: f64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            title: None,
            number_format: NumberFormat::default(),
            show_volume: true,
            show_macd: true,
            show_momentum: true,
            show_equity: true,
            marker_mode: MarkerMode::All,
            show_position_status: false,
            quantity_unit: DEFAULT_QUANTITY_UNIT.to_string(),
            no_data_label: DEFAULT_NO_DATA_LABEL.to_string(),
            windows: IndicatorWindows::default(),
            layout: LayoutBudget::default(),
            zoom_start: 50.0,
            zoom_end: 100.0,
        }
    }
}

/// Read and validate display options. Missing keys keep their defaults.
pub fn build_display_options(config: &dyn ConfigPort) -> Result<DisplayOptions, ChartError> {
    let defaults = DisplayOptions::default();

    let options = DisplayOptions {
        title: config
            .get_string("display", "title")
            .filter(|t| !t.trim().is_empty()),
        number_format: parse_or(config, "display", "number_format", defaults.number_format)?,
        show_volume: config.get_bool("display", "show_volume", defaults.show_volume),
        show_macd: config.get_bool("display", "show_macd", defaults.show_macd),
        show_momentum: config.get_bool("display", "show_momentum", defaults.show_momentum),
        show_equity: config.get_bool("display", "show_equity", defaults.show_equity),
        marker_mode: parse_or(config, "display", "marker_mode", defaults.marker_mode)?,
        show_position_status: config.get_bool(
            "display",
            "show_position_status",
            defaults.show_position_status,
        ),
        quantity_unit: config
            .get_string("display", "quantity_unit")
            .unwrap_or(defaults.quantity_unit),
        no_data_label: config
            .get_string("display", "no_data_label")
            .unwrap_or(defaults.no_data_label),
        windows: read_windows(config, &defaults.windows)?,
        layout: read_layout(config, &defaults.layout)?,
        zoom_start: parse_or(config, "layout", "zoom_start", defaults.zoom_start)?,
        zoom_end: parse_or(config, "layout", "zoom_end", defaults.zoom_end)?,
    };

    validate_display_options(&options)?;
    Ok(options)
}

fn parse_or<T>(config: &dyn ConfigPort, section: &str, key: &str, default: T) -> Result<T, ChartError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ChartError::invalid(section, key, format!("'{}': {}", raw.trim(), e))),
    }
}

fn read_windows(
    config: &dyn ConfigPort,
    defaults: &IndicatorWindows,
) -> Result<IndicatorWindows, ChartError> {
    let s = "indicators";
    Ok(IndicatorWindows {
        ma_short: parse_or(config, s, "ma_short", defaults.ma_short)?,
        ma_medium: parse_or(config, s, "ma_medium", defaults.ma_medium)?,
        ma_long: parse_or(config, s, "ma_long", defaults.ma_long)?,
        macd_fast: parse_or(config, s, "macd_fast", defaults.macd_fast)?,
        macd_slow: parse_or(config, s, "macd_slow", defaults.macd_slow)?,
        macd_signal: parse_or(config, s, "macd_signal", defaults.macd_signal)?,
        dkx_period: parse_or(config, s, "dkx_period", defaults.dkx_period)?,
        dkx_ma_period: parse_or(config, s, "dkx_ma_period", defaults.dkx_ma_period)?,
    })
}

fn read_layout(config: &dyn ConfigPort, defaults: &LayoutBudget) -> Result<LayoutBudget, ChartError> {
    let s = "layout";
    Ok(LayoutBudget {
        top: parse_or(config, s, "top", defaults.top)?,
        height: parse_or(config, s, "height", defaults.height)?,
        gap: parse_or(config, s, "gap", defaults.gap)?,
        band: parse_or(config, s, "band", defaults.band)?,
        band_share: parse_or(config, s, "band_share", defaults.band_share)?,
    })
}

pub fn validate_display_options(options: &DisplayOptions) -> Result<(), ChartError> {
    validate_windows(&options.windows)?;
    validate_layout(&options.layout)?;
    validate_zoom(options.zoom_start, options.zoom_end)?;
    Ok(())
}

fn validate_windows(w: &IndicatorWindows) -> Result<(), ChartError> {
    let windows = [
        ("ma_short", w.ma_short),
        ("ma_medium", w.ma_medium),
        ("ma_long", w.ma_long),
        ("macd_fast", w.macd_fast),
        ("macd_slow", w.macd_slow),
        ("macd_signal", w.macd_signal),
        ("dkx_period", w.dkx_period),
        ("dkx_ma_period", w.dkx_ma_period),
    ];
    for (key, value) in windows {
        if value == 0 {
            return Err(ChartError::invalid(
                "indicators",
                key,
                format!("{} must be positive", key),
            ));
        }
    }
    if w.macd_fast >= w.macd_slow {
        return Err(ChartError::invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

fn validate_layout(layout: &LayoutBudget) -> Result<(), ChartError> {
    let values = [
        ("top", layout.top),
        ("height", layout.height),
        ("gap", layout.gap),
        ("band", layout.band),
        ("band_share", layout.band_share),
    ];
    for (key, value) in values {
        if !(0.0..=100.0).contains(&value) {
            return Err(ChartError::invalid(
                "layout",
                key,
                format!("{} must be between 0 and 100", key),
            ));
        }
    }
    if layout.height <= 0.0 {
        return Err(ChartError::invalid("layout", "height", "height must be positive"));
    }
    if OPTIONAL_PANE_COUNT as f64 * layout.gap >= layout.height {
        return Err(ChartError::invalid(
            "layout",
            "gap",
            "gaps between all panes must leave room for the price pane",
        ));
    }
    if layout.top + layout.height > 100.0 {
        return Err(ChartError::invalid(
            "layout",
            "height",
            "top + height must not exceed 100",
        ));
    }
    Ok(())
}

fn validate_zoom(start: f64, end: f64) -> Result<(), ChartError> {
    if !(0.0..=100.0).contains(&start) {
        return Err(ChartError::invalid(
            "layout",
            "zoom_start",
            "zoom_start must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&end) {
        return Err(ChartError::invalid(
            "layout",
            "zoom_end",
            "zoom_end must be between 0 and 100",
        ));
    }
    if start >= end {
        return Err(ChartError::invalid(
            "layout",
            "zoom_start",
            "zoom_start must be less than zoom_end",
        ));
    }
    Ok(())
}

//! Compile a backtest payload into a [`PlotSpec`].
//!
//! Stages run one way: normalize bars, resolve indicators, align equity and
//! resolve markers against the bar axis, plan panes, then wire everything
//! into the spec. Nothing here fails; absorbed problems come back as
//! [`Diagnostic`]s for the caller to report.

use crate::domain::bar::{self, BarAxis, BarSlot};
use crate::domain::diagnostic::Diagnostic;
use crate::domain::equity;
use crate::domain::indicator::{self, calculate_dkx, calculate_macd, IndicatorSeries, NumberFormat};
use crate::domain::layout::{self, PaneKind, PanePresence, PaneRegion};
use crate::domain::marker::{self, Marker, TradeEvent, BUY_COLOR, NEUTRAL_COLOR, SELL_COLOR};
use crate::domain::metrics;
use crate::domain::options::{DisplayOptions, MarkerMode};
use crate::domain::payload::{BacktestPayload, DkxData, MaData, MacdData, NumericArray};
use crate::domain::plot::{
    Candle, ChartKind, DataPoint, Pane, PlotSpec, Series, SeriesData, SeriesKind, SeriesStyle,
    Slice, TooltipRule, ZoomWindow,
};
use tracing::debug;

pub const KLINE_TITLE: &str = "K线图 & 交易信号";
pub const EQUITY_TITLE: &str = "账户权益曲线";
pub const WIN_LOSS_TITLE: &str = "盈亏分布";

pub const CANDLE_SERIES: &str = "K线";
pub const VOLUME_SERIES: &str = "成交量";
pub const EQUITY_SERIES: &str = "资金曲线";
pub const EQUITY_ONLY_SERIES: &str = "权益";
pub const WIN_SLICE: &str = "盈利交易";
pub const LOSS_SLICE: &str = "亏损交易";

const MA_SHORT_COLOR: &str = "#d4b106";
const MA_MEDIUM_COLOR: &str = "#ff7f50";
const MA_LONG_COLOR: &str = "#87cefa";
const DIF_COLOR: &str = "#1890ff";
const DEA_COLOR: &str = "#fa8c16";
const DKX_COLOR: &str = "#722ed1";
const MADKX_COLOR: &str = "#fa8c16";
const EQUITY_COLOR: &str = "#1890ff";

#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub spec: PlotSpec,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile and drop the diagnostics.
pub fn compile(payload: &BacktestPayload, kind: ChartKind, options: &DisplayOptions) -> PlotSpec {
    compile_with_diagnostics(payload, kind, options).spec
}

pub fn compile_with_diagnostics(
    payload: &BacktestPayload,
    kind: ChartKind,
    options: &DisplayOptions,
) -> Compiled {
    let mut diagnostics = Vec::new();
    let spec = match kind {
        ChartKind::Kline => compile_kline(payload, options, &mut diagnostics),
        ChartKind::Equity => compile_equity(payload, options, &mut diagnostics),
        ChartKind::WinLoss => compile_win_loss(payload, options),
    };

    debug!(
        kind = %kind,
        categories = spec.categories.len(),
        panes = spec.panes.len(),
        series = spec.series.len(),
        markers = spec.markers.len(),
        diagnostics = diagnostics.len(),
        placeholder = spec.placeholder,
        "compiled plot spec"
    );

    Compiled { spec, diagnostics }
}

fn title(options: &DisplayOptions, default: &str) -> String {
    options.title.clone().unwrap_or_else(|| default.to_string())
}

fn compile_kline(
    payload: &BacktestPayload,
    options: &DisplayOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> PlotSpec {
    let Some(kline) = payload
        .kline_data
        .as_ref()
        .filter(|k| !k.dates.is_empty() && !k.values.is_empty())
    else {
        diagnostics.push(Diagnostic::EmptyInput);
        return PlotSpec::placeholder(ChartKind::Kline, &options.no_data_label);
    };

    let (axis, mut normalize_diags) = bar::normalize(kline);
    diagnostics.append(&mut normalize_diags);
    let closes = axis.closes();

    let overlays = resolve_overlays(kline.ma.as_ref(), &closes, options, diagnostics);
    let macd = match (&kline.macd, options.show_macd) {
        (Some(supplied), true) => Some(resolve_macd(supplied, &closes, options, diagnostics)),
        _ => None,
    };
    let dkx = match (&kline.dkx, options.show_momentum) {
        (Some(supplied), true) => Some(resolve_dkx(supplied, &axis, options, diagnostics)),
        _ => None,
    };
    let samples = payload.equity_samples();
    let equity = (options.show_equity && !samples.is_empty())
        .then(|| equity::align(&samples, &axis.timestamps));
    let show_volume = options.show_volume && axis.has_volume();

    let markers = resolve_markers(payload, &axis, options, diagnostics);

    let presence = PanePresence {
        volume: show_volume,
        oscillator: macd.is_some(),
        momentum: dkx.is_some(),
        equity: equity.is_some(),
    };
    let regions = layout::plan(&presence, &options.layout);
    let pane_of = |kind: PaneKind| regions.iter().position(|r| r.kind == kind);
    let price = pane_of(PaneKind::Price);

    let mut series = vec![candle_series(&axis, price)];
    for overlay in overlays {
        series.push(line(
            overlay.series,
            price,
            options.number_format,
            overlay.color,
            overlay.width,
        ));
    }
    if show_volume {
        series.push(volume_series(&axis, pane_of(PaneKind::Volume)));
    }
    if let Some([dif, dea, hist]) = macd {
        let pane = pane_of(PaneKind::Oscillator);
        series.push(line(dif, pane, options.number_format, DIF_COLOR, 1.0));
        series.push(line(dea, pane, options.number_format, DEA_COLOR, 1.0));
        series.push(histogram_series(hist, pane, options.number_format));
    }
    if let Some([dkx_line, madkx_line]) = dkx {
        let pane = pane_of(PaneKind::Momentum);
        series.push(line(dkx_line, pane, options.number_format, DKX_COLOR, 2.0));
        series.push(line(madkx_line, pane, options.number_format, MADKX_COLOR, 2.0));
    }
    if let Some(values) = equity {
        series.push(Series {
            name: EQUITY_SERIES.to_string(),
            kind: SeriesKind::Line,
            pane: pane_of(PaneKind::Equity),
            data: SeriesData::Values(
                values
                    .into_iter()
                    .map(|v| DataPoint::from_value(Some(v), options.number_format))
                    .collect(),
            ),
            style: SeriesStyle {
                color: Some(EQUITY_COLOR),
                line_width: Some(1.5),
                area: true,
                item_colors: None,
            },
            tooltip: TooltipRule::Value,
        });
    }

    PlotSpec {
        title: title(options, KLINE_TITLE),
        kind: ChartKind::Kline,
        placeholder: false,
        categories: axis.timestamps.clone(),
        panes: panes_from(&regions),
        legend: series.iter().map(|s| s.name.clone()).collect(),
        series,
        markers,
        zoom: Some(ZoomWindow {
            start: options.zoom_start,
            end: options.zoom_end,
            inside: true,
            slider: true,
            panes: (0..regions.len()).collect(),
        }),
        summary: payload
            .metrics
            .as_ref()
            .map(metrics::summarize)
            .unwrap_or_default(),
    }
}

fn panes_from(regions: &[PaneRegion]) -> Vec<Pane> {
    let last = regions.len().saturating_sub(1);
    regions
        .iter()
        .enumerate()
        .map(|(i, region)| Pane::from_region(region, i == last))
        .collect()
}

struct Overlay {
    series: IndicatorSeries,
    color: &'static str,
    width: f64,
}

/// Short, medium and long moving averages. Strategy-supplied lines take the
/// medium and long slots when present.
fn resolve_overlays(
    ma: Option<&MaData>,
    closes: &[Option<f64>],
    options: &DisplayOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Overlay> {
    let w = &options.windows;
    let short = moving_average(ma, closes, w.ma_short, MA_SHORT_COLOR, diagnostics);

    let fast = ma.and_then(|m| m.strategy_fast.as_ref().map(|v| (v, m.strategy_fast_label.as_deref())));
    let medium = match fast {
        Some((values, label)) => strategy_line(
            values,
            label.unwrap_or("Fast MA"),
            closes,
            w.ma_medium,
            MA_MEDIUM_COLOR,
            diagnostics,
        ),
        None => moving_average(ma, closes, w.ma_medium, MA_MEDIUM_COLOR, diagnostics),
    };

    let slow = ma.and_then(|m| m.strategy_slow.as_ref().map(|v| (v, m.strategy_slow_label.as_deref())));
    let long = match slow {
        Some((values, label)) => strategy_line(
            values,
            label.unwrap_or("Slow MA"),
            closes,
            w.ma_long,
            MA_LONG_COLOR,
            diagnostics,
        ),
        None => moving_average(ma, closes, w.ma_long, MA_LONG_COLOR, diagnostics),
    };

    vec![short, medium, long]
}

fn moving_average(
    ma: Option<&MaData>,
    closes: &[Option<f64>],
    window: usize,
    color: &'static str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Overlay {
    let supplied = ma.and_then(|m| m.window(window)).map(NumericArray::as_slice);
    Overlay {
        series: indicator::resolve(&format!("MA{}", window), supplied, closes, window, diagnostics),
        color,
        width: 1.0,
    }
}

/// A strategy line that does not fit the axis falls back to the SMA of the
/// slot it replaces, under the strategy's name.
fn strategy_line(
    values: &NumericArray,
    name: &str,
    closes: &[Option<f64>],
    window: usize,
    color: &'static str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Overlay {
    Overlay {
        series: indicator::resolve(name, Some(values.as_slice()), closes, window, diagnostics),
        color,
        width: 1.5,
    }
}

/// DIF, DEA and histogram. Any component that does not fit the axis is
/// replaced from one local MACD computation.
fn resolve_macd(
    supplied: &MacdData,
    closes: &[Option<f64>],
    options: &DisplayOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> [IndicatorSeries; 3] {
    let w = &options.windows;
    let mut computed = None;
    let mut computed_lines = || {
        computed
            .get_or_insert_with(|| calculate_macd(closes, w.macd_fast, w.macd_slow, w.macd_signal))
            .clone()
    };
    let len = closes.len();

    let dif = indicator::resolve_with(
        "DIF",
        supplied.dif.as_ref().map(NumericArray::as_slice),
        len,
        diagnostics,
        || computed_lines().dif,
    );
    let dea = indicator::resolve_with(
        "DEA",
        supplied.dea.as_ref().map(NumericArray::as_slice),
        len,
        diagnostics,
        || computed_lines().dea,
    );
    let hist = indicator::resolve_with(
        "MACD",
        supplied.hist.as_ref().map(NumericArray::as_slice),
        len,
        diagnostics,
        || computed_lines().hist,
    );
    [dif, dea, hist]
}

fn resolve_dkx(
    supplied: &DkxData,
    axis: &BarAxis,
    options: &DisplayOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> [IndicatorSeries; 2] {
    let w = &options.windows;
    let mut computed = None;
    let mut computed_lines = || {
        computed
            .get_or_insert_with(|| calculate_dkx(&axis.slots, w.dkx_period, w.dkx_ma_period))
            .clone()
    };
    let len = axis.len();

    let dkx = indicator::resolve_with(
        "DKX",
        supplied.dkx.as_ref().map(NumericArray::as_slice),
        len,
        diagnostics,
        || computed_lines().dkx,
    );
    let madkx = indicator::resolve_with(
        "MADKX",
        supplied.madkx.as_ref().map(NumericArray::as_slice),
        len,
        diagnostics,
        || computed_lines().madkx,
    );
    [dkx, madkx]
}

fn resolve_markers(
    payload: &BacktestPayload,
    axis: &BarAxis,
    options: &DisplayOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Marker> {
    let rows = payload.events();
    let events = marker::collect_trade_events(rows, diagnostics);
    let drawdowns = marker::collect_drawdown_events(rows, diagnostics);
    let on_axis = axis.timestamp_set();
    let unit = options.quantity_unit.as_str();

    let shown: Vec<TradeEvent> = match options.marker_mode {
        MarkerMode::All => events.clone(),
        MarkerMode::LatestEntry => marker::latest_entry(&events).cloned().into_iter().collect(),
    };

    let mut markers = marker::resolve_trades(&shown, &on_axis, unit, diagnostics);
    markers.extend(marker::resolve_drawdowns(&drawdowns, &on_axis, diagnostics));

    if options.show_position_status || options.marker_mode == MarkerMode::LatestEntry {
        if let Some(status) = marker::position_status(axis, &events, unit) {
            markers.push(Marker::Status(status));
        }
    }
    markers
}

fn candle_series(axis: &BarAxis, pane: Option<usize>) -> Series {
    let candles = axis
        .slots
        .iter()
        .map(|slot| {
            slot.bar().map(|b| Candle {
                open: b.open,
                close: b.close,
                low: b.low,
                high: b.high,
            })
        })
        .collect();

    Series {
        name: CANDLE_SERIES.to_string(),
        kind: SeriesKind::Candlestick,
        pane,
        data: SeriesData::Candles(candles),
        style: SeriesStyle {
            item_colors: Some(direction_colors(&axis.slots)),
            ..SeriesStyle::default()
        },
        tooltip: TooltipRule::Ohlc,
    }
}

fn direction_colors(slots: &[BarSlot]) -> Vec<&'static str> {
    slots
        .iter()
        .map(|slot| match slot.bar() {
            Some(b) if b.is_rising() => BUY_COLOR,
            Some(_) => SELL_COLOR,
            None => NEUTRAL_COLOR,
        })
        .collect()
}

fn volume_series(axis: &BarAxis, pane: Option<usize>) -> Series {
    let volumes = axis
        .slots
        .iter()
        .map(|slot| DataPoint::from_value(slot.bar().and_then(|b| b.volume), NumberFormat::Raw))
        .collect();

    Series {
        name: VOLUME_SERIES.to_string(),
        kind: SeriesKind::Bar,
        pane,
        data: SeriesData::Values(volumes),
        style: SeriesStyle {
            item_colors: Some(direction_colors(&axis.slots)),
            ..SeriesStyle::default()
        },
        tooltip: TooltipRule::Value,
    }
}

fn histogram_series(hist: IndicatorSeries, pane: Option<usize>, format: NumberFormat) -> Series {
    let colors = hist
        .values
        .iter()
        .map(|v| match v {
            Some(v) if *v >= 0.0 => BUY_COLOR,
            Some(_) => SELL_COLOR,
            None => NEUTRAL_COLOR,
        })
        .collect();

    Series {
        name: hist.name,
        kind: SeriesKind::Bar,
        pane,
        data: SeriesData::Values(
            hist.values
                .into_iter()
                .map(|v| DataPoint::from_value(v, format))
                .collect(),
        ),
        style: SeriesStyle {
            item_colors: Some(colors),
            ..SeriesStyle::default()
        },
        tooltip: TooltipRule::Value,
    }
}

fn line(
    indicator: IndicatorSeries,
    pane: Option<usize>,
    format: NumberFormat,
    color: &'static str,
    width: f64,
) -> Series {
    Series {
        name: indicator.name,
        kind: SeriesKind::Line,
        pane,
        data: SeriesData::Values(
            indicator
                .values
                .into_iter()
                .map(|v| DataPoint::from_value(v, format))
                .collect(),
        ),
        style: SeriesStyle {
            color: Some(color),
            line_width: Some(width),
            area: false,
            item_colors: None,
        },
        tooltip: TooltipRule::Value,
    }
}

/// Raw equity samples on their own date axis.
fn compile_equity(
    payload: &BacktestPayload,
    options: &DisplayOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> PlotSpec {
    let samples = payload.equity_samples();
    if samples.is_empty() {
        diagnostics.push(Diagnostic::EmptyInput);
        return PlotSpec::placeholder(ChartKind::Equity, &options.no_data_label);
    }

    let region = PaneRegion {
        kind: PaneKind::Equity,
        top: options.layout.top,
        height: options.layout.height,
    };
    let series = Series {
        name: EQUITY_ONLY_SERIES.to_string(),
        kind: SeriesKind::Line,
        pane: Some(0),
        data: SeriesData::Values(
            samples
                .iter()
                .map(|s| DataPoint::from_value(Some(s.value), options.number_format))
                .collect(),
        ),
        style: SeriesStyle {
            color: Some(EQUITY_COLOR),
            line_width: Some(1.5),
            area: true,
            item_colors: None,
        },
        tooltip: TooltipRule::Value,
    };

    PlotSpec {
        title: title(options, EQUITY_TITLE),
        kind: ChartKind::Equity,
        placeholder: false,
        categories: samples.into_iter().map(|s| s.timestamp).collect(),
        panes: vec![Pane::from_region(&region, true)],
        legend: vec![series.name.clone()],
        series: vec![series],
        markers: Vec::new(),
        zoom: None,
        summary: Vec::new(),
    }
}

/// Winning vs losing share of trades from the reported win rate.
fn compile_win_loss(payload: &BacktestPayload, options: &DisplayOptions) -> PlotSpec {
    let win = payload
        .metrics
        .as_ref()
        .map(|m| m.win_rate_fraction())
        .unwrap_or(0.0);

    let series = Series {
        name: WIN_LOSS_TITLE.to_string(),
        kind: SeriesKind::Pie,
        pane: None,
        data: SeriesData::Slices(vec![
            Slice {
                name: WIN_SLICE.to_string(),
                value: win,
                color: BUY_COLOR,
            },
            Slice {
                name: LOSS_SLICE.to_string(),
                value: 1.0 - win,
                color: SELL_COLOR,
            },
        ]),
        style: SeriesStyle::default(),
        tooltip: TooltipRule::Share,
    };

    PlotSpec {
        title: title(options, WIN_LOSS_TITLE),
        kind: ChartKind::WinLoss,
        placeholder: false,
        categories: Vec::new(),
        panes: Vec::new(),
        legend: vec![WIN_SLICE.to_string(), LOSS_SLICE.to_string()],
        series: vec![series],
        markers: Vec::new(),
        zoom: None,
        summary: Vec::new(),
    }
}

//! Tooltip text for an axis position or a marker, rendered from a compiled
//! spec on demand.

use crate::domain::marker::{HoldingDirection, Marker};
use crate::domain::plot::{PlotSpec, SeriesData, TooltipRule, MISSING};

fn two_decimals(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}", v))
}

/// Every series' value at one category, in series order.
///
/// Candles list open, close, low and high on separate lines; other series a
/// single two-decimal value. Returns `None` past the end of the axis.
pub fn axis_tooltip(spec: &PlotSpec, index: usize) -> Option<String> {
    let category = spec.categories.get(index)?;
    let mut lines = vec![category.to_string()];

    for series in &spec.series {
        match (&series.data, series.tooltip) {
            (SeriesData::Candles(candles), TooltipRule::Ohlc) => match candles.get(index) {
                Some(Some(c)) => {
                    lines.push(series.name.clone());
                    lines.push(format!("开盘: {:.2}", c.open));
                    lines.push(format!("收盘: {:.2}", c.close));
                    lines.push(format!("最低: {:.2}", c.low));
                    lines.push(format!("最高: {:.2}", c.high));
                }
                _ => lines.push(format!("{}: {}", series.name, MISSING)),
            },
            (SeriesData::Values(points), _) => {
                let value = points.get(index).and_then(|p| p.as_f64());
                lines.push(format!("{}: {}", series.name, two_decimals(value)));
            }
            _ => {}
        }
    }
    Some(lines.join("\n"))
}

/// Slice name, value and share of the total for pie series.
pub fn slice_tooltip(spec: &PlotSpec, slice: usize) -> Option<String> {
    spec.series.iter().find_map(|series| match &series.data {
        SeriesData::Slices(slices) => {
            let s = slices.get(slice)?;
            let total: f64 = slices.iter().map(|s| s.value).sum();
            let share = if total > 0.0 { s.value / total * 100.0 } else { 0.0 };
            Some(format!("{}\n{}: {:.2} ({:.2}%)", series.name, s.name, s.value, share))
        }
        _ => None,
    })
}

pub fn marker_tooltip(marker: &Marker) -> String {
    match marker {
        Marker::Trade(m) => format!(
            "{}\n时间: {}\n价格: {:.2}",
            m.text, m.timestamp, m.price
        ),
        Marker::Drawdown(m) => {
            let direction = match m.holding_direction {
                HoldingDirection::Long => "多",
                HoldingDirection::Short => "空",
                HoldingDirection::Unknown => MISSING,
            };
            format!(
                "最大回撤\n时间: {}\n持仓方向: {}\n开仓价: {:.2}\n极值价: {:.2}\n回撤幅度: {:.2}",
                m.timestamp,
                direction,
                m.entry_price,
                m.price,
                m.loss_magnitude()
            )
        }
        Marker::Status(m) => format!("{}\n{}\n收盘: {:.2}", m.text, m.timestamp, m.price),
    }
}

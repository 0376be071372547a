//! Backtest metrics as delivered in the payload, and their display summary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metrics block of the result payload. Every field is optional and may be a
/// number or a string such as `"55%"`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub initial_cash: Option<Value>,
    pub final_value: Option<Value>,
    pub net_profit: Option<Value>,
    pub return_rate: Option<Value>,
    pub sharpe_ratio: Option<Value>,
    pub max_drawdown: Option<Value>,
    pub total_trades: Option<Value>,
    pub win_rate: Option<Value>,
    pub used_size: Option<Value>,
    pub max_capital_usage: Option<Value>,
    pub one_hand_net_profit: Option<Value>,
    pub max_profit_points: Option<Value>,
    pub max_loss_points: Option<Value>,
    pub one_hand_profit_pct: Option<Value>,
}

/// Sign-based coloring hint for P&L rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    fn of(value: Option<f64>) -> Self {
        match value {
            Some(v) if v > 0.0 => Tone::Positive,
            Some(v) if v < 0.0 => Tone::Negative,
            _ => Tone::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

/// Number from a JSON number or a string, ignoring a trailing `%`.
pub fn metric_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite())
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v))
}

impl Metrics {
    /// Win rate as a fraction in `[0, 1]`. Values above 1 are percentages.
    pub fn win_rate_fraction(&self) -> f64 {
        let rate = metric_number(self.win_rate.as_ref()).unwrap_or(0.0);
        let rate = if rate > 1.0 { rate / 100.0 } else { rate };
        rate.clamp(0.0, 1.0)
    }
}

pub fn summarize(metrics: &Metrics) -> Vec<MetricRow> {
    let num = |v: &Option<Value>| metric_number(v.as_ref());
    let plain = |key, label, value| MetricRow {
        key,
        label,
        value,
        tone: Tone::Neutral,
    };
    let pnl = |key, label, value: Option<f64>| MetricRow {
        key,
        label,
        value: fixed(value, 2),
        tone: Tone::of(value),
    };

    let mut rows = vec![
        plain("final_value", "最终权益", fixed(num(&metrics.final_value), 2)),
        pnl("net_profit", "净利润", num(&metrics.net_profit)),
        plain(
            "sharpe_ratio",
            "夏普比率",
            format!("{:.4}", num(&metrics.sharpe_ratio).unwrap_or(0.0)),
        ),
        plain("max_drawdown", "最大回撤", percent(num(&metrics.max_drawdown))),
        plain(
            "total_trades",
            "总交易次数",
            format!("{}", num(&metrics.total_trades).unwrap_or(0.0).round() as i64),
        ),
        plain("win_rate", "胜率", percent(num(&metrics.win_rate))),
    ];

    if metrics.initial_cash.is_some() {
        rows.insert(0, plain("initial_cash", "初始资金", fixed(num(&metrics.initial_cash), 2)));
    }
    if metrics.return_rate.is_some() {
        let value = num(&metrics.return_rate);
        let at = rows.iter().position(|r| r.key == "net_profit").map_or(0, |i| i + 1);
        rows.insert(
            at,
            MetricRow {
                key: "return_rate",
                label: "收益率",
                value: percent(value),
                tone: Tone::of(value),
            },
        );
    }

    if let Some(v) = &metrics.used_size {
        let value = match v {
            Value::String(s) => s.clone(),
            other => metric_number(Some(other)).map_or_else(|| "-".to_string(), |n| n.to_string()),
        };
        rows.push(plain("used_size", "使用手数", value));
    }
    if metrics.max_capital_usage.is_some() {
        rows.push(plain(
            "max_capital_usage",
            "最大资金使用率",
            percent(num(&metrics.max_capital_usage)),
        ));
    }
    if metrics.one_hand_net_profit.is_some() {
        rows.push(pnl(
            "one_hand_net_profit",
            "一手最终赚钱数",
            num(&metrics.one_hand_net_profit),
        ));
    }
    if metrics.max_profit_points.is_some() {
        rows.push(plain(
            "max_profit_points",
            "最大盈利点",
            fixed(num(&metrics.max_profit_points), 2),
        ));
    }
    if metrics.max_loss_points.is_some() {
        rows.push(plain(
            "max_loss_points",
            "最大亏损点",
            fixed(num(&metrics.max_loss_points), 2),
        ));
    }
    if metrics.one_hand_profit_pct.is_some() {
        let value = num(&metrics.one_hand_profit_pct);
        rows.push(MetricRow {
            key: "one_hand_profit_pct",
            label: "一手盈利百分数",
            value: percent(value),
            tone: Tone::of(value),
        });
    }
    rows
}

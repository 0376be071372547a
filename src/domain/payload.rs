//! JSON result payload delivered by the backtest service.
//!
//! Decoding is lenient: nulls, numeric strings and missing
//! groups are accepted here and sorted out by the compiler stages.

use crate::domain::equity::EquitySample;
use crate::domain::metrics::Metrics;
use crate::domain::timestamp::Timestamp;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Finite number from a JSON number or numeric string.
pub(crate) fn number_of(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite())
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_of))
}

/// Array of plottable numbers; non-numeric entries become `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct NumericArray(pub Vec<Option<f64>>);

impl From<Value> for NumericArray {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => NumericArray(items.iter().map(number_of).collect()),
            _ => NumericArray(Vec::new()),
        }
    }
}

impl From<Vec<f64>> for NumericArray {
    fn from(values: Vec<f64>) -> Self {
        NumericArray(values.into_iter().map(Some).collect())
    }
}

impl NumericArray {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<f64>] {
        &self.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BacktestPayload {
    #[serde(default)]
    pub kline_data: Option<KlineData>,
    #[serde(default)]
    pub equity_curve: Option<Vec<Option<RawEquityPoint>>>,
    #[serde(default)]
    pub trades: Option<Vec<RawTrade>>,
    /// Older results name the trade list `signals`; it wins when present.
    #[serde(default)]
    pub signals: Option<Vec<RawTrade>>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
}

impl BacktestPayload {
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Payload carrying only bars, e.g. from a CSV import.
    pub fn from_kline(kline: KlineData) -> Self {
        BacktestPayload {
            kline_data: Some(kline),
            ..BacktestPayload::default()
        }
    }

    pub fn events(&self) -> &[RawTrade] {
        self.signals
            .as_deref()
            .or(self.trades.as_deref())
            .unwrap_or_default()
    }

    /// Equity samples in payload order, skipping null or undated entries.
    pub fn equity_samples(&self) -> Vec<EquitySample> {
        self.equity_curve
            .iter()
            .flatten()
            .flatten()
            .filter_map(|p| {
                Some(EquitySample {
                    timestamp: p.date.clone()?,
                    value: p.value?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KlineData {
    #[serde(default)]
    pub dates: Vec<Timestamp>,
    /// Rows of `[open, close, low, high]`, or `[key, open, close, low, high]`.
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub volumes: Option<NumericArray>,
    #[serde(default)]
    pub ma: Option<MaData>,
    #[serde(default)]
    pub macd: Option<MacdData>,
    #[serde(default)]
    pub dkx: Option<DkxData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaData {
    #[serde(default)]
    pub strategy_fast: Option<NumericArray>,
    #[serde(default)]
    pub strategy_fast_label: Option<String>,
    #[serde(default)]
    pub strategy_slow: Option<NumericArray>,
    #[serde(default)]
    pub strategy_slow_label: Option<String>,
    /// `ma5`, `ma20`, `ma55`, ... keyed by their payload name.
    #[serde(flatten)]
    pub windows: BTreeMap<String, NumericArray>,
}

impl MaData {
    pub fn window(&self, window: usize) -> Option<&NumericArray> {
        self.windows.get(&format!("ma{}", window))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MacdData {
    #[serde(default)]
    pub dif: Option<NumericArray>,
    #[serde(default)]
    pub dea: Option<NumericArray>,
    #[serde(default)]
    pub hist: Option<NumericArray>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DkxData {
    #[serde(default)]
    pub dkx: Option<NumericArray>,
    #[serde(default)]
    pub madkx: Option<NumericArray>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEquityPoint {
    #[serde(default)]
    pub date: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
}

/// One row of the trade list. The drawdown fields ride along on the trade
/// whose holding period they describe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrade {
    #[serde(default)]
    pub date: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "type")]
    pub side: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub position: Option<f64>,
    #[serde(default)]
    pub custom_label: Option<String>,
    #[serde(default)]
    pub mdd_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mdd_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub holding_direction: Option<String>,
}

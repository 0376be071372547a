#![allow(dead_code)]

use klineplot::domain::payload::BacktestPayload;
use serde_json::{json, Value};
use std::io::Write;

/// Builder for result payloads in the backtest service's JSON shape.
pub struct PayloadBuilder {
    dates: Vec<Value>,
    values: Vec<Value>,
    volumes: Option<Vec<Value>>,
    ma: Option<Value>,
    macd: Option<Value>,
    dkx: Option<Value>,
    equity: Option<Vec<Value>>,
    trades: Vec<Value>,
    metrics: Option<Value>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self {
            dates: Vec::new(),
            values: Vec::new(),
            volumes: None,
            ma: None,
            macd: None,
            dkx: None,
            equity: None,
            trades: Vec::new(),
            metrics: None,
        }
    }

    /// One flat-bodied bar per close: open = close, low/high = close -/+ 1.
    pub fn closes(mut self, dates: &[&str], closes: &[f64]) -> Self {
        for (date, close) in dates.iter().zip(closes) {
            self.dates.push(json!(date));
            self.values.push(json!([close, close, close - 1.0, close + 1.0]));
        }
        self
    }

    pub fn row(mut self, date: &str, row: Value) -> Self {
        self.dates.push(json!(date));
        self.values.push(row);
        self
    }

    pub fn volumes(mut self, volumes: &[f64]) -> Self {
        self.volumes = Some(volumes.iter().map(|v| json!(v)).collect());
        self
    }

    pub fn ma(mut self, ma: Value) -> Self {
        self.ma = Some(ma);
        self
    }

    pub fn macd(mut self, macd: Value) -> Self {
        self.macd = Some(macd);
        self
    }

    pub fn dkx(mut self, dkx: Value) -> Self {
        self.dkx = Some(dkx);
        self
    }

    pub fn equity(mut self, samples: &[(&str, f64)]) -> Self {
        self.equity = Some(
            samples
                .iter()
                .map(|(d, v)| json!({ "date": d, "value": v }))
                .collect(),
        );
        self
    }

    pub fn trade(mut self, trade: Value) -> Self {
        self.trades.push(trade);
        self
    }

    pub fn metrics(mut self, metrics: Value) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut kline = json!({ "dates": self.dates, "values": self.values });
        if let Some(v) = &self.volumes {
            kline["volumes"] = json!(v);
        }
        if let Some(ma) = &self.ma {
            kline["ma"] = ma.clone();
        }
        if let Some(macd) = &self.macd {
            kline["macd"] = macd.clone();
        }
        if let Some(dkx) = &self.dkx {
            kline["dkx"] = dkx.clone();
        }

        let mut payload = json!({ "kline_data": kline, "trades": self.trades });
        if let Some(equity) = &self.equity {
            payload["equity_curve"] = json!(equity);
        }
        if let Some(metrics) = &self.metrics {
            payload["metrics"] = metrics.clone();
        }
        payload
    }

    pub fn build(&self) -> BacktestPayload {
        serde_json::from_value(self.to_json()).unwrap()
    }
}

pub fn trade(date: &str, price: f64, action: &str, size: f64, position: f64) -> Value {
    json!({ "date": date, "price": price, "action": action, "size": size, "position": position })
}

pub fn four_days() -> [&'static str; 4] {
    ["d1", "d2", "d3", "d4"]
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

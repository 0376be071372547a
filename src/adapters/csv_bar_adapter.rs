//! CSV bar file adapter.
//!
//! Reads `date,open,high,low,close[,volume]` (header required, columns
//! matched by name) into a kline-only payload. Cells that do not parse are
//! left empty so the normalizer turns the row into a gap.

use crate::domain::error::ChartError;
use crate::domain::payload::{BacktestPayload, KlineData, NumericArray};
use crate::domain::timestamp::Timestamp;
use crate::ports::payload_port::PayloadSource;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

const REQUIRED: [&str; 5] = ["date", "open", "high", "low", "close"];

pub struct CsvBarAdapter {
    path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_error(&self, reason: impl Into<String>) -> ChartError {
        ChartError::Csv {
            file: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn read_kline(&self) -> Result<KlineData, ChartError> {
        let content = fs::read_to_string(&self.path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| self.csv_error(format!("unreadable header: {}", e)))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };

        let mut indices = [0usize; 5];
        for (slot, name) in indices.iter_mut().zip(REQUIRED) {
            *slot = column(name).ok_or_else(|| self.csv_error(format!("missing column '{}'", name)))?;
        }
        let [date_col, open_col, high_col, low_col, close_col] = indices;
        let volume_col = column("volume");

        let mut dates = Vec::new();
        let mut values = Vec::new();
        let mut volumes = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(format!("record {}: {}", line + 1, e)))?;
            let cell = |i: usize| record.get(i).and_then(|s| s.parse::<f64>().ok());

            let date = record.get(date_col).unwrap_or_default();
            dates.push(Timestamp::text(date));
            values.push(Value::Array(vec![
                Value::from(cell(open_col)),
                Value::from(cell(close_col)),
                Value::from(cell(low_col)),
                Value::from(cell(high_col)),
            ]));
            if let Some(col) = volume_col {
                volumes.push(cell(col));
            }
        }

        Ok(KlineData {
            dates,
            values,
            volumes: volume_col.map(|_| NumericArray(volumes)),
            ..KlineData::default()
        })
    }
}

impl PayloadSource for CsvBarAdapter {
    fn load_payload(&self) -> Result<BacktestPayload, ChartError> {
        Ok(BacktestPayload::from_kline(self.read_kline()?))
    }
}

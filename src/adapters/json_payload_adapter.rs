//! JSON result payload adapter.

use crate::domain::error::ChartError;
use crate::domain::payload::BacktestPayload;
use crate::ports::payload_port::PayloadSource;
use std::fs;
use std::path::PathBuf;

pub struct JsonPayloadAdapter {
    path: PathBuf,
}

impl JsonPayloadAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PayloadSource for JsonPayloadAdapter {
    fn load_payload(&self) -> Result<BacktestPayload, ChartError> {
        let content = fs::read_to_string(&self.path)?;
        BacktestPayload::from_json(&content).map_err(|e| ChartError::PayloadDecode {
            source_name: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

//! JSON plot spec writer.

use crate::domain::error::ChartError;
use crate::domain::plot::PlotSpec;
use crate::ports::spec_port::SpecSink;
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSpecAdapter {
    pub pretty: bool,
}

impl JsonSpecAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn encode(&self, spec: &PlotSpec) -> Result<String, ChartError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(spec)
        } else {
            serde_json::to_string(spec)
        };
        encoded.map_err(|e| ChartError::Encode {
            reason: e.to_string(),
        })
    }
}

impl SpecSink for JsonSpecAdapter {
    fn write(&self, spec: &PlotSpec, output_path: Option<&Path>) -> Result<(), ChartError> {
        let json = self.encode(spec)?;

        match output_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json)?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", json)?;
            }
        }
        Ok(())
    }
}

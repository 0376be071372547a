//! Payload loading port trait.

use crate::domain::error::ChartError;
use crate::domain::payload::BacktestPayload;

/// Anything that can produce a backtest result payload: a JSON result file,
/// a CSV of bars, or a test fixture.
pub trait PayloadSource {
    fn load_payload(&self) -> Result<BacktestPayload, ChartError>;
}

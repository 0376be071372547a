//! Plot spec output port trait.

use crate::domain::error::ChartError;
use crate::domain::plot::PlotSpec;
use std::path::Path;

pub trait SpecSink {
    /// Write the spec to `output_path`, or to stdout when it is `None`.
    fn write(&self, spec: &PlotSpec, output_path: Option<&Path>) -> Result<(), ChartError>;
}

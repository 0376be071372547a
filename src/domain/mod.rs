//! Chart compilation core: payload model, pipeline stages and the plot spec.

pub mod action;
pub mod assemble;
pub mod bar;
pub mod diagnostic;
pub mod equity;
pub mod error;
pub mod indicator;
pub mod layout;
pub mod marker;
pub mod metrics;
pub mod options;
pub mod payload;
pub mod plot;
pub mod timestamp;
pub mod tooltip;

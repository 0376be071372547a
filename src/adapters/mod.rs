//! File-backed implementations of the ports.

pub mod csv_bar_adapter;
pub mod file_config_adapter;
pub mod json_payload_adapter;
pub mod json_spec_adapter;

//! Port traits at the I/O seams.

pub mod config_port;
pub mod payload_port;
pub mod spec_port;

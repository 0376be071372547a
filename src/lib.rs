//! klineplot: compiles backtest results into renderer-agnostic chart specs.
//!
//! Hexagonal architecture: the pure compiler in [`domain`], port traits in
//! [`ports`], file-backed implementations in [`adapters`] and command
//! dispatch in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;

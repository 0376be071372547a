//! Conditions the compiler absorbs into degraded output instead of failing.
//!
//! They are returned to the caller, which decides whether to log them.

use crate::domain::timestamp::Timestamp;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Trade,
    Drawdown,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Trade => write!(f, "trade"),
            EventKind::Drawdown => write!(f, "drawdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Bar row failed shape validation and became a gap.
    MalformedBar { index: usize, reason: &'static str },
    /// Supplied array length disagrees with the bar axis.
    AxisMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },
    /// Event could not be placed on the bar axis and was dropped.
    OrphanEvent {
        kind: EventKind,
        index: usize,
        timestamp: Option<Timestamp>,
    },
    /// No bars at all; a placeholder spec was produced.
    EmptyInput,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedBar { index, reason } => {
                write!(f, "bar {} treated as gap: {}", index, reason)
            }
            Diagnostic::AxisMismatch {
                series,
                expected,
                actual,
            } => write!(
                f,
                "{} has {} values but the bar axis has {}",
                series, actual, expected
            ),
            Diagnostic::OrphanEvent {
                kind,
                index,
                timestamp: Some(ts),
            } => write!(f, "{} event {} at {} is not on the bar axis", kind, index, ts),
            Diagnostic::OrphanEvent {
                kind,
                index,
                timestamp: None,
            } => write!(f, "{} event {} has no usable timestamp or price", kind, index),
            Diagnostic::EmptyInput => write!(f, "no bars to plot"),
        }
    }
}

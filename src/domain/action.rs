//! Classification of free-form trade action labels.
//!
//! Upstream labels are human-readable text ("反手做多", "close-short",
//! "买多"). They are parsed once into [`TradeAction`] and everything
//! downstream works on the enum.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
    ReverseToLong,
    ReverseToShort,
    Unknown,
}

/// Which way a marker is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualDirection {
    Bullish,
    Bearish,
}

/// Order side from the payload's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "b" | "买" | "买入" => Some(OrderSide::Buy),
            "sell" | "s" | "卖" | "卖出" => Some(OrderSide::Sell),
            _ => None,
        }
    }
}

const REVERSAL: &[&str] = &["反手", "reverse", "reversal", "flip"];
const NOT_REVERSAL: &[&str] = &["不反手", "no reverse", "no-reverse"];
const CLOSE: &[&str] = &["平", "close", "cover", "exit"];
const LONG: &[&str] = &["多", "long"];
const SHORT: &[&str] = &["空", "short"];
const COVER: &[&str] = &["cover"];
const BUY: &[&str] = &["买", "buy"];
const SELL: &[&str] = &["卖出", "sell"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl TradeAction {
    /// Parse a label. `side` breaks ties when the text alone does not say
    /// which way a reversal or close went.
    pub fn classify(label: &str, side: Option<OrderSide>) -> Self {
        let text = label.trim().to_lowercase();
        if text.is_empty() {
            return TradeAction::Unknown;
        }

        if contains_any(&text, REVERSAL) && !contains_any(&text, NOT_REVERSAL) {
            return if contains_any(&text, LONG) || contains_any(&text, BUY) {
                TradeAction::ReverseToLong
            } else if contains_any(&text, SHORT) || contains_any(&text, SELL) {
                TradeAction::ReverseToShort
            } else {
                match side {
                    Some(OrderSide::Buy) => TradeAction::ReverseToLong,
                    Some(OrderSide::Sell) => TradeAction::ReverseToShort,
                    None => TradeAction::Unknown,
                }
            };
        }

        if contains_any(&text, CLOSE) {
            return if contains_any(&text, SHORT) || contains_any(&text, COVER) {
                TradeAction::CloseShort
            } else if contains_any(&text, LONG) {
                TradeAction::CloseLong
            } else {
                match side {
                    Some(OrderSide::Buy) => TradeAction::CloseShort,
                    Some(OrderSide::Sell) => TradeAction::CloseLong,
                    None => TradeAction::Unknown,
                }
            };
        }

        // "卖空"/"做空" open shorts; a bare "卖出"/"sell" exits a long.
        if contains_any(&text, SHORT) {
            TradeAction::OpenShort
        } else if contains_any(&text, LONG) || contains_any(&text, BUY) {
            TradeAction::OpenLong
        } else if contains_any(&text, SELL) {
            TradeAction::CloseLong
        } else {
            TradeAction::Unknown
        }
    }

    /// [`classify`](Self::classify), then the sign of the net position after
    /// the trade settles a reversal whose label and side name no direction.
    pub fn classify_with_position(
        label: &str,
        side: Option<OrderSide>,
        resulting_position: Option<f64>,
    ) -> Self {
        match Self::classify(label, side) {
            TradeAction::Unknown if Self::mentions_reversal(label) => match resulting_position {
                Some(p) if p > 0.0 => TradeAction::ReverseToLong,
                Some(p) if p < 0.0 => TradeAction::ReverseToShort,
                _ => TradeAction::Unknown,
            },
            action => action,
        }
    }

    /// Whether the label text names a reversal, whatever direction it gives.
    pub fn mentions_reversal(label: &str) -> bool {
        let text = label.trim().to_lowercase();
        contains_any(&text, REVERSAL) && !contains_any(&text, NOT_REVERSAL)
    }

    pub fn is_reversal(self) -> bool {
        matches!(self, TradeAction::ReverseToLong | TradeAction::ReverseToShort)
    }

    /// Opens or flips into a position.
    pub fn is_entry(self) -> bool {
        matches!(
            self,
            TradeAction::OpenLong
                | TradeAction::OpenShort
                | TradeAction::ReverseToLong
                | TradeAction::ReverseToShort
        )
    }

    /// Buying actions (open long, cover short, flip to long) draw bullish.
    pub fn visual_direction(self) -> Option<VisualDirection> {
        match self {
            TradeAction::OpenLong | TradeAction::CloseShort | TradeAction::ReverseToLong => {
                Some(VisualDirection::Bullish)
            }
            TradeAction::OpenShort | TradeAction::CloseLong | TradeAction::ReverseToShort => {
                Some(VisualDirection::Bearish)
            }
            TradeAction::Unknown => None,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::OpenLong => "open-long",
            TradeAction::OpenShort => "open-short",
            TradeAction::CloseLong => "close-long",
            TradeAction::CloseShort => "close-short",
            TradeAction::ReverseToLong => "reverse-to-long",
            TradeAction::ReverseToShort => "reverse-to-short",
            TradeAction::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

//! Trade, drawdown and position-status markers for the price pane.
//!
//! Every marker must sit on a category that exists on the bar axis; events
//! whose timestamp is missing from the axis are dropped and reported.

use crate::domain::action::{OrderSide, TradeAction, VisualDirection};
use crate::domain::bar::BarAxis;
use crate::domain::diagnostic::{Diagnostic, EventKind};
use crate::domain::payload::RawTrade;
use crate::domain::timestamp::Timestamp;
use serde::Serialize;
use std::collections::HashSet;

pub const BUY_COLOR: &str = "#ef232a";
pub const SELL_COLOR: &str = "#14b143";
pub const DRAWDOWN_COLOR: &str = "#faad14";
pub const NEUTRAL_COLOR: &str = "#999999";

pub const LONG_STATUS: &str = "多";
pub const SHORT_STATUS: &str = "空";
pub const FLAT_STATUS: &str = "空仓";

#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    /// Position in the payload's trade list.
    pub id: usize,
    pub timestamp: Timestamp,
    pub price: f64,
    pub label: String,
    pub action: TradeAction,
    pub side: Option<OrderSide>,
    pub size: f64,
    pub resulting_position: Option<f64>,
    pub custom_label: Option<String>,
}

impl TradeEvent {
    /// Quantity shown on the marker.
    ///
    /// A reversal reports its gross fill (close 20 + open 20 = 40), so when
    /// the net position after the trade is known that is shown instead.
    pub fn display_quantity(&self) -> f64 {
        match self.resulting_position {
            Some(position)
                if self.action.is_reversal() || TradeAction::mentions_reversal(&self.label) =>
            {
                position.abs()
            }
            _ => self.size.abs(),
        }
    }

    pub fn visual_direction(&self) -> VisualDirection {
        self.action
            .visual_direction()
            .or(match self.side {
                Some(OrderSide::Buy) => Some(VisualDirection::Bullish),
                Some(OrderSide::Sell) => Some(VisualDirection::Bearish),
                None => None,
            })
            .unwrap_or(VisualDirection::Bearish)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingDirection {
    Long,
    Short,
    Unknown,
}

impl HoldingDirection {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "long" | "多" | "多头" | "buy" => HoldingDirection::Long,
            "short" | "空" | "空头" | "sell" => HoldingDirection::Short,
            _ => HoldingDirection::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownEvent {
    pub id: usize,
    pub timestamp: Timestamp,
    /// Worst price reached while the position was held.
    pub price: f64,
    pub entry_price: f64,
    pub holding_direction: HoldingDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSymbol {
    Arrow,
    Pin,
    Flag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeMarker {
    pub event_id: usize,
    pub timestamp: Timestamp,
    pub price: f64,
    pub action: TradeAction,
    pub label: String,
    pub quantity: f64,
    pub text: String,
    pub direction: VisualDirection,
    pub orientation: Orientation,
    pub symbol: MarkerSymbol,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownMarker {
    pub event_id: usize,
    pub timestamp: Timestamp,
    pub price: f64,
    pub entry_price: f64,
    pub holding_direction: HoldingDirection,
    pub symbol: MarkerSymbol,
    pub color: &'static str,
}

impl DrawdownMarker {
    pub fn loss_magnitude(&self) -> f64 {
        (self.price - self.entry_price).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusMarker {
    pub timestamp: Timestamp,
    pub price: f64,
    pub position: f64,
    pub text: String,
    pub symbol: MarkerSymbol,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marker {
    Trade(TradeMarker),
    Drawdown(DrawdownMarker),
    Status(StatusMarker),
}

impl Marker {
    pub fn timestamp(&self) -> &Timestamp {
        match self {
            Marker::Trade(m) => &m.timestamp,
            Marker::Drawdown(m) => &m.timestamp,
            Marker::Status(m) => &m.timestamp,
        }
    }
}

/// Trade events from payload rows. Rows without a date or price cannot be
/// placed and are reported as orphans.
pub fn collect_trade_events(rows: &[RawTrade], diagnostics: &mut Vec<Diagnostic>) -> Vec<TradeEvent> {
    let mut events = Vec::with_capacity(rows.len());
    for (id, row) in rows.iter().enumerate() {
        let (Some(timestamp), Some(price)) = (row.date.clone(), row.price) else {
            diagnostics.push(Diagnostic::OrphanEvent {
                kind: EventKind::Trade,
                index: id,
                timestamp: None,
            });
            continue;
        };

        let side = row.side.as_deref().and_then(OrderSide::parse);
        let raw_label = row.action.as_deref().unwrap_or_default().trim();
        let action = TradeAction::classify_with_position(raw_label, side, row.position);
        let label = if !raw_label.is_empty() {
            raw_label.to_string()
        } else {
            match side {
                Some(OrderSide::Buy) => "买入".to_string(),
                Some(OrderSide::Sell) => "卖出".to_string(),
                None => action.to_string(),
            }
        };

        events.push(TradeEvent {
            id,
            timestamp,
            price,
            label,
            action,
            side,
            size: row.size.unwrap_or(0.0),
            resulting_position: row.position,
            custom_label: row.custom_label.clone(),
        });
    }
    events
}

/// Drawdown extremes carried on trade rows. Rows without any drawdown field
/// are not drawdown events; rows with only some of them are orphans.
pub fn collect_drawdown_events(
    rows: &[RawTrade],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<DrawdownEvent> {
    let mut events = Vec::new();
    for (id, row) in rows.iter().enumerate() {
        if row.mdd_date.is_none() && row.mdd_price.is_none() {
            continue;
        }
        let entry_price = row.entry_price.or(row.price);
        let (Some(timestamp), Some(price), Some(entry_price)) =
            (row.mdd_date.clone(), row.mdd_price, entry_price)
        else {
            diagnostics.push(Diagnostic::OrphanEvent {
                kind: EventKind::Drawdown,
                index: id,
                timestamp: None,
            });
            continue;
        };

        events.push(DrawdownEvent {
            id,
            timestamp,
            price,
            entry_price,
            holding_direction: row
                .holding_direction
                .as_deref()
                .map(HoldingDirection::parse)
                .unwrap_or(HoldingDirection::Unknown),
        });
    }
    events
}

/// "20", "2.5": integral quantities print without decimals.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

pub fn resolve_trades(
    events: &[TradeEvent],
    axis: &HashSet<&Timestamp>,
    quantity_unit: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Marker> {
    events
        .iter()
        .filter(|e| on_axis(axis, &e.timestamp, EventKind::Trade, e.id, diagnostics))
        .map(|e| Marker::Trade(trade_marker(e, quantity_unit)))
        .collect()
}

fn trade_marker(event: &TradeEvent, quantity_unit: &str) -> TradeMarker {
    let quantity = event.display_quantity();
    let direction = event.visual_direction();
    let text = match &event.custom_label {
        Some(custom) => custom.clone(),
        None => format!(
            "{}\n{}{}",
            event.label,
            format_quantity(quantity),
            quantity_unit
        ),
    };
    let (orientation, color) = match direction {
        VisualDirection::Bullish => (Orientation::Up, BUY_COLOR),
        VisualDirection::Bearish => (Orientation::Down, SELL_COLOR),
    };

    TradeMarker {
        event_id: event.id,
        timestamp: event.timestamp.clone(),
        price: event.price,
        action: event.action,
        label: event.label.clone(),
        quantity,
        text,
        direction,
        orientation,
        symbol: MarkerSymbol::Arrow,
        color,
    }
}

pub fn resolve_drawdowns(
    events: &[DrawdownEvent],
    axis: &HashSet<&Timestamp>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Marker> {
    events
        .iter()
        .filter(|e| on_axis(axis, &e.timestamp, EventKind::Drawdown, e.id, diagnostics))
        .map(|e| {
            Marker::Drawdown(DrawdownMarker {
                event_id: e.id,
                timestamp: e.timestamp.clone(),
                price: e.price,
                entry_price: e.entry_price,
                holding_direction: e.holding_direction,
                symbol: MarkerSymbol::Pin,
                color: DRAWDOWN_COLOR,
            })
        })
        .collect()
}

fn on_axis(
    axis: &HashSet<&Timestamp>,
    timestamp: &Timestamp,
    kind: EventKind,
    index: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let present = axis.contains(timestamp);
    if !present {
        diagnostics.push(Diagnostic::OrphanEvent {
            kind,
            index,
            timestamp: Some(timestamp.clone()),
        });
    }
    present
}

/// Most recent event that opened or flipped a position.
pub fn latest_entry(events: &[TradeEvent]) -> Option<&TradeEvent> {
    events.iter().rev().find(|e| e.action.is_entry())
}

/// Net position after the last trade, pinned to the last bar's close.
pub fn position_status(
    axis: &BarAxis,
    events: &[TradeEvent],
    quantity_unit: &str,
) -> Option<StatusMarker> {
    let (timestamp, bar) = axis.last_bar()?;
    let position = events
        .last()
        .and_then(|e| e.resulting_position)
        .unwrap_or(0.0);

    let (text, color) = if position > 0.0 {
        (
            format!("{} {}{}", LONG_STATUS, format_quantity(position), quantity_unit),
            BUY_COLOR,
        )
    } else if position < 0.0 {
        (
            format!(
                "{} {}{}",
                SHORT_STATUS,
                format_quantity(position.abs()),
                quantity_unit
            ),
            SELL_COLOR,
        )
    } else {
        (FLAT_STATUS.to_string(), NEUTRAL_COLOR)
    };

    Some(StatusMarker {
        timestamp: timestamp.clone(),
        price: bar.close,
        position,
        text,
        symbol: MarkerSymbol::Flag,
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::{Bar, BarSlot};

    fn ts(s: &str) -> Timestamp {
        Timestamp::text(s)
    }

    fn raw(date: &str, action: &str, size: f64, position: Option<f64>) -> RawTrade {
        RawTrade {
            date: Some(ts(date)),
            price: Some(100.0),
            action: Some(action.to_string()),
            size: Some(size),
            position,
            ..RawTrade::default()
        }
    }

    fn events(rows: &[RawTrade]) -> Vec<TradeEvent> {
        let mut diags = Vec::new();
        collect_trade_events(rows, &mut diags)
    }

    fn axis_of(dates: &[&str]) -> BarAxis {
        BarAxis {
            timestamps: dates.iter().map(|d| ts(d)).collect(),
            slots: dates
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    BarSlot::Bar(Bar {
                        open: 10.0,
                        high: 12.0,
                        low: 9.0,
                        close: 11.0 + i as f64,
                        volume: None,
                    })
                })
                .collect(),
        }
    }

    fn only_trade(markers: &[Marker]) -> &TradeMarker {
        match &markers[0] {
            Marker::Trade(m) => m,
            other => panic!("expected trade marker, got {:?}", other),
        }
    }

    #[test]
    fn reversal_shows_net_position() {
        let evs = events(&[raw("d2", "反手做多", 40.0, Some(20.0))]);
        let axis = axis_of(&["d1", "d2"]);
        let mut diags = Vec::new();
        let markers = resolve_trades(&evs, &axis.timestamp_set(), "手", &mut diags);
        let m = only_trade(&markers);
        assert_eq!(m.quantity, 20.0);
        assert_eq!(m.text, "反手做多\n20手");
        assert_eq!(m.direction, VisualDirection::Bullish);
        assert_eq!(m.orientation, Orientation::Up);
        assert_eq!(m.color, BUY_COLOR);
    }

    #[test]
    fn undirected_reversal_shows_net_position() {
        let evs = events(&[
            raw("d2", "反手", 40.0, Some(20.0)),
            raw("d2", "reverse", 40.0, Some(-20.0)),
            raw("d2", "反手开仓", 40.0, Some(20.0)),
            raw("d2", "反手", 40.0, Some(0.0)),
        ]);
        let axis = axis_of(&["d1", "d2"]);
        let mut diags = Vec::new();
        let markers = resolve_trades(&evs, &axis.timestamp_set(), "手", &mut diags);
        let trades: Vec<&TradeMarker> = markers
            .iter()
            .filter_map(|m| match m {
                Marker::Trade(t) => Some(t),
                _ => None,
            })
            .collect();

        assert_eq!(trades[0].quantity, 20.0);
        assert_eq!(trades[0].text, "反手\n20手");
        assert_eq!(trades[0].direction, VisualDirection::Bullish);
        assert_eq!(trades[1].quantity, 20.0);
        assert_eq!(trades[1].direction, VisualDirection::Bearish);
        assert_eq!(trades[2].quantity, 20.0);
        assert_eq!(trades[2].color, BUY_COLOR);
        // flat afterwards: no direction to infer, still the net position
        assert_eq!(trades[3].quantity, 0.0);
    }

    #[test]
    fn reversal_without_position_shows_size() {
        let evs = events(&[raw("d1", "反手做空", -40.0, None)]);
        assert_eq!(evs[0].display_quantity(), 40.0);
    }

    #[test]
    fn non_reversal_shows_absolute_size() {
        let evs = events(&[raw("d1", "卖空", -3.0, Some(-3.0)), raw("d1", "平空", 3.0, Some(0.0))]);
        assert_eq!(evs[0].display_quantity(), 3.0);
        assert_eq!(evs[1].display_quantity(), 3.0);
    }

    #[test]
    fn bearish_markers_point_down() {
        let evs = events(&[raw("d1", "平多", -5.0, Some(0.0))]);
        let axis = axis_of(&["d1"]);
        let mut diags = Vec::new();
        let markers = resolve_trades(&evs, &axis.timestamp_set(), "", &mut diags);
        let m = only_trade(&markers);
        assert_eq!(m.orientation, Orientation::Down);
        assert_eq!(m.color, SELL_COLOR);
        assert_eq!(m.text, "平多\n5");
    }

    #[test]
    fn orphan_events_are_excluded_and_reported() {
        let evs = events(&[raw("d99", "买多", 1.0, Some(1.0)), raw("d2", "买多", 1.0, Some(2.0))]);
        let axis = axis_of(&["d1", "d2", "d3", "d4"]);
        let mut diags = Vec::new();
        let markers = resolve_trades(&evs, &axis.timestamp_set(), "手", &mut diags);
        assert_eq!(markers.len(), 1);
        assert_eq!(only_trade(&markers).event_id, 1);
        assert_eq!(
            diags,
            vec![Diagnostic::OrphanEvent {
                kind: EventKind::Trade,
                index: 0,
                timestamp: Some(ts("d99")),
            }]
        );
    }

    #[test]
    fn rows_without_date_or_price_are_orphans() {
        let rows = vec![
            RawTrade {
                price: Some(1.0),
                ..RawTrade::default()
            },
            RawTrade {
                date: Some(ts("d1")),
                ..RawTrade::default()
            },
        ];
        let mut diags = Vec::new();
        assert!(collect_trade_events(&rows, &mut diags).is_empty());
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn missing_action_uses_side_for_label_and_color() {
        let rows = vec![RawTrade {
            date: Some(ts("d1")),
            price: Some(5.0),
            side: Some("buy".into()),
            size: Some(2.0),
            ..RawTrade::default()
        }];
        let evs = events(&rows);
        assert_eq!(evs[0].label, "买入");
        assert_eq!(evs[0].visual_direction(), VisualDirection::Bullish);
    }

    #[test]
    fn custom_label_replaces_text() {
        let mut row = raw("d1", "买多", 1.0, Some(1.0));
        row.custom_label = Some("多 1手".into());
        let evs = events(&[row]);
        let axis = axis_of(&["d1"]);
        let mut diags = Vec::new();
        let markers = resolve_trades(&evs, &axis.timestamp_set(), "手", &mut diags);
        assert_eq!(only_trade(&markers).text, "多 1手");
    }

    #[test]
    fn drawdown_events_collected_and_resolved() {
        let rows = vec![
            RawTrade {
                mdd_date: Some(ts("d2")),
                mdd_price: Some(90.0),
                entry_price: Some(100.0),
                holding_direction: Some("long".into()),
                ..raw("d3", "平多", -1.0, Some(0.0))
            },
            raw("d1", "买多", 1.0, Some(1.0)),
            RawTrade {
                mdd_date: Some(ts("d9")),
                mdd_price: Some(80.0),
                ..raw("d3", "平多", -1.0, Some(0.0))
            },
        ];
        let mut diags = Vec::new();
        let dds = collect_drawdown_events(&rows, &mut diags);
        assert_eq!(dds.len(), 2);
        // entry price falls back to the trade price
        assert_eq!(dds[1].entry_price, 100.0);

        let axis = axis_of(&["d1", "d2", "d3"]);
        let markers = resolve_drawdowns(&dds, &axis.timestamp_set(), &mut diags);
        assert_eq!(markers.len(), 1);
        match &markers[0] {
            Marker::Drawdown(m) => {
                assert_eq!(m.holding_direction, HoldingDirection::Long);
                assert_eq!(m.symbol, MarkerSymbol::Pin);
                assert_eq!(m.loss_magnitude(), 10.0);
            }
            other => panic!("expected drawdown marker, got {:?}", other),
        }
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn partial_drawdown_fields_are_orphans() {
        let rows = vec![RawTrade {
            mdd_price: Some(90.0),
            ..RawTrade::default()
        }];
        let mut diags = Vec::new();
        assert!(collect_drawdown_events(&rows, &mut diags).is_empty());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn latest_entry_skips_trailing_closes() {
        let evs = events(&[
            raw("d1", "买多", 1.0, Some(1.0)),
            raw("d2", "反手做空", -2.0, Some(-1.0)),
            raw("d3", "平空", 1.0, Some(0.0)),
        ]);
        assert_eq!(latest_entry(&evs).unwrap().id, 1);
        assert!(latest_entry(&evs[2..]).is_none());
    }

    #[test]
    fn position_status_variants() {
        let axis = axis_of(&["d1", "d2"]);

        let long = events(&[raw("d1", "买多", 3.0, Some(3.0))]);
        let m = position_status(&axis, &long, "手").unwrap();
        assert_eq!(m.text, "多 3手");
        assert_eq!(m.timestamp, ts("d2"));
        assert_eq!(m.price, 12.0);
        assert_eq!(m.color, BUY_COLOR);

        let short = events(&[raw("d1", "卖空", -2.0, Some(-2.0))]);
        let m = position_status(&axis, &short, "手").unwrap();
        assert_eq!(m.text, "空 2手");
        assert_eq!(m.color, SELL_COLOR);

        let m = position_status(&axis, &[], "手").unwrap();
        assert_eq!(m.text, "空仓");
        assert_eq!(m.color, NEUTRAL_COLOR);
    }

    #[test]
    fn position_status_needs_a_bar() {
        assert!(position_status(&BarAxis::default(), &[], "").is_none());
    }

    #[test]
    fn format_quantity_trims_integral_values() {
        assert_eq!(format_quantity(20.0), "20");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(0.0), "0");
    }

    #[test]
    fn holding_direction_parse() {
        assert_eq!(HoldingDirection::parse("多"), HoldingDirection::Long);
        assert_eq!(HoldingDirection::parse("SHORT"), HoldingDirection::Short);
        assert_eq!(HoldingDirection::parse("?"), HoldingDirection::Unknown);
    }
}

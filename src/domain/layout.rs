//! Vertical split of the plot area into stacked panes.
//!
//! All values are percentages of the container height. The price pane is
//! always first and receives whatever the optional panes leave over.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneKind {
    Price,
    Volume,
    Oscillator,
    Momentum,
    Equity,
}

impl fmt::Display for PaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaneKind::Price => "price",
            PaneKind::Volume => "volume",
            PaneKind::Oscillator => "oscillator",
            PaneKind::Momentum => "momentum",
            PaneKind::Equity => "equity",
        };
        write!(f, "{}", s)
    }
}

/// Volume, oscillator, momentum and equity.
pub const OPTIONAL_PANE_COUNT: usize = 4;

/// Which optional panes have data to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanePresence {
    pub volume: bool,
    pub oscillator: bool,
    pub momentum: bool,
    pub equity: bool,
}

impl PanePresence {
    /// Optional panes in stacking order.
    pub fn optional_panes(&self) -> Vec<PaneKind> {
        [
            (self.volume, PaneKind::Volume),
            (self.oscillator, PaneKind::Oscillator),
            (self.momentum, PaneKind::Momentum),
            (self.equity, PaneKind::Equity),
        ]
        .into_iter()
        .filter_map(|(present, kind)| present.then_some(kind))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutBudget {
    /// Offset of the first pane.
    pub top: f64,
    /// Total height shared by all panes and the gaps between them.
    pub height: f64,
    pub gap: f64,
    /// Height of a single optional pane.
    pub band: f64,
    /// Upper bound on the combined height of optional panes when more than
    /// one is shown.
    pub band_share: f64,
}

impl Default for LayoutBudget {
    fn default() -> Self {
        LayoutBudget {
            top: 5.0,
            height: 85.0,
            gap: 5.0,
            band: 20.0,
            band_share: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaneRegion {
    pub kind: PaneKind,
    pub top: f64,
    pub height: f64,
}

impl PaneRegion {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Stack the price pane and every present optional pane.
///
/// With `n` optional panes each gets `min(band, band_share / n)` (a single
/// pane gets the full `band`), never more than an equal share with the price
/// pane. Gaps shrink so they never take more than half of the budget.
/// Heights plus gaps always sum to `budget.height`.
pub fn plan(presence: &PanePresence, budget: &LayoutBudget) -> Vec<PaneRegion> {
    let optional = presence.optional_panes();
    let n = optional.len() as f64;

    let gap = if optional.is_empty() {
        0.0
    } else {
        budget.gap.min(budget.height / (2.0 * n))
    };
    let available = budget.height - n * gap;
    let band = if optional.len() <= 1 {
        budget.band
    } else {
        budget.band.min(budget.band_share / n)
    };
    let band = band.min(available / (n + 1.0)).max(0.0);
    let price_height = available - n * band;

    let mut regions = Vec::with_capacity(optional.len() + 1);
    regions.push(PaneRegion {
        kind: PaneKind::Price,
        top: budget.top,
        height: price_height,
    });

    let mut cursor = budget.top + price_height;
    for kind in optional {
        cursor += gap;
        regions.push(PaneRegion {
            kind,
            top: cursor,
            height: band,
        });
        cursor += band;
    }
    regions
}

//! DKX momentum pair fallback.
//!
//! mid = (3*close + low + open + high) / 6
//! DKX[0] = mid[0], DKX[i] = (mid[i] + (p-1)*DKX[i-1]) / p
//! MADKX is the same smoothing of DKX with its own period.

use crate::domain::bar::BarSlot;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MA_PERIOD: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DkxLines {
    pub dkx: Vec<Option<f64>>,
    pub madkx: Vec<Option<f64>>,
}

pub fn calculate_dkx(slots: &[BarSlot], period: usize, ma_period: usize) -> DkxLines {
    let mids: Vec<Option<f64>> = slots
        .iter()
        .map(|s| s.bar().map(|b| b.weighted_mid()))
        .collect();
    let dkx = smooth(&mids, period);
    let madkx = smooth(&dkx, ma_period);
    DkxLines { dkx, madkx }
}

/// Wilder-style recursive smoothing; gaps pass through as `None`.
fn smooth(inputs: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let p = period.max(1) as f64;
    let mut prev: Option<f64> = None;
    inputs
        .iter()
        .map(|x| {
            let x = (*x)?;
            let cur = match prev {
                None => x,
                Some(prev) => (x + (p - 1.0) * prev) / p,
            };
            prev = Some(cur);
            Some(cur)
        })
        .collect()
}

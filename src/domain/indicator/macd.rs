//! MACD fallback (oscillator pane).
//!
//! DIF = EMA(fast) - EMA(slow)
//! DEA = EMA(signal) of DIF
//! Histogram = (DIF - DEA) * 2
//!
//! Matches the backtest service's recursive (non-adjusted) smoothing, so a
//! recomputed line lines up with a supplied one.

use crate::domain::indicator::ema::exponential_moving_average;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub dif: Vec<Option<f64>>,
    pub dea: Vec<Option<f64>>,
    pub hist: Vec<Option<f64>>,
}

pub fn calculate_macd(
    closes: &[Option<f64>],
    fast: usize,
    slow: usize,
    signal: usize,
) -> MacdLines {
    let ema_fast = exponential_moving_average(closes, fast);
    let ema_slow = exponential_moving_average(closes, slow);

    let dif: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let dea = exponential_moving_average(&dif, signal);
    let hist = dif
        .iter()
        .zip(&dea)
        .map(|(d, e)| Some(((*d)? - (*e)?) * 2.0))
        .collect();

    MacdLines { dif, dea, hist }
}

//! Simple moving average over closing prices.
//!
//! Running-sum form. Indices below the window average everything seen so far
//! so the line starts on the first bar. A gap contributes nothing to the sum
//! or the divisor, yields `None` at its own index, and still occupies its
//! position in the window.

pub fn simple_moving_average(closes: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut values = Vec::with_capacity(closes.len());
    let mut sum = 0.0;
    let mut count = 0usize;

    for (i, close) in closes.iter().enumerate() {
        if let Some(c) = close {
            sum += c;
            count += 1;
        }
        if i >= window {
            if let Some(old) = closes[i - window] {
                sum -= old;
                count -= 1;
            }
        }

        values.push(match close {
            Some(_) if count > 0 => Some(sum / count as f64),
            _ => None,
        });
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn closes(prices: &[f64]) -> Vec<Option<f64>> {
        prices.iter().copied().map(Some).collect()
    }

    fn unwrap_all(values: &[Option<f64>]) -> Vec<f64> {
        values.iter().map(|v| v.unwrap()).collect()
    }

    #[test]
    fn partial_window_then_trailing() {
        let sma = simple_moving_average(&closes(&[10.0, 11.0, 12.0, 11.0, 10.0]), 3);
        let v = unwrap_all(&sma);
        assert_relative_eq!(v[0], 10.0);
        assert_relative_eq!(v[1], 10.5);
        assert_relative_eq!(v[2], 11.0);
        assert_relative_eq!(v[3], 34.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(v[4], 11.0, epsilon = 1e-12);
    }

    #[test]
    fn window_one_is_identity() {
        let input = closes(&[3.0, 7.0, 5.0]);
        assert_eq!(simple_moving_average(&input, 1), input);
    }

    #[test]
    fn window_zero_behaves_as_one() {
        let input = closes(&[3.0, 7.0]);
        assert_eq!(simple_moving_average(&input, 0), input);
    }

    #[test]
    fn window_longer_than_series_is_cumulative_mean() {
        let sma = simple_moving_average(&closes(&[2.0, 4.0, 6.0]), 10);
        assert_eq!(unwrap_all(&sma), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn gap_yields_none_and_keeps_running_sum() {
        let input = vec![Some(10.0), None, Some(12.0), Some(14.0)];
        let sma = simple_moving_average(&input, 2);
        assert_eq!(sma.len(), 4);
        assert_eq!(sma[0], Some(10.0));
        assert_eq!(sma[1], None);
        // window [gap, 12] holds one value
        assert_eq!(sma[2], Some(12.0));
        assert_eq!(sma[3], Some(13.0));
    }

    #[test]
    fn gap_leaving_window_does_not_subtract() {
        let input = vec![None, Some(4.0), Some(6.0), Some(8.0)];
        let sma = simple_moving_average(&input, 2);
        assert_eq!(sma, vec![None, Some(4.0), Some(5.0), Some(7.0)]);
    }

    #[test]
    fn empty_input() {
        assert!(simple_moving_average(&[], 5).is_empty());
    }
}

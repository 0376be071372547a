//! Exponential moving average, recursive form.
//!
//! k = 2/(n+1), EMA[0] = x[0], EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! No warmup: the first available input seeds the average. Gaps yield `None`
//! and leave the running value untouched.

pub fn exponential_moving_average(inputs: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let k = 2.0 / (period.max(1) as f64 + 1.0);
    let mut ema: Option<f64> = None;

    inputs
        .iter()
        .map(|x| {
            let x = (*x)?;
            let next = match ema {
                None => x,
                Some(prev) => x * k + prev * (1.0 - k),
            };
            ema = Some(next);
            Some(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn seeds_with_first_value() {
        let ema = exponential_moving_average(&[Some(10.0), Some(20.0)], 3);
        assert_eq!(ema[0], Some(10.0));
        // k = 0.5
        assert_relative_eq!(ema[1].unwrap(), 15.0);
    }

    #[test]
    fn recursive_calculation() {
        let input = [Some(10.0), Some(20.0), Some(30.0), Some(40.0)];
        let ema = exponential_moving_average(&input, 3);
        let k = 0.5;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);
        assert_relative_eq!(ema[3].unwrap(), e3);
    }

    #[test]
    fn period_one_tracks_input() {
        let input = [Some(1.0), Some(5.0), Some(3.0)];
        assert_eq!(exponential_moving_average(&input, 1), input.to_vec());
    }

    #[test]
    fn gap_carries_previous_value() {
        let input = [Some(10.0), None, Some(20.0)];
        let ema = exponential_moving_average(&input, 3);
        assert_eq!(ema[1], None);
        assert_relative_eq!(ema[2].unwrap(), 15.0);
    }

    #[test]
    fn leading_gap_delays_seed() {
        let input = [None, Some(7.0)];
        assert_eq!(exponential_moving_average(&input, 5), vec![None, Some(7.0)]);
    }

    #[test]
    fn equal_prices_stay_flat() {
        let input = [Some(100.0); 6];
        for v in exponential_moving_average(&input, 4) {
            assert_relative_eq!(v.unwrap(), 100.0);
        }
    }
}

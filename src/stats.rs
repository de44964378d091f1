use statrs::statistics::Statistics;
use crate::model::{PriceSample, Trend};

pub const DAY_SECS: i64 = 24 * 60 * 60;
pub const WEEK_SECS: i64 = 7 * DAY_SECS;

// 2% dead-band around the 24h mean
const TREND_BAND: f64 = 0.02;

/// Local copy of the history, newest sample first.
pub fn sort_newest_first(history: &[PriceSample]) -> Vec<PriceSample> {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

pub fn window_prices(history: &[PriceSample], since: i64) -> Vec<f64> {
    history
        .iter()
        .filter(|s| s.timestamp >= since)
        .map(|s| s.price)
        .collect()
}

/// Arithmetic mean, or `None` for an empty window.
pub fn mean(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().mean())
}

pub fn population_std_dev(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    prices.iter().population_std_dev()
}

// Coefficient of variation
pub fn volatility(prices: &[f64], avg: f64) -> f64 {
    population_std_dev(prices) / avg
}

pub fn classify_trend(current_price: f64, avg: f64) -> Trend {
    if current_price > avg * (1.0 + TREND_BAND) {
        Trend::Up
    } else if current_price < avg * (1.0 - TREND_BAND) {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Percent change of `current_price` against the newest sample taken at or
/// before `cutoff`. `history` must be sorted newest first.
pub fn price_change_pct(current_price: f64, history: &[PriceSample], cutoff: i64) -> Option<f64> {
    let then = history.iter().find(|s| s.timestamp <= cutoff)?.price;
    if then == 0.0 {
        return None;
    }
    Some((current_price - then) / then * 100.0)
}

/// Sum of recorded sample volumes since `since`, saturating at `u64::MAX`.
pub fn volume_since(history: &[PriceSample], since: i64) -> u64 {
    history
        .iter()
        .filter(|s| s.timestamp >= since)
        .filter_map(|s| s.volume)
        .fold(0u64, |acc, v| acc.saturating_add(v))
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: i64, price: f64) -> PriceSample {
        PriceSample { timestamp, price, volume: None }
    }

    #[test]
    fn sorting_does_not_touch_input() {
        let history = vec![sample(1, 10.0), sample(3, 30.0), sample(2, 20.0)];
        let sorted = sort_newest_first(&history);

        assert_eq!(sorted.iter().map(|s| s.timestamp).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(history[0].timestamp, 1);
    }

    #[test]
    fn window_is_inclusive_of_boundary() {
        let history = vec![sample(100, 1.0), sample(99, 2.0), sample(150, 3.0)];
        assert_eq!(window_prices(&history, 100), vec![1.0, 3.0]);
    }

    #[test]
    fn empty_window_has_no_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn std_dev_is_population() {
        // population variance of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 4
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&prices) - 2.0).abs() < 1e-12);
        assert!((volatility(&prices, 5.0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn trend_dead_band() {
        assert_eq!(classify_trend(103.0, 100.0), Trend::Up);
        assert_eq!(classify_trend(101.5, 100.0), Trend::Stable);
        assert_eq!(classify_trend(98.5, 100.0), Trend::Stable);
        assert_eq!(classify_trend(97.0, 100.0), Trend::Down);
    }

    #[test]
    fn change_uses_newest_sample_before_cutoff() {
        let history = sort_newest_first(&[sample(10, 50.0), sample(20, 80.0), sample(30, 90.0)]);
        assert_eq!(price_change_pct(100.0, &history, 25), Some(25.0));
        assert_eq!(price_change_pct(100.0, &history, 5), None);
    }

    #[test]
    fn volume_sums_only_recent_known_volumes() {
        let history = vec![
            PriceSample { timestamp: 10, price: 1.0, volume: Some(500) },
            PriceSample { timestamp: 20, price: 1.0, volume: None },
            PriceSample { timestamp: 30, price: 1.0, volume: Some(700) },
        ];
        assert_eq!(volume_since(&history, 15), 700);
    }

    #[test]
    fn volume_sum_saturates() {
        let history = vec![
            PriceSample { timestamp: 10, price: 1.0, volume: Some(u64::MAX / 2) },
            PriceSample { timestamp: 20, price: 1.0, volume: Some(u64::MAX / 2) },
            PriceSample { timestamp: 30, price: 1.0, volume: Some(u64::MAX / 2) },
        ];
        assert_eq!(volume_since(&history, 0), u64::MAX);
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(9.754999), 9.75);
        assert_eq!(round2(3.14159), 3.14);
    }
}

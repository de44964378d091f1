use std::time::{SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::model::{Confidence, FlippingOpportunity, MonitoredItem, Reason, Trend};
use crate::stats::{self, DAY_SECS, WEEK_SECS};

pub const MIN_MARGIN: f64 = 2.0;
pub const GOOD_MARGIN: f64 = 5.0;
pub const EXCELLENT_MARGIN: f64 = 10.0;

pub const MIN_VOLUME: u64 = 100;
pub const GOOD_VOLUME: u64 = 1000;

pub const HIGH_VOLATILITY: f64 = 0.05;

/// Scans every item and returns the qualifying opportunities, best margin
/// first. Items with insufficient data are skipped, never reported as errors.
pub fn find_opportunities(items: &[MonitoredItem], now: i64) -> Vec<FlippingOpportunity> {
    // collect() on an indexed parallel iterator keeps scan order
    let mut opportunities: Vec<FlippingOpportunity> = items
        .par_iter()
        .filter_map(|item| analyze(item, now))
        .collect();

    // stable, so equal margins keep their scan order
    opportunities.sort_by(|a, b| b.profit_margin.total_cmp(&a.profit_margin));

    debug!(
        scanned = items.len(),
        found = opportunities.len(),
        "Opportunity scan finished"
    );

    opportunities
}

pub fn find_opportunities_now(items: &[MonitoredItem]) -> Vec<FlippingOpportunity> {
    find_opportunities(items, unix_now())
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn analyze(item: &MonitoredItem, now: i64) -> Option<FlippingOpportunity> {
    let current_price = match item.current_price {
        Some(p) if p > 0.0 => p,
        _ => {
            trace!(item_id = item.id, "Skipped: no usable current price");
            return None;
        }
    };
    if item.price_history.len() < 2 {
        trace!(item_id = item.id, "Skipped: history too short");
        return None;
    }

    let history = stats::sort_newest_first(&item.price_history);

    let prices_24h = stats::window_prices(&history, now - DAY_SECS);
    if prices_24h.len() < 2 {
        trace!(item_id = item.id, samples = prices_24h.len(), "Skipped: sparse 24h window");
        return None;
    }
    let avg_24h = stats::mean(&prices_24h)?;
    let avg_7d = stats::mean(&stats::window_prices(&history, now - WEEK_SECS));

    let potential_profit = avg_24h - current_price;
    let profit_margin = potential_profit / current_price * 100.0;

    let trend = stats::classify_trend(current_price, avg_24h);
    let volatility = stats::volatility(&prices_24h, avg_24h);

    let volume_24h = item.volume_24h.unwrap_or(0);

    if profit_margin < MIN_MARGIN || volume_24h < MIN_VOLUME {
        trace!(item_id = item.id, profit_margin, volume_24h, "Skipped: below margin or volume floor");
        return None;
    }

    let reasons = build_reasons(profit_margin, volume_24h, trend, volatility);
    if reasons.is_empty() {
        trace!(item_id = item.id, "Skipped: no qualifying signal");
        return None;
    }

    let score = confidence_score(profit_margin, volume_24h, trend, reasons.len());

    Some(FlippingOpportunity {
        item_id: item.id,
        item_name: item.display_name(),
        current_price,
        potential_profit: potential_profit.round() as i64,
        profit_margin: stats::round2(profit_margin),
        confidence: classify_confidence(score),
        trend,
        volume_24h,
        last_updated: now,
        reasons,
        avg_24h_price: avg_24h,
        avg_7d_price: avg_7d,
        volatility,
    })
}

fn build_reasons(profit_margin: f64, volume_24h: u64, trend: Trend, volatility: f64) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if profit_margin >= EXCELLENT_MARGIN {
        reasons.push(Reason::HighMargin);
    } else if profit_margin >= GOOD_MARGIN {
        reasons.push(Reason::GoodMargin);
    }

    if volume_24h >= GOOD_VOLUME {
        reasons.push(Reason::HighVolume);
    }

    if trend == Trend::Up {
        reasons.push(Reason::UpwardTrend);
    } else if trend == Trend::Down && profit_margin > GOOD_MARGIN {
        reasons.push(Reason::BelowAverage);
    }

    if volatility > HIGH_VOLATILITY {
        reasons.push(Reason::HighVolatility);
    }

    reasons
}

/// Weighted sum of margin, liquidity, trend and signal count. The margin
/// term is not clamped, so an outsized margin can dominate.
pub fn confidence_score(profit_margin: f64, volume_24h: u64, trend: Trend, reason_count: usize) -> f64 {
    let margin_score = profit_margin / EXCELLENT_MARGIN * 0.4;
    let volume_score = (volume_24h as f64 / GOOD_VOLUME as f64).min(1.0) * 0.3;
    let trend_score = match trend {
        Trend::Up => 0.2,
        Trend::Stable => 0.1,
        Trend::Down => 0.0,
    };
    let signal_score = reason_count as f64 / 3.0 * 0.1;

    margin_score + volume_score + trend_score + signal_score
}

pub fn classify_confidence(score: f64) -> Confidence {
    if score > 0.7 {
        Confidence::High
    } else if score > 0.4 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

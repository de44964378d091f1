use std::fmt::Write;

use crate::model::{FlippingOpportunity, FlippingStats, MonitoredItem};
use crate::stats::{self, DAY_SECS, WEEK_SECS};

pub fn format_gp(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let value = value.abs();
    let body = if value >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    };
    format!("{sign}{body}")
}

fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) => format!("{:+.2}%", c),
        None => "n/a".to_string(),
    }
}

pub fn render_opportunities(opportunities: &[FlippingOpportunity], limit: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<28} {:>10} {:>10} {:>8} {:>10} {:<6} {:<7} REASONS",
        "ITEM", "PRICE", "PROFIT", "MARGIN", "VOL 24H", "CONF", "TREND"
    );

    let shown = limit.unwrap_or(opportunities.len());
    for opp in opportunities.iter().take(shown) {
        let reasons: Vec<String> = opp.reasons.iter().map(|r| r.to_string()).collect();
        let _ = writeln!(
            out,
            "{:<28} {:>10} {:>10} {:>7.2}% {:>10} {:<6} {:<7} {}",
            truncate(&opp.item_name, 28),
            format_gp(opp.current_price),
            format_gp(opp.potential_profit as f64),
            opp.profit_margin,
            format_gp(opp.volume_24h as f64),
            opp.confidence.to_string(),
            opp.trend.to_string(),
            reasons.join(", "),
        );
    }

    if shown < opportunities.len() {
        let _ = writeln!(out, "... {} more", opportunities.len() - shown);
    }
    out
}

pub fn render_stats(stats: &FlippingStats) -> String {
    format!(
        "{} opportunities | avg margin {:.2}% | avg profit {} | high {} / medium {} / low {}",
        stats.total_opportunities,
        stats.avg_profit_margin,
        format_gp(stats.avg_potential_profit as f64),
        stats.high_confidence_count,
        stats.medium_confidence_count,
        stats.low_confidence_count,
    )
}

/// Watchlist overview: current price with 24h and 7d change.
pub fn render_items(items: &[MonitoredItem], now: i64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>7} {:<28} {:>10} {:>9} {:>9}", "ID", "ITEM", "PRICE", "24H", "7D");

    for item in items {
        let history = stats::sort_newest_first(&item.price_history);
        let (price, change_24h, change_7d) = match item.current_price {
            Some(p) => (
                format_gp(p),
                stats::price_change_pct(p, &history, now - DAY_SECS),
                stats::price_change_pct(p, &history, now - WEEK_SECS),
            ),
            None => ("n/a".to_string(), None, None),
        };
        let _ = writeln!(
            out,
            "{:>7} {:<28} {:>10} {:>9} {:>9}",
            item.id,
            truncate(&item.display_name(), 28),
            price,
            format_change(change_24h),
            format_change(change_7d),
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}~")
    }
}

use crate::model::{Confidence, FlippingOpportunity, FlippingStats};
use crate::stats::round2;

/// Reduces a list of opportunities to display totals. All zero when empty.
pub fn summarize(opportunities: &[FlippingOpportunity]) -> FlippingStats {
    if opportunities.is_empty() {
        return FlippingStats::default();
    }

    let n = opportunities.len() as f64;
    let total_margin: f64 = opportunities.iter().map(|o| o.profit_margin).sum();
    let total_profit: i64 = opportunities.iter().map(|o| o.potential_profit).sum();

    let count = |c: Confidence| opportunities.iter().filter(|o| o.confidence == c).count();

    FlippingStats {
        total_opportunities: opportunities.len(),
        avg_profit_margin: round2(total_margin / n),
        avg_potential_profit: (total_profit as f64 / n).round() as i64,
        high_confidence_count: count(Confidence::High),
        medium_confidence_count: count(Confidence::Medium),
        low_confidence_count: count(Confidence::Low),
    }
}

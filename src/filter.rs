use crate::model::{FilterCriteria, FlippingOpportunity};

/// Keeps the opportunities matching every criterion, in their original order.
/// An empty confidence or trend list leaves that dimension unconstrained.
pub fn filter_opportunities(
    opportunities: &[FlippingOpportunity],
    criteria: &FilterCriteria,
) -> Vec<FlippingOpportunity> {
    opportunities
        .iter()
        .filter(|opp| matches(opp, criteria))
        .cloned()
        .collect()
}

pub fn matches(opp: &FlippingOpportunity, criteria: &FilterCriteria) -> bool {
    if let Some(min) = criteria.min_profit_margin {
        if opp.profit_margin < min {
            return false;
        }
    }

    if let Some(min) = criteria.min_volume {
        if opp.volume_24h < min {
            return false;
        }
    }

    let confidence_ok = criteria.confidence.is_empty() || criteria.confidence.contains(&opp.confidence);
    let trend_ok = criteria.trend.is_empty() || criteria.trend.contains(&opp.trend);

    confidence_ok && trend_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Confidence, Reason, Trend};

    fn opp(item_id: u32, profit_margin: f64, volume_24h: u64, confidence: Confidence, trend: Trend) -> FlippingOpportunity {
        FlippingOpportunity {
            item_id,
            item_name: format!("Item {item_id}"),
            current_price: 100.0,
            potential_profit: profit_margin.round() as i64,
            profit_margin,
            confidence,
            trend,
            volume_24h,
            last_updated: 0,
            reasons: vec![Reason::GoodMargin],
            avg_24h_price: 100.0 + profit_margin,
            avg_7d_price: None,
            volatility: 0.0,
        }
    }

    fn sample() -> Vec<FlippingOpportunity> {
        vec![
            opp(1, 15.0, 2000, Confidence::High, Trend::Down),
            opp(2, 8.0, 300, Confidence::Medium, Trend::Stable),
            opp(3, 5.0, 1000, Confidence::Low, Trend::Down),
            opp(4, 3.0, 150, Confidence::Low, Trend::Stable),
        ]
    }

    fn ids(opps: &[FlippingOpportunity]) -> Vec<u32> {
        opps.iter().map(|o| o.item_id).collect()
    }

    #[test]
    fn no_criteria_is_identity() {
        let opps = sample();
        assert_eq!(filter_opportunities(&opps, &FilterCriteria::default()), opps);
    }

    #[test]
    fn bounds_are_inclusive() {
        let criteria = FilterCriteria {
            min_profit_margin: Some(5.0),
            min_volume: Some(1000),
            ..Default::default()
        };
        assert_eq!(ids(&filter_opportunities(&sample(), &criteria)), vec![1, 3]);
    }

    #[test]
    fn allow_lists_combine() {
        let criteria = FilterCriteria {
            confidence: vec![Confidence::Low, Confidence::Medium],
            trend: vec![Trend::Stable],
            ..Default::default()
        };
        assert_eq!(ids(&filter_opportunities(&sample(), &criteria)), vec![2, 4]);
    }

    #[test]
    fn empty_allow_list_is_unconstrained() {
        let criteria = FilterCriteria {
            min_profit_margin: Some(6.0),
            confidence: vec![],
            trend: vec![],
            ..Default::default()
        };
        assert_eq!(ids(&filter_opportunities(&sample(), &criteria)), vec![1, 2]);
    }
}

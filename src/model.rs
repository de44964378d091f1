use serde::{Serialize, Deserialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: i64,  // seconds since epoch
    pub price: f64,
    #[serde(default)]
    pub volume: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoredItem {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub current_price: Option<f64>,
    pub volume_24h: Option<u64>,
    #[serde(default)]
    pub price_history: Vec<PriceSample>,  // unordered, may hold duplicates
}

impl MonitoredItem {
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Item {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Reason {
    #[serde(rename = "high margin")]
    #[strum(serialize = "high margin")]
    HighMargin,
    #[serde(rename = "good margin")]
    #[strum(serialize = "good margin")]
    GoodMargin,
    #[serde(rename = "high trading volume")]
    #[strum(serialize = "high trading volume")]
    HighVolume,
    #[serde(rename = "upward trend")]
    #[strum(serialize = "upward trend")]
    UpwardTrend,
    #[serde(rename = "price below average (buy opportunity)")]
    #[strum(serialize = "price below average (buy opportunity)")]
    BelowAverage,
    #[serde(rename = "high volatility (more opportunities)")]
    #[strum(serialize = "high volatility (more opportunities)")]
    HighVolatility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlippingOpportunity {
    pub item_id: u32,
    pub item_name: String,
    pub current_price: f64,
    pub potential_profit: i64,
    pub profit_margin: f64,  // percent, 2 decimals
    pub confidence: Confidence,
    pub trend: Trend,
    pub volume_24h: u64,
    pub last_updated: i64,
    pub reasons: Vec<Reason>,

    pub avg_24h_price: f64,
    pub avg_7d_price: Option<f64>,  // None when the 7 day window is empty
    pub volatility: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlippingStats {
    pub total_opportunities: usize,
    pub avg_profit_margin: f64,
    pub avg_potential_profit: i64,
    pub high_confidence_count: usize,
    pub medium_confidence_count: usize,
    pub low_confidence_count: usize,
}

/// Optional post-filter constraints. An empty allow-list means the
/// dimension is unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_profit_margin: Option<f64>,
    pub min_volume: Option<u64>,
    #[serde(default)]
    pub confidence: Vec<Confidence>,
    #[serde(default)]
    pub trend: Vec<Trend>,
}

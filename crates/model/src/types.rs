use serde::{Deserialize, Serialize};

/// One enriched apartment transaction row.
///
/// Prices are in manwon for the 84m² standard unit (국평), the basis every
/// ranking and comparison in the dashboard uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// District name, e.g. "강남구".
    pub district: String,

    /// Deal month as YYYYMM, e.g. 202412.
    pub period: u32,

    /// Trade price in manwon.
    pub price: f64,

    /// Apartment complex name, when the row is complex-level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_year: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_count: Option<u32>,
}

/// One row of the district price ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub district: String,

    /// Mean 84m² price over the ranked month, manwon.
    pub avg_price: f64,

    /// 1-based position after the descending price sort.
    pub rank: usize,
}

/// One of the five contiguous rank-based price buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quintile {
    /// Bucket index, 1 (most expensive) through 5.
    pub bucket: u8,

    /// Member districts in rank order.
    pub districts: Vec<String>,

    pub price_min: f64,
    pub price_max: f64,

    /// Display label, e.g. "1구간".
    pub label: String,

    /// Display description, e.g. "상위 20%".
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Chat history entry. History is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Latest-month market figures, used for greetings and the generic
/// context fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Deal month as YYYYMM.
    pub period: u32,

    /// City-wide mean 84m² price, manwon.
    pub avg_price: f64,
}

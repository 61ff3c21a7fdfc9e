use marble_model::{format_price_eok, RankingEntry};
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_TOLERANCE_PCT: f64 = 15.0;

pub const MAX_COMPARISON_RESULTS: usize = 6;

/// One district inside the similar-price window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarDistrict {
    pub district: String,
    pub price: f64,
    pub rank: usize,

    /// Signed percent difference from the target price.
    pub diff_pct: f64,

    /// 100 − |diff_pct|; higher is closer.
    pub similarity: f64,
}

/// Result of a similar-price search. Missing targets and empty windows
/// produce an empty match list with a displayable summary, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPriceResult {
    pub target_district: String,
    pub target_price: Option<f64>,

    /// Inclusive price window, when the target was found.
    pub price_window: Option<(f64, f64)>,

    /// Matches sorted descending by similarity, capped at `max_results`.
    pub matches: Vec<SimilarDistrict>,

    pub summary: String,
}

impl SimilarPriceResult {
    pub fn district_names(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.district.clone()).collect()
    }

    fn missing_target(target: &str) -> Self {
        SimilarPriceResult {
            target_district: target.to_string(),
            target_price: None,
            price_window: None,
            matches: Vec::new(),
            summary: format!("{target} is not in the current ranking"),
        }
    }
}

/// Find districts whose price lies within ±`tolerance_pct` of the target's.
///
/// The window is inclusive on both bounds. The target itself is excluded.
/// Matches are sorted by similarity descending and truncated to
/// `max_results`.
pub fn find_similar_price(
    target: &str,
    ranking: &[RankingEntry],
    tolerance_pct: f64,
    max_results: usize,
) -> SimilarPriceResult {
    let Some(target_entry) = ranking.iter().find(|e| e.district == target) else {
        log::warn!("similar-price target {target} not found in ranking");
        return SimilarPriceResult::missing_target(target);
    };

    let target_price = target_entry.avg_price;
    let price_min = target_price * (1.0 - tolerance_pct / 100.0);
    let price_max = target_price * (1.0 + tolerance_pct / 100.0);

    let mut matches: Vec<SimilarDistrict> = ranking
        .iter()
        .filter(|e| e.district != target)
        .filter(|e| e.avg_price >= price_min && e.avg_price <= price_max)
        .map(|e| {
            let diff_pct = (e.avg_price - target_price) / target_price * 100.0;
            SimilarDistrict {
                district: e.district.clone(),
                price: e.avg_price,
                rank: e.rank,
                diff_pct,
                similarity: 100.0 - diff_pct.abs(),
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    matches.truncate(max_results);

    let summary = if matches.is_empty() {
        format!(
            "no districts within ±{tolerance_pct:.0}% of {target} ({})",
            format_price_eok(target_price)
        )
    } else {
        format!(
            "{} districts within ±{tolerance_pct:.0}% of {target} ({}, rank {})",
            matches.len(),
            format_price_eok(target_price),
            target_entry.rank
        )
    };

    SimilarPriceResult {
        target_district: target.to_string(),
        target_price: Some(target_price),
        price_window: Some((price_min, price_max)),
        matches,
        summary,
    }
}

use crate::error::{AnalyticsError, Result};
use marble_model::{MarketSnapshot, Quintile, RankingEntry, TransactionRecord};
use std::cmp::Ordering;
use std::collections::HashMap;

/// The ranking keeps the top 25 districts; Seoul has exactly 25, so in
/// practice this is the full table.
pub const MAX_RANKED_DISTRICTS: usize = 25;

pub const QUINTILE_COUNT: usize = 5;

/// Compute the district price ranking for one deal month.
///
/// Records are filtered to `period`, grouped by district in first-appearance
/// order, averaged, then stable-sorted descending by price. Ties keep the
/// first-appearance order. Ranks are 1-based positions after the sort.
pub fn compute_ranking(records: &[TransactionRecord], period: u32) -> Vec<RankingEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();

    for record in records.iter().filter(|r| r.period == period) {
        let entry = sums.entry(record.district.as_str()).or_insert_with(|| {
            order.push(record.district.as_str());
            (0.0, 0)
        });
        entry.0 += record.price;
        entry.1 += 1;
    }

    let mut ranking: Vec<RankingEntry> = order
        .into_iter()
        .map(|district| {
            let (sum, count) = sums[district];
            RankingEntry {
                district: district.to_string(),
                avg_price: sum / count as f64,
                rank: 0,
            }
        })
        .collect();

    // Stable sort: equal prices keep first-appearance order.
    ranking.sort_by(|a, b| {
        b.avg_price
            .partial_cmp(&a.avg_price)
            .unwrap_or(Ordering::Equal)
    });
    ranking.truncate(MAX_RANKED_DISTRICTS);

    for (i, entry) in ranking.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    log::debug!(
        "computed ranking for period {}: {} districts",
        period,
        ranking.len()
    );
    ranking
}

/// Partition a ranking into five contiguous rank-order buckets.
///
/// Bucket size is ⌈N/5⌉; when N is not divisible by 5 the last bucket takes
/// the remainder. For the standard 25-district ranking this yields exactly
/// five buckets of five.
pub fn compute_quintiles(ranking: &[RankingEntry]) -> Vec<Quintile> {
    if ranking.is_empty() {
        return Vec::new();
    }

    let bucket_size = ranking.len().div_ceil(QUINTILE_COUNT);
    ranking
        .chunks(bucket_size)
        .enumerate()
        .map(|(i, chunk)| {
            let price_min = chunk.iter().map(|e| e.avg_price).fold(f64::INFINITY, f64::min);
            let price_max = chunk
                .iter()
                .map(|e| e.avg_price)
                .fold(f64::NEG_INFINITY, f64::max);
            Quintile {
                bucket: (i + 1) as u8,
                districts: chunk.iter().map(|e| e.district.clone()).collect(),
                price_min,
                price_max,
                label: format!("{}구간", i + 1),
                description: format!("상위 {}%", 20 * (i + 1)),
            }
        })
        .collect()
}

/// One row of a percentile reference table: everything priced at or above
/// `threshold_price` sits in the top `percentile` percent.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PercentileBand {
    pub threshold_price: f64,
    pub percentile: f64,
}

/// Find the top-percentile band a price falls into.
///
/// Returns the smallest percentile whose threshold is at or below the price,
/// 100 when the price is below every threshold, and `None` for an empty
/// table.
pub fn percentile_rank(price_manwon: f64, bands: &[PercentileBand]) -> Option<f64> {
    if bands.is_empty() {
        return None;
    }
    let best = bands
        .iter()
        .filter(|band| band.threshold_price <= price_manwon)
        .map(|band| band.percentile)
        .fold(f64::INFINITY, f64::min);
    if best.is_finite() {
        Some(best)
    } else {
        Some(100.0)
    }
}

/// Latest deal month in the dataset and its city-wide mean price.
pub fn latest_snapshot(records: &[TransactionRecord]) -> Result<MarketSnapshot> {
    let period = records
        .iter()
        .map(|r| r.period)
        .max()
        .ok_or(AnalyticsError::EmptyDataset)?;

    let prices: Vec<f64> = records
        .iter()
        .filter(|r| r.period == period)
        .map(|r| r.price)
        .collect();
    if prices.is_empty() {
        return Err(AnalyticsError::EmptyPeriod(period));
    }

    Ok(MarketSnapshot {
        period,
        avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
    })
}

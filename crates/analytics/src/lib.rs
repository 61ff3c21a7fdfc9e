mod adjacent;
mod error;
mod ranking;
mod similar;

pub use adjacent::{find_adjacent, neighbors_report, AdjacentResult, ComparisonReport,
    ComparisonRow, DistrictBoundary, MAX_ADJACENT};
pub use error::{AnalyticsError, Result};
pub use ranking::{
    compute_quintiles, compute_ranking, latest_snapshot, percentile_rank, PercentileBand,
    MAX_RANKED_DISTRICTS, QUINTILE_COUNT,
};
pub use similar::{
    find_similar_price, SimilarDistrict, SimilarPriceResult, DEFAULT_TOLERANCE_PCT,
    MAX_COMPARISON_RESULTS,
};

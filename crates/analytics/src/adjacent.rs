use geo::{Intersects, MultiPolygon};
use marble_model::RankingEntry;
use serde::Serialize;
use std::cmp::Ordering;

/// Adjacency results are capped so the comparison view stays readable.
pub const MAX_ADJACENT: usize = 6;

/// District boundary geometry, as dissolved by the upstream loader.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictBoundary {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Result of an adjacency search. A missing target produces an empty list
/// with a displayable summary, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacentResult {
    pub target_district: String,

    /// Neighbor names in boundary-iteration order, capped at
    /// [`MAX_ADJACENT`].
    pub districts: Vec<String>,

    pub summary: String,
}

/// Find districts whose boundary intersects the target's.
///
/// Intersection subsumes touching, so shared borders count. The target is
/// excluded; order is whatever the boundary slice yields.
pub fn find_adjacent(target: &str, boundaries: &[DistrictBoundary]) -> AdjacentResult {
    let Some(target_boundary) = boundaries.iter().find(|b| b.name == target) else {
        log::warn!("adjacency target {target} not found in boundary set");
        return AdjacentResult {
            target_district: target.to_string(),
            districts: Vec::new(),
            summary: format!("{target} is not in the boundary set"),
        };
    };

    let mut districts: Vec<String> = Vec::new();
    for boundary in boundaries {
        if boundary.name == target {
            continue;
        }
        if target_boundary.geometry.intersects(&boundary.geometry) {
            districts.push(boundary.name.clone());
            if districts.len() == MAX_ADJACENT {
                break;
            }
        }
    }

    let summary = if districts.is_empty() {
        format!("no districts adjacent to {target}")
    } else {
        format!(
            "{} districts adjacent to {target}: {}",
            districts.len(),
            districts.join(", ")
        )
    };

    AdjacentResult {
        target_district: target.to_string(),
        districts,
        summary,
    }
}

/// One row of a neighbor comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub district: String,
    pub rank: usize,
    pub price: f64,
    pub is_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub target_district: String,
    pub rows: Vec<ComparisonRow>,
    pub summary: String,
}

/// Join an adjacency result against the ranking: target row first, then
/// neighbors by price descending. Districts absent from the ranking are
/// skipped.
pub fn neighbors_report(
    target: &str,
    adjacent: &[String],
    ranking: &[RankingEntry],
) -> ComparisonReport {
    let row_for = |name: &str, is_target: bool| {
        ranking
            .iter()
            .find(|e| e.district == name)
            .map(|e| ComparisonRow {
                district: e.district.clone(),
                rank: e.rank,
                price: e.avg_price,
                is_target,
            })
    };

    let mut neighbor_rows: Vec<ComparisonRow> = adjacent
        .iter()
        .filter_map(|name| row_for(name, false))
        .collect();
    neighbor_rows.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal));

    let mut rows = Vec::with_capacity(neighbor_rows.len() + 1);
    if let Some(target_row) = row_for(target, true) {
        rows.push(target_row);
    }
    rows.extend(neighbor_rows);

    let summary = if adjacent.is_empty() {
        format!("no adjacent districts found for {target}")
    } else {
        format!(
            "{target} compared against {} adjacent districts: {}",
            adjacent.len(),
            adjacent.join(", ")
        )
    };

    ComparisonReport {
        target_district: target.to_string(),
        rows,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    /// Unit squares on a horizontal strip: square(0) and square(1) share an
    /// edge, square(0) and square(2) are disjoint.
    fn square(name: &str, offset: f64) -> DistrictBoundary {
        let poly = polygon![
            (x: offset, y: 0.0),
            (x: offset + 1.0, y: 0.0),
            (x: offset + 1.0, y: 1.0),
            (x: offset, y: 1.0),
        ];
        DistrictBoundary {
            name: name.to_string(),
            geometry: MultiPolygon(vec![poly]),
        }
    }

    #[test]
    fn test_touching_boundaries_are_adjacent() {
        let boundaries = vec![
            square("중구", 0.0),
            square("종로구", 1.0),
            square("노원구", 5.0),
        ];
        let result = find_adjacent("중구", &boundaries);

        assert_eq!(result.districts, vec!["종로구"]);
        assert!(result.summary.contains("중구"));
    }

    #[test]
    fn test_target_excluded_and_capped() {
        // Eight squares all overlapping the target; only six survive the cap.
        let mut boundaries = vec![square("중구", 0.0)];
        for i in 0..8 {
            boundaries.push(square(&format!("구{i}"), 0.5));
        }
        let result = find_adjacent("중구", &boundaries);

        assert_eq!(result.districts.len(), MAX_ADJACENT);
        assert!(!result.districts.contains(&"중구".to_string()));
        // Discovery order is iteration order.
        assert_eq!(result.districts[0], "구0");
    }

    #[test]
    fn test_missing_target_is_empty_with_message() {
        let result = find_adjacent("부산구", &[square("중구", 0.0)]);

        assert!(result.districts.is_empty());
        assert!(result.summary.contains("부산구"));
    }

    #[test]
    fn test_neighbors_report_target_first_then_price_desc() {
        let ranking = vec![
            RankingEntry { district: "강남구".into(), avg_price: 15_000.0, rank: 1 },
            RankingEntry { district: "서초구".into(), avg_price: 14_000.0, rank: 2 },
            RankingEntry { district: "송파구".into(), avg_price: 12_000.0, rank: 3 },
        ];
        let adjacent = vec!["송파구".to_string(), "서초구".to_string()];
        let report = neighbors_report("강남구", &adjacent, &ranking);

        assert_eq!(report.rows.len(), 3);
        assert!(report.rows[0].is_target);
        assert_eq!(report.rows[0].district, "강남구");
        assert_eq!(report.rows[1].district, "서초구");
        assert_eq!(report.rows[2].district, "송파구");
    }
}

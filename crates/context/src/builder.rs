use marble_model::{
    format_period, format_price_eok, MarketSnapshot, Quintile, TransactionRecord,
};
use marble_session::ComparisonMode;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Mode-specific data bundle behind the context paragraph. One variant per
/// view stage, each carrying exactly the fields its paragraph needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeContext {
    Overview(OverviewContext),
    Ranking(RankingContext),
    District(DistrictContext),
    Comparison(ComparisonContext),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewContext {
    pub seoul_avg_price: f64,
    pub total_districts: usize,
    /// (district, price) for the ranking extremes.
    pub highest: (String, f64),
    pub lowest: (String, f64),
    pub top5: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingContext {
    pub quintiles: Vec<Quintile>,
    /// Currently highlighted bucket, if any.
    pub selected: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistrictContext {
    pub district: String,
    pub rank: usize,
    pub price: f64,
    pub apt_info: Option<AptInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonContext {
    pub district: String,
    pub rank: usize,
    pub price: f64,
    pub mode: ComparisonMode,
    pub partner_count: usize,
}

/// Per-district apartment stock aggregates. Every field is optional; absent
/// values are simply omitted from the paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AptInfo {
    pub total_complexes: Option<usize>,
    pub total_households: Option<u64>,
    pub avg_build_year: Option<f64>,
    pub price_range: Option<(f64, f64)>,
}

/// Assemble the plain-text paragraph describing what the user currently
/// sees, to be prepended to their question. `None` falls back to the
/// one-line latest-average summary.
pub fn build_context(mode: Option<&ModeContext>, snapshot: &MarketSnapshot) -> String {
    let Some(mode) = mode else {
        return format!(
            "Seoul 84m² average trade price for {}: {}",
            format_period(snapshot.period),
            format_price_eok(snapshot.avg_price)
        );
    };

    match mode {
        ModeContext::Overview(ctx) => overview_text(ctx, snapshot),
        ModeContext::Ranking(ctx) => ranking_text(ctx, snapshot),
        ModeContext::District(ctx) => district_text(ctx),
        ModeContext::Comparison(ctx) => comparison_text(ctx),
    }
}

fn overview_text(ctx: &OverviewContext, snapshot: &MarketSnapshot) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Current mode: Seoul overview");
    let _ = writeln!(text, "Reference month: {}", format_period(snapshot.period));
    let _ = writeln!(
        text,
        "Seoul average trade price: {}",
        format_price_eok(ctx.seoul_avg_price)
    );
    let _ = writeln!(text, "Districts ranked: {}", ctx.total_districts);
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "Highest: {} ({})",
        ctx.highest.0,
        format_price_eok(ctx.highest.1)
    );
    let _ = writeln!(
        text,
        "Lowest: {} ({})",
        ctx.lowest.0,
        format_price_eok(ctx.lowest.1)
    );
    let _ = writeln!(text, "Top 5 districts: {}", ctx.top5.join(", "));
    let _ = write!(
        text,
        "\nThe user is viewing the city-wide overview and may ask about \
         overall market trends."
    );
    text
}

fn ranking_text(ctx: &RankingContext, snapshot: &MarketSnapshot) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Current mode: price quintile analysis");
    let _ = writeln!(text, "Reference month: {}", format_period(snapshot.period));
    let _ = writeln!(text, "Quintile buckets: {}", ctx.quintiles.len());
    let _ = writeln!(text);
    let _ = write!(text, "Bucket breakdown:");
    for q in &ctx.quintiles {
        let _ = write!(
            text,
            "\n- {} ({}): {} ~ {}, {} districts",
            q.label,
            q.description,
            format_price_eok(q.price_min),
            format_price_eok(q.price_max),
            q.districts.len()
        );
    }

    if let Some(selected) = ctx.selected {
        if let Some(q) = ctx.quintiles.iter().find(|q| q.bucket == selected) {
            let _ = write!(text, "\n\nSelected bucket: {} ({})", q.label, q.description);
            let _ = write!(
                text,
                "\n- price range: {} ~ {}",
                format_price_eok(q.price_min),
                format_price_eok(q.price_max)
            );
            let _ = write!(text, "\n- districts: {}", q.districts.join(", "));
        }
    }

    let _ = write!(
        text,
        "\n\nThe user is viewing the quintile breakdown and may ask about \
         specific buckets or price bands."
    );
    text
}

fn district_text(ctx: &DistrictContext) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Current mode: district detail");
    let _ = writeln!(text, "Selected district: {}", ctx.district);
    let _ = writeln!(text, "Seoul price rank: {} of 25", ctx.rank);
    let _ = write!(
        text,
        "84m² average trade price: {}",
        format_price_eok(ctx.price)
    );

    if let Some(info) = &ctx.apt_info {
        if let Some(complexes) = info.total_complexes {
            let _ = write!(text, "\nApartment complexes: {complexes}");
        }
        if let Some(households) = info.total_households {
            let _ = write!(text, "\nTotal households: {households}");
        }
        if let Some(year) = info.avg_build_year {
            let _ = write!(text, "\nAverage build year: {year:.0}");
        }
        if let Some((min, max)) = info.price_range {
            let _ = write!(
                text,
                "\nPrice range: {} ~ {}",
                format_price_eok(min),
                format_price_eok(max)
            );
        }
    }

    let _ = write!(
        text,
        "\n\nThe user is viewing {} in detail and may ask about its \
         character, value or surroundings.",
        ctx.district
    );
    text
}

fn comparison_text(ctx: &ComparisonContext) -> String {
    let mode_label = match ctx.mode {
        ComparisonMode::Adjacent => "adjacent districts",
        ComparisonMode::SimilarPrice => "similar price band",
    };

    let mut text = String::new();
    let _ = writeln!(text, "Current mode: district comparison");
    let _ = writeln!(text, "Base district: {}", ctx.district);
    let _ = writeln!(text, "Base district rank: {} of 25", ctx.rank);
    let _ = writeln!(
        text,
        "Base district price: {}",
        format_price_eok(ctx.price)
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "Comparison basis: {mode_label}");
    let _ = write!(text, "Comparison partners: {} districts", ctx.partner_count);
    let _ = write!(
        text,
        "\n\nThe user is comparing {} against other districts and may ask \
         about alternatives with a similar profile.",
        ctx.district
    );
    text
}

/// Aggregate a district's apartment stock from raw records.
///
/// Complexes are counted distinct by name; household counts are taken once
/// per complex before summing, matching the upstream dedup rule. Returns
/// `None` when the district has no rows.
pub fn district_apt_info(records: &[TransactionRecord], district: &str) -> Option<AptInfo> {
    let rows: Vec<&TransactionRecord> =
        records.iter().filter(|r| r.district == district).collect();
    if rows.is_empty() {
        return None;
    }

    let mut households_per_complex: HashMap<&str, u64> = HashMap::new();
    for row in &rows {
        if let (Some(complex), Some(count)) = (row.complex.as_deref(), row.household_count) {
            households_per_complex
                .entry(complex)
                .or_insert(u64::from(count));
        }
    }

    let total_complexes = {
        let mut names: Vec<&str> = rows.iter().filter_map(|r| r.complex.as_deref()).collect();
        names.sort_unstable();
        names.dedup();
        if names.is_empty() {
            None
        } else {
            Some(names.len())
        }
    };

    let total_households = if households_per_complex.is_empty() {
        None
    } else {
        Some(households_per_complex.values().sum())
    };

    let build_years: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.build_year)
        .map(f64::from)
        .collect();
    let avg_build_year = if build_years.is_empty() {
        None
    } else {
        Some(build_years.iter().sum::<f64>() / build_years.len() as f64)
    };

    let price_min = rows.iter().map(|r| r.price).fold(f64::INFINITY, f64::min);
    let price_max = rows
        .iter()
        .map(|r| r.price)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(AptInfo {
        total_complexes,
        total_households,
        avg_build_year,
        price_range: Some((price_min, price_max)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            period: 202412,
            avg_price: 125_000.0,
        }
    }

    #[test]
    fn test_no_mode_falls_back_to_one_liner() {
        let text = build_context(None, &snapshot());

        assert_eq!(
            text,
            "Seoul 84m² average trade price for 2024-12: 12.5억원"
        );
    }

    #[test]
    fn test_overview_paragraph() {
        let ctx = ModeContext::Overview(OverviewContext {
            seoul_avg_price: 125_000.0,
            total_districts: 25,
            highest: ("강남구".into(), 240_000.0),
            lowest: ("도봉구".into(), 59_000.0),
            top5: vec![
                "강남구".into(),
                "서초구".into(),
                "송파구".into(),
                "용산구".into(),
                "성동구".into(),
            ],
        });
        let text = build_context(Some(&ctx), &snapshot());

        assert!(text.starts_with("Current mode: Seoul overview"));
        assert!(text.contains("Highest: 강남구 (24.0억원)"));
        assert!(text.contains("Lowest: 도봉구 (5.9억원)"));
        assert!(text.contains("Top 5 districts: 강남구, 서초구"));
    }

    #[test]
    fn test_ranking_paragraph_lists_selected_bucket() {
        let quintiles = vec![
            Quintile {
                bucket: 1,
                districts: vec!["강남구".into(), "서초구".into()],
                price_min: 200_000.0,
                price_max: 240_000.0,
                label: "1구간".into(),
                description: "상위 20%".into(),
            },
            Quintile {
                bucket: 2,
                districts: vec!["마포구".into()],
                price_min: 120_000.0,
                price_max: 150_000.0,
                label: "2구간".into(),
                description: "상위 40%".into(),
            },
        ];
        let ctx = ModeContext::Ranking(RankingContext {
            quintiles,
            selected: Some(2),
        });
        let text = build_context(Some(&ctx), &snapshot());

        assert!(text.contains("- 1구간 (상위 20%)"));
        assert!(text.contains("Selected bucket: 2구간 (상위 40%)"));
        assert!(text.contains("districts: 마포구"));
    }

    #[test]
    fn test_district_paragraph_omits_absent_apt_lines() {
        let ctx = ModeContext::District(DistrictContext {
            district: "강남구".into(),
            rank: 1,
            price: 240_000.0,
            apt_info: Some(AptInfo {
                total_complexes: Some(120),
                total_households: None,
                avg_build_year: Some(2001.4),
                price_range: None,
            }),
        });
        let text = build_context(Some(&ctx), &snapshot());

        assert!(text.contains("Apartment complexes: 120"));
        assert!(text.contains("Average build year: 2001"));
        assert!(!text.contains("Total households"));
        assert!(!text.contains("Price range"));
    }

    #[test]
    fn test_comparison_paragraph() {
        let ctx = ModeContext::Comparison(ComparisonContext {
            district: "강남구".into(),
            rank: 1,
            price: 240_000.0,
            mode: ComparisonMode::SimilarPrice,
            partner_count: 3,
        });
        let text = build_context(Some(&ctx), &snapshot());

        assert!(text.contains("Comparison basis: similar price band"));
        assert!(text.contains("Comparison partners: 3 districts"));
    }

    #[test]
    fn test_district_apt_info_dedups_households_per_complex() {
        let row = |complex: &str, households: u32, year: u32, price: f64| TransactionRecord {
            district: "강남구".into(),
            period: 202412,
            price,
            complex: Some(complex.into()),
            build_year: Some(year),
            household_count: Some(households),
        };
        let records = vec![
            row("래미안", 1_000, 2005, 200_000.0),
            row("래미안", 1_000, 2005, 220_000.0),
            row("은마", 4_400, 1979, 180_000.0),
        ];

        let info = district_apt_info(&records, "강남구").unwrap();
        assert_eq!(info.total_complexes, Some(2));
        assert_eq!(info.total_households, Some(5_400));
        assert_eq!(info.price_range, Some((180_000.0, 220_000.0)));

        assert_eq!(district_apt_info(&records, "서초구"), None);
    }
}

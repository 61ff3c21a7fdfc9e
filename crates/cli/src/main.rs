use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use geo::{LineString, MultiPolygon, Polygon};
use marble_analytics::{
    compute_quintiles, compute_ranking, find_adjacent, find_similar_price, latest_snapshot,
    neighbors_report, DistrictBoundary, DEFAULT_TOLERANCE_PCT, MAX_COMPARISON_RESULTS,
};
use marble_context::{
    answer, build_context, EchoResponder, ModeContext, OverviewContext,
};
use marble_model::{
    format_period, format_price_eok, RankingEntry, Role, TransactionRecord,
};
use marble_session::{ComparisonMode, MapKey, SessionState, ViewStage};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "marble")]
#[command(about = "Seoul apartment dashboard core", long_about = None)]
#[command(version)]
struct Cli {
    /// Transaction dataset (JSON array of records)
    #[arg(long, global = true, default_value = "data/transactions.json")]
    data: PathBuf,

    /// Deal month as YYYYMM; defaults to the latest month in the dataset
    #[arg(long, global = true)]
    period: Option<u32>,

    /// Machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log only warnings and errors
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// District price ranking for the selected month
    Rank,

    /// Quintile partition of the ranking
    Quintiles,

    /// Districts in the target's price band
    Similar {
        district: String,

        /// Window half-width in percent
        #[arg(long, default_value_t = DEFAULT_TOLERANCE_PCT)]
        tolerance: f64,

        #[arg(long, default_value_t = MAX_COMPARISON_RESULTS)]
        limit: usize,
    },

    /// Districts bordering the target
    Adjacent {
        district: String,

        /// Boundary geometries (JSON array of {name, rings})
        #[arg(long)]
        boundaries: PathBuf,
    },

    /// Ask a question against the current dashboard context
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Apply a selection sequence and show the resulting session state
    State {
        #[arg(long)]
        stage: Option<String>,

        #[arg(long)]
        district: Option<String>,

        #[arg(long)]
        quintile: Option<u8>,

        /// Comparison mode: adjacent | similar_price
        #[arg(long)]
        mode: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let records = load_records(&cli.data)?;
    let snapshot = latest_snapshot(&records)?;
    let period = cli.period.unwrap_or(snapshot.period);
    let ranking = compute_ranking(&records, period);
    if ranking.is_empty() {
        bail!("no transaction records for period {period}");
    }

    match cli.command {
        Commands::Rank => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&ranking)?);
            } else {
                println!("District ranking for {}", format_period(period));
                for entry in &ranking {
                    println!(
                        "{:>3}. {:<8} {}",
                        entry.rank,
                        entry.district,
                        format_price_eok(entry.avg_price)
                    );
                }
            }
        }
        Commands::Quintiles => {
            let quintiles = compute_quintiles(&ranking);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&quintiles)?);
            } else {
                for q in &quintiles {
                    println!(
                        "{} ({}): {} ~ {}",
                        q.label,
                        q.description,
                        format_price_eok(q.price_min),
                        format_price_eok(q.price_max)
                    );
                    println!("    {}", q.districts.join(", "));
                }
            }
        }
        Commands::Similar {
            district,
            tolerance,
            limit,
        } => {
            let result = find_similar_price(&district, &ranking, tolerance, limit);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.summary);
                for m in &result.matches {
                    println!(
                        "  {:<8} {} (rank {}, {:+.1}%, similarity {:.1})",
                        m.district,
                        format_price_eok(m.price),
                        m.rank,
                        m.diff_pct,
                        m.similarity
                    );
                }
            }
        }
        Commands::Adjacent {
            district,
            boundaries,
        } => {
            let boundaries = load_boundaries(&boundaries)?;
            let result = find_adjacent(&district, &boundaries);
            let report = neighbors_report(&district, &result.districts, &ranking);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", result.summary);
                for row in &report.rows {
                    let marker = if row.is_target { "*" } else { " " };
                    println!(
                        " {marker} {:<8} rank {:>2}  {}",
                        row.district,
                        row.rank,
                        format_price_eok(row.price)
                    );
                }
            }
        }
        Commands::Ask { question } => {
            let question = question.join(" ");
            let mut session = SessionState::new();
            session.add_message(Role::User, &question);

            let context = build_context(Some(&overview_context(&ranking)), &snapshot);
            let reply = answer(&EchoResponder, &question, &context);
            session.add_message(Role::Assistant, &reply);

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "question": question,
                        "answer": reply,
                    }))?
                );
            } else {
                println!("{reply}");
            }
        }
        Commands::State {
            stage,
            district,
            quintile,
            mode,
        } => {
            let mut session = SessionState::new();
            if let Some(name) = district {
                if !session.select_district(&name) {
                    bail!("invalid district name");
                }
            }
            if quintile.is_some() && !session.select_quintile(quintile) {
                bail!("quintile must be between 1 and 5");
            }
            if let Some(mode) = mode {
                let mode: ComparisonMode = mode.parse()?;
                session.set_comparison_mode(Some(mode));
            }
            if let Some(stage) = stage {
                let stage: ViewStage = stage.parse()?;
                session.set_view_stage(stage);
            }

            let summary = session.summary();
            let key = MapKey::for_state(&session);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "summary": summary,
                        "map_key": key,
                    }))?
                );
            } else {
                println!("stage:    {}", summary.stage);
                println!("district: {}", summary.selected_district.as_deref().unwrap_or("-"));
                println!(
                    "quintile: {}",
                    summary
                        .selected_quintile
                        .map(|q| q.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
                println!(
                    "mode:     {}",
                    summary
                        .comparison_mode
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
                println!("valid:    {}", summary.valid);
                println!("map key:  {}", serde_json::to_string(&key)?);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_records(path: &Path) -> Result<Vec<TransactionRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading dataset {}", path.display()))?;
    let records: Vec<TransactionRecord> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    log::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Boundary file row: district name plus polygon exterior rings as
/// [[x, y], ...] coordinate lists.
#[derive(Debug, Deserialize)]
struct BoundaryRow {
    name: String,
    rings: Vec<Vec<[f64; 2]>>,
}

fn load_boundaries(path: &Path) -> Result<Vec<DistrictBoundary>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading boundaries {}", path.display()))?;
    let rows: Vec<BoundaryRow> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let polygons: Vec<Polygon<f64>> = row
                .rings
                .into_iter()
                .map(|ring| {
                    let coords: Vec<(f64, f64)> =
                        ring.into_iter().map(|[x, y]| (x, y)).collect();
                    Polygon::new(LineString::from(coords), vec![])
                })
                .collect();
            DistrictBoundary {
                name: row.name,
                geometry: MultiPolygon(polygons),
            }
        })
        .collect())
}

fn overview_context(ranking: &[RankingEntry]) -> ModeContext {
    let highest = &ranking[0];
    let lowest = &ranking[ranking.len() - 1];
    let avg = ranking.iter().map(|e| e.avg_price).sum::<f64>() / ranking.len() as f64;
    ModeContext::Overview(OverviewContext {
        seoul_avg_price: avg,
        total_districts: ranking.len(),
        highest: (highest.district.clone(), highest.avg_price),
        lowest: (lowest.district.clone(), lowest.avg_price),
        top5: ranking
            .iter()
            .take(5)
            .map(|e| e.district.clone())
            .collect(),
    })
}

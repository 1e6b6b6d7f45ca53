use bmi_core::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bmitrack")]
#[command(about = "BMI tracking and statistics system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as this user (profile email)
    #[arg(long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and record a BMI measurement
    Calc {
        /// Height in meters
        #[arg(long, allow_negative_numbers = true)]
        height: f64,

        /// Weight in kilograms
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,
    },

    /// Show past calculations, newest first
    History {
        /// Maximum number of records
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show summary statistics, category breakdown and time series
    Stats {
        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Roll up the live calculation log to CSV
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    bmi_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory and acting identity
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let email = cli
        .user
        .unwrap_or_else(|| config.user.default_email.clone());

    tracing::debug!("Using data dir {:?} as {}", data_dir, email);

    match cli.command {
        Commands::Calc { height, weight } => cmd_calc(&data_dir, &email, height, weight),
        Commands::History { limit, from, to } => {
            cmd_history(&data_dir, &email, limit, from, to, &config)
        }
        Commands::Stats { from, to } => cmd_stats(&data_dir, &email, from, to),
        Commands::Rollup { cleanup } => cmd_rollup(&data_dir, cleanup),
    }
}

/// Resolve the acting identity from the local profile registry
fn resolve_user(data_dir: &Path, email: &str) -> Result<AuthenticatedUser> {
    let registry_path = data_dir.join("profiles.json");
    ProfileRegistry::resolve(&registry_path, email)
}

fn cmd_calc(data_dir: &Path, email: &str, height: f64, weight: f64) -> Result<()> {
    // Reject bad input before touching identity or store
    validate::measurement(height, weight)?;

    let user = resolve_user(data_dir, email)?;
    let mut store = FileStore::open(data_dir)?;

    let reading = record_calculation(&mut store, &user, height, weight)?;

    println!();
    println!("  BMI: {:.2}", reading.bmi);
    println!("  Category: {}", reading.category);
    println!();
    println!("✓ Calculation recorded!");

    Ok(())
}

fn cmd_history(
    data_dir: &Path,
    email: &str,
    limit: Option<i64>,
    from: Option<String>,
    to: Option<String>,
    config: &Config,
) -> Result<()> {
    let range = validate::date_range(from.as_deref(), to.as_deref())?;
    let limit = match limit {
        Some(raw) => validate::limit(raw)?,
        None => config.history.default_limit,
    };

    let user = resolve_user(data_dir, email)?;
    let store = FileStore::open(data_dir)?;

    let records = fetch_history(&store, &user, &HistoryRequest { limit, range })?;

    if records.is_empty() {
        println!("No calculations found.");
        return Ok(());
    }

    println!("╭─────────────────────────────────────────╮");
    println!("│  HISTORY — {}", user.email);
    println!("╰─────────────────────────────────────────╯");
    println!();
    for record in &records {
        println!(
            "  {}  bmi {:>6.2}  {:<11}  {:.2} m  {:.1} kg",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.bmi,
            record.category,
            record.height,
            record.weight
        );
    }
    println!();
    println!("  {} record(s)", records.len());

    Ok(())
}

fn cmd_stats(data_dir: &Path, email: &str, from: Option<String>, to: Option<String>) -> Result<()> {
    let range = validate::date_range(from.as_deref(), to.as_deref())?;

    let user = resolve_user(data_dir, email)?;
    let store = FileStore::open(data_dir)?;

    let stats = compute_statistics(&store, &user, &range)?;

    println!("╭─────────────────────────────────────────╮");
    println!("│  STATISTICS — {}", user.email);
    println!("╰─────────────────────────────────────────╯");
    println!();
    let summary = &stats.summary;
    println!("  Total calculations: {}", summary.total_count);
    println!("  Average BMI: {:.2}", summary.avg_bmi);
    println!("  Average weight: {:.2} kg", summary.avg_weight);
    println!("  Min BMI: {:.2}", summary.min_bmi);
    println!("  Max BMI: {:.2}", summary.max_bmi);
    println!("  BMI std deviation: {:.2}", summary.stddev_bmi);
    println!("  BMI change (last two): {:+.2}", summary.bmi_delta);
    println!("  Weight change (last two): {:+.2} kg", summary.weight_delta);

    if !stats.categories.is_empty() {
        println!();
        println!("  Categories:");
        for entry in &stats.categories {
            println!(
                "    {:<11}  {} ({:.1}%)",
                entry.category, entry.count, entry.percentage
            );
        }
    }

    if !stats.time_series.is_empty() {
        println!();
        println!("  Time series (oldest first):");
        for point in &stats.time_series {
            println!(
                "    {}  bmi {:>6.2}  {:.1} kg  {}",
                point.date, point.bmi, point.weight, point.category
            );
        }
    }

    println!();
    Ok(())
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let store = FileStore::open(data_dir)?;
    let wal_dir = data_dir.join("wal");

    if !store.wal_path().exists() {
        println!("No calculation log found - nothing to roll up.");
        return Ok(());
    }

    let count = bmi_core::csv_rollup::wal_to_csv_and_archive(store.wal_path(), store.csv_path())?;

    println!("✓ Rolled up {} calculations to CSV", count);
    println!("  CSV: {}", store.csv_path().display());

    if cleanup {
        let cleaned = bmi_core::csv_rollup::cleanup_processed_wals(&wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}

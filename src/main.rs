/// Maintenance binary for the habit streak engine
///
/// Opens the SQLite store, loads the engine config, and runs one command:
/// repairing cached streaks, or printing the dashboard, a habit's stats, or
/// the current day key as JSON on stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use habit_streaks::{Calendar, HabitId, HabitTracker, SqliteStore, TrackerConfig, TrackerError};

/// Load the config at `path`, or at the platform default location
fn load_config(path: Option<PathBuf>) -> Result<TrackerConfig, TrackerError> {
    match path.or_else(TrackerConfig::default_path) {
        Some(path) => Ok(TrackerConfig::load(&path)?),
        None => Ok(TrackerConfig::default()),
    }
}

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_streaks");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_streaks");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_streaks");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_streaks");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if let Ok(()) = std::fs::create_dir_all(potential_path) {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_streaks");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the habit streak engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute every habit's streak and stored completion percentage
    Repair,
    /// Print the dashboard summary
    Dashboard,
    /// Print statistics for one habit
    Stats {
        habit_id: String,
    },
    /// Print the day key considered "today"
    Today,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_streaks={}", log_level))
        .with_writer(std::io::stderr) // stdout carries the JSON output
        .init();

    let config = load_config(args.config)?;

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let store = SqliteStore::new(&db_path)?;
    let tracker = HabitTracker::new(store, Calendar::system(), config);

    match args.command {
        Command::Repair => {
            let streaks = tracker.recompute_all().await?;
            let changed = tracker.refresh_completion_percentages().await?;
            info!("Repair complete, {} completion percentages updated", changed);
            println!("{}", serde_json::to_string_pretty(&streaks)?);
        }
        Command::Dashboard => {
            let dashboard = tracker.dashboard().await?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        Command::Stats { habit_id } => {
            let habit_id = HabitId::parse(&habit_id)?;
            match tracker.habit_stats(&habit_id).await? {
                Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
                None => return Err(format!("Habit not found: {}", habit_id).into()),
            }
        }
        Command::Today => println!("{}", tracker.calendar().today_key()),
    }

    Ok(())
}

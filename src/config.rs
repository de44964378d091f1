//! Command line and environment configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::{Confidence, FilterCriteria, Trend};

pub const DEFAULT_DB_PATH: &str = "rs3_market.db";

/// Grand Exchange flipping opportunity scanner.
#[derive(Parser, Debug)]
#[command(name = "ge_flipper")]
#[command(about = "Finds items worth buying now and reselling from recent price history")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging for this crate.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the SQLite price history store.
    #[arg(long, env = "GE_DB_PATH", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score the monitored items once and print the opportunities.
    Scan(ScanArgs),

    /// Re-score on a fixed interval until interrupted.
    Monitor {
        #[command(flatten)]
        scan: ScanArgs,

        /// Seconds between refreshes.
        #[arg(long, env = "GE_REFRESH_SECS", default_value_t = 60)]
        interval: u64,
    },

    /// Manage the list of monitored items.
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },

    /// Import a price history JSON document keyed by item id.
    Import {
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchAction {
    Add { id: u32 },
    Remove { id: u32 },
    List,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Only score these item ids (defaults to the watchlist).
    #[arg(long = "item", value_delimiter = ',')]
    pub items: Vec<u32>,

    /// Minimum profit margin in percent.
    #[arg(long)]
    pub min_margin: Option<f64>,

    /// Minimum 24h traded volume.
    #[arg(long)]
    pub min_volume: Option<u64>,

    /// Allowed confidence levels, e.g. `high,medium`.
    #[arg(long, value_delimiter = ',')]
    pub confidence: Vec<Confidence>,

    /// Allowed trends, e.g. `down,stable`.
    #[arg(long, value_delimiter = ',')]
    pub trend: Vec<Trend>,

    /// Print at most this many rows.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_profit_margin: self.min_margin,
            min_volume: self.min_volume,
            confidence: self.confidence.clone(),
            trend: self.trend.clone(),
        }
    }
}

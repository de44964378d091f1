use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ge_flipper::config::{Cli, Command, ScanArgs, WatchAction};
use ge_flipper::flips::unix_now;
use ge_flipper::monitor::{self, ScanResult};
use ge_flipper::{loader, report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("ge_flipper=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Command::Scan(args) => cmd_scan(&cli.db, &args),
        Command::Monitor { scan, interval } => cmd_monitor(cli.db, scan, interval).await,
        Command::Watch { action } => cmd_watch(&cli.db, action),
        Command::Import { path } => {
            let conn = loader::open_store(&cli.db)?;
            let file = File::open(&path)?;
            let count = loader::import_json(&conn, BufReader::new(file))?;
            println!("Imported {count} samples from {}", path.display());
            Ok(())
        }
    }
}

fn cmd_scan(db: &str, args: &ScanArgs) -> anyhow::Result<()> {
    let conn = loader::open_store(db)?;
    let result = monitor::scan(&conn, &args.items, &args.criteria(), unix_now())?;
    print_result(&result, args)
}

async fn cmd_monitor(db: String, args: ScanArgs, interval: u64) -> anyhow::Result<()> {
    let period = Duration::from_secs(interval.max(1));
    let criteria = args.criteria();

    monitor::run(db, args.items.clone(), criteria, period, |result| {
        if let Err(e) = print_result(result, &args) {
            tracing::error!(error = %e, "Failed to print scan result");
        }
    })
    .await
}

fn cmd_watch(db: &str, action: WatchAction) -> anyhow::Result<()> {
    let conn = loader::open_store(db)?;
    match action {
        WatchAction::Add { id } => {
            if loader::watch_item(&conn, id)? {
                info!(item_id = id, "Now monitoring");
            }
        }
        WatchAction::Remove { id } => {
            if !loader::unwatch_item(&conn, id)? {
                println!("Item {id} was not monitored");
            }
        }
        WatchAction::List => {
            let ids = loader::watched_items(&conn)?;
            if ids.is_empty() {
                println!("No items monitored");
                return Ok(());
            }
            let now = unix_now();
            let items = loader::load_items(&conn, &ids, now)?;
            print!("{}", report::render_items(&items, now));
        }
    }
    Ok(())
}

fn print_result(result: &ScanResult, args: &ScanArgs) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", report::render_opportunities(&result.opportunities, args.limit));
        println!("{}", report::render_stats(&result.stats));
    }
    Ok(())
}

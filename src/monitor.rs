//! Periodic refresh. Each tick takes a fresh snapshot from the store and runs
//! it through the scoring pipeline; the pipeline itself holds no state.

use std::future::Future;
use std::time::Duration;

use rusqlite::Connection;
use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::filter::filter_opportunities;
use crate::flips::find_opportunities;
use crate::loader;
use crate::model::{FilterCriteria, FlippingOpportunity, FlippingStats};
use crate::summary::summarize;

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub scanned_at: i64,
    pub items_scanned: usize,
    pub opportunities: Vec<FlippingOpportunity>,
    pub stats: FlippingStats,
}

/// Load, score, filter and summarize in one pass.
pub fn scan(conn: &Connection, ids: &[u32], criteria: &FilterCriteria, now: i64) -> Result<ScanResult> {
    let items = loader::load_items(conn, ids, now)?;
    let found = find_opportunities(&items, now);
    let opportunities = filter_opportunities(&found, criteria);
    let stats = summarize(&opportunities);

    info!(
        items = items.len(),
        found = found.len(),
        shown = opportunities.len(),
        "Scan complete"
    );

    Ok(ScanResult {
        scanned_at: now,
        items_scanned: items.len(),
        opportunities,
        stats,
    })
}

/// Runs `scan` every `period` until Ctrl-C, handing each result to
/// `on_result`.
pub async fn run<F>(
    db_path: String,
    ids: Vec<u32>,
    criteria: FilterCriteria,
    period: Duration,
    on_result: F,
) -> anyhow::Result<()>
where
    F: FnMut(&ScanResult),
{
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    run_until(db_path, ids, criteria, period, on_result, ctrl_c).await
}

/// Refresh loop that stops when `shutdown` resolves. Refreshes never overlap;
/// a slow scan delays the next tick instead of queueing extra ones. A failed
/// refresh is logged and retried on the next tick.
pub async fn run_until<F, S>(
    db_path: String,
    ids: Vec<u32>,
    criteria: FilterCriteria,
    period: Duration,
    mut on_result: F,
    shutdown: S,
) -> anyhow::Result<()>
where
    F: FnMut(&ScanResult),
    S: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);

    info!(period_secs = period.as_secs(), "Monitoring started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let db_path = db_path.clone();
                let ids = ids.clone();
                let criteria = criteria.clone();

                let outcome = tokio::task::spawn_blocking(move || {
                    let conn = loader::open_store(&db_path)?;
                    scan(&conn, &ids, &criteria, crate::flips::unix_now())
                })
                .await;

                match outcome {
                    Ok(Ok(result)) => on_result(&result),
                    Ok(Err(e)) => warn!(error = %e, "Refresh failed, retrying next tick"),
                    Err(e) => error!(error = %e, "Refresh task panicked"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Confidence, PriceSample};
    use crate::stats::DAY_SECS;

    const NOW: i64 = 10 * DAY_SECS;

    fn seeded_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        loader::init_schema(&conn).unwrap();

        // (id, current price, volume, 24h prices)
        let items: [(u32, f64, u64, [f64; 3]); 3] = [
            (1, 100.0, 2000, [115.0, 115.0, 115.0]),
            (2, 100.0, 300, [106.0, 106.0, 106.0]),
            (3, 100.0, 2000, [100.0, 100.0, 100.0]),
        ];
        for (id, price, volume, history) in items {
            loader::upsert_item(&conn, id, &format!("item {id}"), Some(price), Some(volume)).unwrap();
            for (i, p) in history.iter().enumerate() {
                let sample = PriceSample { timestamp: NOW - 600 * (i as i64 + 1), price: *p, volume: None };
                loader::record_sample(&conn, id, &sample).unwrap();
            }
        }
        conn
    }

    #[test]
    fn scan_runs_whole_pipeline() {
        let conn = seeded_store();
        let result = scan(&conn, &[], &FilterCriteria::default(), NOW).unwrap();

        assert_eq!(result.items_scanned, 3);
        let ids: Vec<u32> = result.opportunities.iter().map(|o| o.item_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(result.stats.total_opportunities, 2);
        assert_eq!(result.stats.avg_profit_margin, 10.5);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_loop_survives_store_errors() {
        let mut results = 0;
        let bad_path = "/nonexistent-dir/ge_flipper/store.db".to_string();

        run_until(
            bad_path,
            vec![],
            FilterCriteria::default(),
            Duration::from_secs(10),
            |_| results += 1,
            tokio::time::sleep(Duration::from_secs(35)),
        )
        .await
        .unwrap();

        assert_eq!(results, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_loop_scans_once_per_tick() {
        let path = std::env::temp_dir().join(format!("ge_flipper_monitor_{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let db_path = path.to_string_lossy().into_owned();

        {
            let conn = loader::open_store(&db_path).unwrap();
            let now = crate::flips::unix_now();
            loader::upsert_item(&conn, 1, "Nature rune", Some(100.0), Some(2000)).unwrap();
            for offset in [600, 1200] {
                let sample = PriceSample { timestamp: now - offset, price: 115.0, volume: None };
                loader::record_sample(&conn, 1, &sample).unwrap();
            }
        }

        let mut seen = Vec::new();
        run_until(
            db_path,
            vec![],
            FilterCriteria::default(),
            Duration::from_secs(10),
            |result| seen.push(result.opportunities.len()),
            // ticks at 0, 10, 20 and 30 seconds
            tokio::time::sleep(Duration::from_secs(35)),
        )
        .await
        .unwrap();

        let _ = std::fs::remove_file(&path);
        assert_eq!(seen, vec![1, 1, 1, 1]);
    }

    #[test]
    fn scan_applies_criteria() {
        let conn = seeded_store();
        let criteria = FilterCriteria {
            confidence: vec![Confidence::High],
            ..Default::default()
        };
        let result = scan(&conn, &[], &criteria, NOW).unwrap();

        let ids: Vec<u32> = result.opportunities.iter().map(|o| o.item_id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(result.stats.high_confidence_count, 1);
    }
}

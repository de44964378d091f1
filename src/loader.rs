use std::collections::BTreeMap;
use std::io::Read;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{AnalyzerError, Result};
use crate::model::{MonitoredItem, PriceSample};
use crate::stats::{self, DAY_SECS};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS items (
        id            INTEGER PRIMARY KEY,
        name          TEXT NOT NULL DEFAULT '',
        current_price REAL,
        volume_24h    INTEGER
    );
    CREATE TABLE IF NOT EXISTS history (
        item_id   INTEGER NOT NULL REFERENCES items(id),
        timestamp INTEGER NOT NULL,
        price     REAL NOT NULL,
        volume    INTEGER
    );
    CREATE INDEX IF NOT EXISTS history_item_ts ON history(item_id, timestamp);
    CREATE TABLE IF NOT EXISTS watchlist (
        item_id INTEGER PRIMARY KEY REFERENCES items(id)
    );
";

// SQLite integers are signed; larger volumes are stored clamped.
fn volume_to_sql(volume: Option<u64>) -> Option<i64> {
    volume.map(|v| i64::try_from(v).unwrap_or(i64::MAX))
}

pub fn open_store(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    debug!(db_path, "Opened price history store");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Inserts an item or updates its price fields. A blank name never overwrites
/// a resolved one.
pub fn upsert_item(
    conn: &Connection,
    id: u32,
    name: &str,
    current_price: Option<f64>,
    volume_24h: Option<u64>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO items (id, name, current_price, volume_24h)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             name = CASE WHEN excluded.name = '' THEN items.name ELSE excluded.name END,
             current_price = excluded.current_price,
             volume_24h = excluded.volume_24h",
        params![id, name, current_price, volume_to_sql(volume_24h)],
    )?;
    Ok(())
}

pub fn record_sample(conn: &Connection, item_id: u32, sample: &PriceSample) -> Result<()> {
    conn.execute(
        "INSERT INTO history (item_id, timestamp, price, volume) VALUES (?1, ?2, ?3, ?4)",
        params![item_id, sample.timestamp, sample.price, volume_to_sql(sample.volume)],
    )?;
    Ok(())
}

fn item_exists(conn: &Connection, id: u32) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM items WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Starts monitoring an item. Returns `false` if it was already watched.
pub fn watch_item(conn: &Connection, id: u32) -> Result<bool> {
    if !item_exists(conn, id)? {
        return Err(AnalyzerError::UnknownItem(id));
    }
    let inserted = conn.execute("INSERT OR IGNORE INTO watchlist (item_id) VALUES (?1)", [id])?;
    if inserted == 0 {
        warn!(item_id = id, "Item already monitored");
    }
    Ok(inserted > 0)
}

/// Stops monitoring an item. Returns `false` if it was not watched.
pub fn unwatch_item(conn: &Connection, id: u32) -> Result<bool> {
    let removed = conn.execute("DELETE FROM watchlist WHERE item_id = ?1", [id])?;
    Ok(removed > 0)
}

pub fn watched_items(conn: &Connection) -> Result<Vec<u32>> {
    let mut stmt = conn.prepare("SELECT item_id FROM watchlist ORDER BY item_id")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    Ok(rows.collect::<std::result::Result<Vec<u32>, _>>()?)
}

fn all_item_ids(conn: &Connection) -> Result<Vec<u32>> {
    let mut stmt = conn.prepare("SELECT id FROM items ORDER BY id")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    Ok(rows.collect::<std::result::Result<Vec<u32>, _>>()?)
}

/// Builds a read-only snapshot of the requested items. With no ids the
/// watchlist is used, and with an empty watchlist every stored item.
/// A missing `volume_24h` is derived from the last day of sample volumes.
pub fn load_items(conn: &Connection, ids: &[u32], now: i64) -> Result<Vec<MonitoredItem>> {
    let ids = if !ids.is_empty() {
        ids.to_vec()
    } else {
        let watched = watched_items(conn)?;
        if watched.is_empty() { all_item_ids(conn)? } else { watched }
    };

    let mut item_stmt = conn.prepare(
        "SELECT id, name, current_price, volume_24h FROM items WHERE id = ?1"
    )?;
    let mut history_stmt = conn.prepare(
        "SELECT timestamp, price, volume FROM history WHERE item_id = ?1"
    )?;

    let mut items = Vec::with_capacity(ids.len());

    for id in ids {
        let row = item_stmt
            .query_row([id], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })
            .optional()?;

        let Some((name, current_price, volume_24h)) = row else {
            warn!(item_id = id, "Requested item not in store");
            continue;
        };

        let price_history: Vec<PriceSample> = history_stmt
            .query_map([id], |row| {
                Ok(PriceSample {
                    timestamp: row.get(0)?,
                    price: row.get(1)?,
                    volume: row.get::<_, Option<i64>>(2)?.map(|v| v.max(0) as u64),
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let volume_24h = volume_24h
            .map(|v| v.max(0) as u64)
            .or_else(|| Some(stats::volume_since(&price_history, now - DAY_SECS)));

        items.push(MonitoredItem {
            id,
            name,
            current_price,
            volume_24h,
            price_history,
        });
    }

    debug!(count = items.len(), "Loaded item snapshot");
    Ok(items)
}

/// Imports a price history document keyed by item id,
/// `{"<id>": [{"timestamp": .., "price": .., "volume": ..}, ..]}`.
/// The newest sample of each series becomes the item's current price.
pub fn import_json<R: Read>(conn: &Connection, reader: R) -> Result<usize> {
    let doc: BTreeMap<String, Vec<PriceSample>> = serde_json::from_reader(reader)?;

    let tx = conn.unchecked_transaction()?;
    let mut imported = 0;

    for (key, samples) in doc {
        let id = key
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| AnalyzerError::InvalidItemId(key.clone()))?;

        let current_price = samples.iter().max_by_key(|s| s.timestamp).map(|s| s.price);
        upsert_item(&tx, id, "", current_price, None)?;

        for sample in &samples {
            record_sample(&tx, id, sample)?;
        }
        imported += samples.len();
    }

    tx.commit()?;
    info!(samples = imported, "Imported price history");
    Ok(imported)
}

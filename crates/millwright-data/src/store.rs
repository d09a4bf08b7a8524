//! SQLite-backed implementation of the data-access boundary

use crate::fuzzy;
use crate::DataError;
use millwright_domain::traits::DataAccess;
use millwright_domain::{
    Asset, AssetId, Citation, DailyMetric, DataResult, DowntimeEntry, EventRecord,
    ProductionStatus, TimeRange,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// SQLite-based implementation of [`DataAccess`].
///
/// Read side only: the agent core never writes operational data. Every query
/// returns a [`DataResult`] whose citation records the table, the query
/// parameters, and the query timestamp - including queries that match
/// nothing.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each worker should hold its own
/// `SqliteDataStore` instance (or guard a shared one externally).
pub struct SqliteDataStore {
    conn: Connection,
    source: String,
}

impl SqliteDataStore {
    /// Open a store at the given database path.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let source = format!("sqlite:{}", path.as_ref().display());
        let conn = Connection::open(path)?;
        let store = Self { conn, source };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory store pre-loaded with the demo seed dataset
    pub fn open_seeded() -> Result<Self, DataError> {
        let store = Self::open(":memory:")?;
        store.conn.execute_batch(include_str!("seed.sql"))?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), DataError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn citation(&self, table: &str, excerpt: String) -> Citation {
        Citation::new(self.source.clone(), table, Self::now(), excerpt)
    }

    /// All asset names, used by the fuzzy fallback
    fn all_asset_names(&self) -> Result<Vec<String>, DataError> {
        let mut stmt = self.conn.prepare("SELECT name FROM assets ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn asset_by_exact_name(&self, name: &str) -> Result<Option<Asset>, DataError> {
        let asset = self
            .conn
            .query_row(
                "SELECT id, name, area, asset_type FROM assets WHERE name = ?1",
                params![name],
                Self::asset_from_row,
            )
            .optional()?;
        Ok(asset)
    }

    fn asset_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Asset> {
        Ok(Asset {
            id: AssetId(row.get(0)?),
            name: row.get(1)?,
            area: row.get(2)?,
            asset_type: row.get(3)?,
        })
    }
}

impl DataAccess for SqliteDataStore {
    type Error = DataError;

    fn get_asset_by_name(&self, name: &str) -> Result<DataResult<Option<Asset>>, Self::Error> {
        // Exact match on the raw name first, then on normalized names
        let mut found = self.asset_by_exact_name(name)?;

        if found.is_none() {
            let wanted = fuzzy::normalize(name);
            for candidate in self.all_asset_names()? {
                if fuzzy::normalize(&candidate) == wanted {
                    found = self.asset_by_exact_name(&candidate)?;
                    break;
                }
            }
        }

        let citation = match &found {
            Some(asset) => self
                .citation(
                    "assets",
                    format!("{} ({}) in {}", asset.name, asset.asset_type, asset.area),
                )
                .with_record_id(asset.id.to_string()),
            None => self.citation("assets", format!("no asset matched '{}'", name)),
        };

        Ok(DataResult::new(found, citation))
    }

    fn get_similar_assets(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<DataResult<Vec<Asset>>, Self::Error> {
        let names = self.all_asset_names()?;
        let ranked = fuzzy::rank_candidates(name, &names);

        let mut assets = Vec::new();
        for (candidate, _) in ranked.into_iter().take(limit.min(fuzzy::MAX_CANDIDATES)) {
            if let Some(asset) = self.asset_by_exact_name(candidate)? {
                assets.push(asset);
            }
        }

        let excerpt = if assets.is_empty() {
            format!("no assets similar to '{}'", name)
        } else {
            let list: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
            format!("assets similar to '{}': {}", name, list.join(", "))
        };
        let citation = self.citation("assets", excerpt);

        Ok(DataResult::new(assets, citation))
    }

    fn get_daily_metrics(
        &self,
        asset_id: AssetId,
        range: TimeRange,
    ) -> Result<DataResult<Vec<DailyMetric>>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT asset_id, day, availability, performance, quality, output
             FROM daily_metrics
             WHERE asset_id = ?1 AND day >= ?2 AND day < ?3
             ORDER BY day",
        )?;

        let metrics = stmt
            .query_map(
                params![asset_id.0, range.start as i64, range.end as i64],
                |row| {
                    Ok(DailyMetric {
                        asset_id: AssetId(row.get(0)?),
                        day: row.get::<_, i64>(1)? as u64,
                        availability: row.get(2)?,
                        performance: row.get(3)?,
                        quality: row.get(4)?,
                        output: row.get(5)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let citation = self
            .citation(
                "daily_metrics",
                format!(
                    "{} daily metric rows for {} in [{}, {})",
                    metrics.len(),
                    asset_id,
                    range.start,
                    range.end
                ),
            )
            .with_record_id(asset_id.to_string());

        Ok(DataResult::new(metrics, citation))
    }

    fn get_event_log(
        &self,
        asset_id: AssetId,
        range: TimeRange,
    ) -> Result<DataResult<Vec<EventRecord>>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT asset_id, timestamp, kind, description, safety
             FROM events
             WHERE asset_id = ?1 AND timestamp >= ?2 AND timestamp < ?3
             ORDER BY timestamp",
        )?;

        let events = stmt
            .query_map(
                params![asset_id.0, range.start as i64, range.end as i64],
                |row| {
                    Ok(EventRecord {
                        asset_id: AssetId(row.get(0)?),
                        timestamp: row.get::<_, i64>(1)? as u64,
                        kind: row.get(2)?,
                        description: row.get(3)?,
                        safety: row.get::<_, i64>(4)? != 0,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let citation = self
            .citation(
                "events",
                format!(
                    "{} events for {} in [{}, {})",
                    events.len(),
                    asset_id,
                    range.start,
                    range.end
                ),
            )
            .with_record_id(asset_id.to_string());

        Ok(DataResult::new(events, citation))
    }

    fn get_downtime(
        &self,
        asset_id: AssetId,
        range: TimeRange,
    ) -> Result<DataResult<Vec<DowntimeEntry>>, Self::Error> {
        // Aggregated by reason at the boundary so downstream Pareto logic
        // never handles raw per-day rows
        let mut stmt = self.conn.prepare(
            "SELECT reason, SUM(seconds), MAX(safety)
             FROM downtime
             WHERE asset_id = ?1 AND day >= ?2 AND day < ?3
             GROUP BY reason
             ORDER BY reason",
        )?;

        let entries = stmt
            .query_map(
                params![asset_id.0, range.start as i64, range.end as i64],
                |row| {
                    Ok(DowntimeEntry {
                        reason: row.get(0)?,
                        seconds: row.get(1)?,
                        safety: row.get::<_, i64>(2)? != 0,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let total_seconds: f64 = entries.iter().map(|e| e.seconds).sum();
        let citation = self
            .citation(
                "downtime",
                format!(
                    "{} downtime reasons totalling {:.0} seconds for {} in [{}, {})",
                    entries.len(),
                    total_seconds,
                    asset_id,
                    range.start,
                    range.end
                ),
            )
            .with_record_id(asset_id.to_string());

        Ok(DataResult::new(entries, citation))
    }

    fn get_production_status(
        &self,
        asset_id: AssetId,
    ) -> Result<DataResult<Option<ProductionStatus>>, Self::Error> {
        let status = self
            .conn
            .query_row(
                "SELECT asset_id, current_count, target_count, running, updated_at
                 FROM production_status WHERE asset_id = ?1",
                params![asset_id.0],
                |row| {
                    Ok(ProductionStatus {
                        asset_id: AssetId(row.get(0)?),
                        current_count: row.get(1)?,
                        target_count: row.get(2)?,
                        running: row.get::<_, i64>(3)? != 0,
                        updated_at: row.get::<_, i64>(4)? as u64,
                    })
                },
            )
            .optional()?;

        let citation = match &status {
            Some(s) => self
                .citation(
                    "production_status",
                    format!(
                        "{}: {:.0} of {:.0} units, {}",
                        asset_id,
                        s.current_count,
                        s.target_count,
                        if s.running { "running" } else { "stopped" }
                    ),
                )
                .with_record_id(asset_id.to_string()),
            None => self.citation(
                "production_status",
                format!("no production status for {}", asset_id),
            ),
        };

        Ok(DataResult::new(status, citation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteDataStore {
        SqliteDataStore::open_seeded().unwrap()
    }

    const WEEK: TimeRange = TimeRange {
        start: 1704067200,
        end: 1704672000,
    };

    #[test]
    fn test_exact_asset_lookup() {
        let store = seeded();
        let result = store.get_asset_by_name("Grinder 5").unwrap();

        let asset = result.data.unwrap();
        assert_eq!(asset.name, "Grinder 5");
        assert_eq!(asset.area, "Machining");
        assert_eq!(result.citation.source_table.as_deref(), Some("assets"));
    }

    #[test]
    fn test_normalized_asset_lookup() {
        let store = seeded();
        let result = store.get_asset_by_name("grinder-5").unwrap();
        assert!(result.data.is_some());
    }

    #[test]
    fn test_missing_asset_still_cited() {
        let store = seeded();
        let result = store.get_asset_by_name("Lathe 99").unwrap();

        assert!(result.data.is_none());
        assert!(result.citation.excerpt.contains("Lathe 99"));
    }

    #[test]
    fn test_similar_assets_ranked_and_limited() {
        let store = seeded();
        let result = store.get_similar_assets("grindr 5", 5).unwrap();

        assert!(!result.data.is_empty());
        assert!(result.data.len() <= 5);
        assert_eq!(result.data[0].name, "Grinder 5");
    }

    #[test]
    fn test_daily_metrics_in_range_only() {
        let store = seeded();
        let result = store
            .get_daily_metrics(AssetId(1), TimeRange::new(1704067200, 1704153600))
            .unwrap();

        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].day, 1704067200);
    }

    #[test]
    fn test_downtime_aggregated_by_reason() {
        let store = seeded();
        let result = store.get_downtime(AssetId(1), WEEK).unwrap();

        // Seed has four distinct reasons for asset 1 across two days
        assert_eq!(result.data.len(), 4);
        let safety: Vec<&DowntimeEntry> = result.data.iter().filter(|e| e.safety).collect();
        assert_eq!(safety.len(), 1);
        assert_eq!(safety[0].reason, "Safety stop");
    }

    #[test]
    fn test_downtime_empty_range_is_cited_success() {
        let store = seeded();
        let result = store
            .get_downtime(AssetId(4), WEEK)
            .expect("empty downtime is a normal result");

        assert!(result.data.is_empty());
        assert!(result.citation.excerpt.contains("0 downtime reasons"));
    }

    #[test]
    fn test_production_status_fetch() {
        let store = seeded();
        let result = store.get_production_status(AssetId(1)).unwrap();

        let status = result.data.unwrap();
        assert_eq!(status.current_count, 847.0);
        assert_eq!(status.target_count, 900.0);
    }

    #[test]
    fn test_event_log_safety_flag() {
        let store = seeded();
        let result = store.get_event_log(AssetId(1), WEEK).unwrap();

        assert_eq!(result.data.len(), 3);
        assert!(result.data.iter().any(|e| e.safety));
    }

    #[test]
    fn test_on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.db");

        {
            let store = SqliteDataStore::open(&path).unwrap();
            store
                .conn
                .execute(
                    "INSERT INTO assets (id, name, area, asset_type) VALUES (1, 'Press 9', 'Stamping', 'press')",
                    [],
                )
                .unwrap();
        }

        let store = SqliteDataStore::open(&path).unwrap();
        let result = store.get_asset_by_name("Press 9").unwrap();
        assert_eq!(result.data.unwrap().area, "Stamping");
        assert!(result.citation.source.contains("plant.db"));
    }
}

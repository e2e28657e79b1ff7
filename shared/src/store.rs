use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::error::StoreError;
use crate::models::Observation;

/// Append-only observation store backed by a shared SQLite pool.
///
/// Every operation is independently atomic; no multi-operation transaction
/// is exposed. Reads for an instrument come back ordered by `observed_at`
/// with `rowid` breaking ties, so they are always consistent with insertion
/// order.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        info!("Connected to database at: {}", path);
        Ok(Store { pool })
    }

    /// In-memory store. Single connection, so every query sees the same
    /// database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?;
        Ok(Store { pool })
    }

    /// Ensure the schema exists. Idempotent; safe to call before any
    /// concurrent readers or writers attach.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS observations (
                instrument  TEXT NOT NULL,
                price       REAL NOT NULL,
                observed_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        info!("Table 'observations' ensured");
        Ok(())
    }

    /// Append one observation. The negative-price check is authoritative
    /// and runs before any I/O is attempted.
    pub async fn insert(
        &self,
        instrument: &str,
        price: f64,
        observed_at: i64,
    ) -> Result<(), StoreError> {
        if price < 0.0 {
            error!("Rejected negative price {} for {}", price, instrument);
            return Err(StoreError::InvalidValue(price));
        }

        sqlx::query("INSERT INTO observations (instrument, price, observed_at) VALUES (?, ?, ?)")
            .bind(instrument)
            .bind(price)
            .bind(observed_at)
            .execute(&self.pool)
            .await?;
        info!(
            "Inserted price for {}: {} at {}",
            instrument, price, observed_at
        );
        Ok(())
    }

    /// All observations for an instrument, ascending by timestamp. Empty
    /// when none exist, never an error.
    pub async fn all_for_instrument(
        &self,
        instrument: &str,
    ) -> Result<Vec<Observation>, StoreError> {
        let rows = sqlx::query_as::<_, Observation>(
            "SELECT instrument, price, observed_at FROM observations
             WHERE instrument = ?
             ORDER BY observed_at ASC, rowid ASC",
        )
        .bind(instrument)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The observation with the maximum timestamp for an instrument.
    /// Timestamp ties resolve to the most recently inserted row.
    pub async fn latest_for_instrument(
        &self,
        instrument: &str,
    ) -> Result<Option<Observation>, StoreError> {
        let row = sqlx::query_as::<_, Observation>(
            "SELECT instrument, price, observed_at FROM observations
             WHERE instrument = ?
             ORDER BY observed_at DESC, rowid DESC
             LIMIT 1",
        )
        .bind(instrument)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Observations with `start <= observed_at <= end`, ascending. An
    /// absent bound is unbounded on that side; both absent behaves exactly
    /// as [`all_for_instrument`]. The inequality is applied literally, so
    /// an inverted range yields an empty result.
    pub async fn range_for_instrument(
        &self,
        instrument: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<Observation>, StoreError> {
        let start = start.unwrap_or(i64::MIN);
        let end = end.unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, Observation>(
            "SELECT instrument, price, observed_at FROM observations
             WHERE instrument = ? AND observed_at BETWEEN ? AND ?
             ORDER BY observed_at ASC, rowid ASC",
        )
        .bind(instrument)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Release the pool. Operations on a closed store fail with
    /// [`StoreError::Unavailable`].
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Store closed");
    }
}

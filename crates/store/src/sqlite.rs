//! SQLite store.
//!
//! Two append-only tables:
//! - `weather_data_raw`: every fetched observation, verbatim
//! - `weather_data`: cleaned records, with a lower-cased `city_key` for lookups
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text so that string
//! comparison orders them chronologically.

use crate::city_key;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use skywatch_core::error::StoreError;
use skywatch_core::observation::{CleanedRecord, Observation, StoredRecord, TemperatureStats};
use skywatch_core::store::WeatherStore;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and run migrations.
    pub async fn new(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Connection(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite weather store initialized at {url}");
        Ok(store)
    }

    /// An ephemeral database private to this store.
    ///
    /// Held on a single connection that never idles out, since an in-memory
    /// database disappears with its last connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open SQLite: {e}")))?;

        Self::from_pool(pool).await
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather_data_raw (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                city_name           TEXT,
                country             TEXT,
                temperature         REAL,
                feels_like          REAL,
                weather_condition   TEXT,
                weather_description TEXT,
                humidity            REAL,
                wind_speed          REAL,
                pressure            REAL,
                observed_at         TEXT,
                fetched_at          TEXT NOT NULL,
                created_at          TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("weather_data_raw table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather_data (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                city_name           TEXT NOT NULL,
                city_key            TEXT NOT NULL,
                country             TEXT NOT NULL,
                temperature         REAL NOT NULL,
                feels_like          REAL NOT NULL,
                weather_condition   TEXT NOT NULL,
                weather_description TEXT NOT NULL,
                humidity            INTEGER NOT NULL,
                wind_speed          REAL NOT NULL,
                pressure            INTEGER,
                observed_at         TEXT NOT NULL,
                fetched_at          TEXT NOT NULL,
                created_at          TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("weather_data table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_weather_city_key ON weather_data(city_key)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("city_key index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_weather_created_at ON weather_data(created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("created_at index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_weather_raw_created_at ON weather_data_raw(created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("raw created_at index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Insert one cleaned record with an explicit insertion time.
    pub async fn insert_cleaned_at(
        &self,
        record: &CleanedRecord,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        insert_cleaned_row(&mut *conn, record, created_at).await
    }

    fn row_to_record(row: &SqliteRow) -> Result<StoredRecord, StoreError> {
        let col = |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));

        let humidity: i64 = row.try_get("humidity").map_err(|e| col("humidity", e))?;
        let pressure: Option<i64> = row.try_get("pressure").map_err(|e| col("pressure", e))?;
        let observed_at: String = row.try_get("observed_at").map_err(|e| col("observed_at", e))?;
        let fetched_at: String = row.try_get("fetched_at").map_err(|e| col("fetched_at", e))?;
        let created_at: String = row.try_get("created_at").map_err(|e| col("created_at", e))?;

        Ok(StoredRecord {
            id: row.try_get("id").map_err(|e| col("id", e))?,
            record: CleanedRecord {
                city_name: row.try_get("city_name").map_err(|e| col("city_name", e))?,
                country: row.try_get("country").map_err(|e| col("country", e))?,
                temperature: row.try_get("temperature").map_err(|e| col("temperature", e))?,
                feels_like: row.try_get("feels_like").map_err(|e| col("feels_like", e))?,
                weather_condition: row
                    .try_get("weather_condition")
                    .map_err(|e| col("weather_condition", e))?,
                weather_description: row
                    .try_get("weather_description")
                    .map_err(|e| col("weather_description", e))?,
                humidity: u8::try_from(humidity)
                    .map_err(|_| StoreError::QueryFailed(format!("humidity out of range: {humidity}")))?,
                wind_speed: row.try_get("wind_speed").map_err(|e| col("wind_speed", e))?,
                pressure: pressure
                    .map(u16::try_from)
                    .transpose()
                    .map_err(|_| StoreError::QueryFailed("pressure out of range".into()))?,
                observed_at: parse_timestamp(&observed_at)?,
                fetched_at: parse_timestamp(&fetched_at)?,
            },
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::QueryFailed(format!("bad timestamp {s:?}: {e}")))
}

async fn insert_raw_row(
    conn: &mut SqliteConnection,
    obs: &Observation,
    created_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO weather_data_raw (
            city_name, country, temperature, feels_like, weather_condition,
            weather_description, humidity, wind_speed, pressure,
            observed_at, fetched_at, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&obs.city_name)
    .bind(&obs.country)
    .bind(obs.temperature)
    .bind(obs.feels_like)
    .bind(&obs.weather_condition)
    .bind(&obs.weather_description)
    .bind(obs.humidity)
    .bind(obs.wind_speed)
    .bind(obs.pressure)
    .bind(obs.observed_at.map(format_timestamp))
    .bind(format_timestamp(obs.fetched_at))
    .bind(format_timestamp(created_at))
    .execute(conn)
    .await
    .map_err(|e| StoreError::Write(format!("raw INSERT failed: {e}")))?;
    Ok(())
}

async fn insert_cleaned_row(
    conn: &mut SqliteConnection,
    record: &CleanedRecord,
    created_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO weather_data (
            city_name, city_key, country, temperature, feels_like, weather_condition,
            weather_description, humidity, wind_speed, pressure,
            observed_at, fetched_at, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&record.city_name)
    .bind(city_key(&record.city_name))
    .bind(&record.country)
    .bind(record.temperature)
    .bind(record.feels_like)
    .bind(&record.weather_condition)
    .bind(&record.weather_description)
    .bind(i64::from(record.humidity))
    .bind(record.wind_speed)
    .bind(record.pressure.map(i64::from))
    .bind(format_timestamp(record.observed_at))
    .bind(format_timestamp(record.fetched_at))
    .bind(format_timestamp(created_at))
    .execute(conn)
    .await
    .map_err(|e| StoreError::Write(format!("INSERT failed: {e}")))?;
    Ok(())
}

#[async_trait]
impl WeatherStore for SqliteStore {
    async fn insert_raw_batch(&self, observations: &[Observation]) -> Result<usize, StoreError> {
        if observations.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let created_at = Utc::now();
        let mut written = 0;

        for obs in observations {
            match insert_raw_row(&mut *tx, obs, created_at).await {
                Ok(()) => written += 1,
                Err(e) => warn!(city = ?obs.city_name, error = %e, "Skipping raw observation"),
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Write(format!("raw batch commit: {e}")))?;
        debug!(written, "Raw batch stored");
        Ok(written)
    }

    async fn insert_cleaned_batch(&self, records: &[CleanedRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let created_at = Utc::now();
        let mut written = 0;

        for record in records {
            match insert_cleaned_row(&mut *tx, record, created_at).await {
                Ok(()) => written += 1,
                Err(e) => warn!(city = %record.city_name, error = %e, "Skipping cleaned record"),
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Write(format!("cleaned batch commit: {e}")))?;
        debug!(written, "Cleaned batch stored");
        Ok(written)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM weather_data ORDER BY created_at DESC, id DESC LIMIT ?1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("latest: {e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn latest_for_city(&self, city: &str) -> Result<Option<StoredRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM weather_data
            WHERE instr(city_key, ?1) > 0
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(city_key(city))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("latest for city: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_record(r)?)),
            None => Ok(None),
        }
    }

    async fn history(
        &self,
        city: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM weather_data
            WHERE instr(city_key, ?1) > 0 AND created_at >= ?2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(city_key(city))
        .bind(format_timestamp(since))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("history: {e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn temperature_stats(
        &self,
        city: &str,
        since: DateTime<Utc>,
    ) -> Result<TemperatureStats, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt,
                   AVG(temperature) AS avg_t,
                   MIN(temperature) AS min_t,
                   MAX(temperature) AS max_t
            FROM weather_data
            WHERE instr(city_key, ?1) > 0 AND created_at >= ?2
            "#,
        )
        .bind(city_key(city))
        .bind(format_timestamp(since))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("temperature stats: {e}")))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;
        if count == 0 {
            return Ok(TemperatureStats::default());
        }

        Ok(TemperatureStats {
            count: count as u64,
            avg: row.try_get("avg_t").ok(),
            min: row.try_get("min_t").ok(),
            max: row.try_get("max_t").ok(),
        })
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM weather_data")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;
        Ok(cnt as u64)
    }

    async fn raw_count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM weather_data_raw")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("raw COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;
        Ok(cnt as u64)
    }
}

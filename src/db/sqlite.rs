use crate::config::LoadStrategy;
use crate::db::models::{LoadOutcome, StoredRecord};
use crate::db::schema::SQLITE_INIT;
use crate::error::{EtlError, is_unique_violation};
use crate::types::DailyRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct ApodStorage {
    pool: SqlitePool,
}

impl ApodStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`, creating the SQLite file if missing.
    pub async fn connect(database_url: &str) -> Result<Self, EtlError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL. Idempotent.
    pub async fn init_schema(&self) -> Result<(), EtlError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s)
                .execute(&self.pool)
                .await
                .map_err(EtlError::Schema)?;
        }
        Ok(())
    }

    /// Persist `record` unless a row with the same date exists.
    pub async fn load(
        &self,
        record: &DailyRecord,
        strategy: LoadStrategy,
    ) -> Result<LoadOutcome, EtlError> {
        match strategy {
            LoadStrategy::Atomic => self.insert_if_absent(record).await,
            LoadStrategy::CheckThenInsert => {
                let existing = self.count_by_date(&record.date).await?;
                if existing > 0 {
                    debug!(date = %record.date, existing, "record already present");
                    return Ok(LoadOutcome::Skipped);
                }
                self.insert(record).await
            }
        }
    }

    pub async fn count_by_date(&self, date: &str) -> Result<i64, EtlError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM apod_data WHERE date = ?")
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .map_err(EtlError::Load)?;
        Ok(rec.0)
    }

    /// Plain insert. A UNIQUE violation on `date` means another run got there
    /// first and is reported as `Skipped`.
    pub async fn insert(&self, record: &DailyRecord) -> Result<LoadOutcome, EtlError> {
        let res = sqlx::query(
            r#"
            INSERT INTO apod_data (title, explanation, url, date, media_type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.title.as_str())
        .bind(record.explanation.as_str())
        .bind(record.url.as_str())
        .bind(record.date.as_str())
        .bind(record.media_type.as_str())
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) => Ok(LoadOutcome::Inserted {
                id: done.last_insert_rowid(),
            }),
            Err(e) if is_unique_violation(&e) => {
                debug!(date = %record.date, "insert lost race on unique date");
                Ok(LoadOutcome::Skipped)
            }
            Err(e) => Err(EtlError::Load(e)),
        }
    }

    /// Insert using `ON CONFLICT(date) DO NOTHING`; no separate existence check.
    pub async fn insert_if_absent(&self, record: &DailyRecord) -> Result<LoadOutcome, EtlError> {
        let done = sqlx::query(
            r#"
            INSERT INTO apod_data (title, explanation, url, date, media_type)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(date) DO NOTHING
            "#,
        )
        .bind(record.title.as_str())
        .bind(record.explanation.as_str())
        .bind(record.url.as_str())
        .bind(record.date.as_str())
        .bind(record.media_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(EtlError::Load)?;

        if done.rows_affected() == 0 {
            return Ok(LoadOutcome::Skipped);
        }
        Ok(LoadOutcome::Inserted {
            id: done.last_insert_rowid(),
        })
    }

    pub async fn get_by_date(&self, date: &str) -> Result<Option<StoredRecord>, EtlError> {
        let row = sqlx::query_as::<_, StoredRecord>(
            r#"SELECT id, title, explanation, url, date, media_type
               FROM apod_data WHERE date = ?"#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_all(&self) -> Result<Vec<StoredRecord>, EtlError> {
        let rows = sqlx::query_as::<_, StoredRecord>(
            r#"SELECT id, title, explanation, url, date, media_type
               FROM apod_data ORDER BY date"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

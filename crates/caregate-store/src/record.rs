//! Patient record store over SQLite.
//!
//! Records are append-only: created once per intake interview, never
//! updated or deleted, read many times. The store enforces only its own
//! contract (non-empty name, non-negative age); policy bounds such as the
//! 0-150 age range belong to the intake boundary.

use caregate_core::PatientRecord;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS patient_details (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    age        INTEGER NOT NULL,
    weight     REAL,
    created_at TEXT NOT NULL
)
"#;

#[derive(sqlx::FromRow)]
struct PatientRow {
    id: i64,
    name: String,
    age: i64,
    weight: Option<f64>,
    created_at: DateTime<Utc>,
}

impl PatientRow {
    fn into_record(self) -> PatientRecord {
        PatientRecord {
            id: self.id,
            name: self.name,
            age: self.age,
            weight: self.weight,
            created_at: self.created_at,
        }
    }
}

/// Explicitly constructed store owning its connection pool. Passed by
/// `Arc` to the coordinator and to the reporting surface; there is no
/// process-wide database handle.
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Open (or create) the database at `url` and ensure the table exists.
    /// Use `sqlite::memory:` for an ephemeral store.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        // Single connection: the workload is single-writer conversational
        // cadence, and `sqlite::memory:` databases are per-connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!(url = %url, "record store ready");
        Ok(Self { pool })
    }

    /// Insert one intake record. Atomic: on failure no partial row is
    /// visible. The id is assigned by the store, unique and monotonic per
    /// store instance; `created_at` is assigned here at insert time.
    pub async fn insert(
        &self,
        name: &str,
        age: i64,
        weight: Option<f64>,
    ) -> Result<PatientRecord, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Constraint("name must not be empty".into()));
        }
        if age < 0 {
            return Err(StoreError::Constraint("age must not be negative".into()));
        }

        let row: PatientRow = sqlx::query_as(
            "INSERT INTO patient_details (name, age, weight, created_at) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, name, age, weight, created_at",
        )
        .bind(name)
        .bind(age)
        .bind(weight)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        let record = row.into_record();
        info!(id = record.id, name = %record.name, "patient record inserted");
        Ok(record)
    }

    /// All records, ordered by id ascending.
    pub async fn list_all(&self) -> Result<Vec<PatientRecord>, StoreError> {
        let rows: Vec<PatientRow> = sqlx::query_as(
            "SELECT id, name, age, weight, created_at \
             FROM patient_details ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PatientRow::into_record).collect())
    }
}

use crate::models::{Pairing, StoredAssignment};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

const UPSERT_ASSIGNMENT: &str = r#"
    INSERT INTO mentor_assignments (mentee_id, mentor_id, assigned_by, run_id, assigned_at)
    VALUES ($1, $2, $3, $4, NOW())
    ON CONFLICT (mentee_id)
    DO UPDATE SET
        mentor_id = EXCLUDED.mentor_id,
        assigned_by = EXCLUDED.assigned_by,
        run_id = EXCLUDED.run_id,
        assigned_at = EXCLUDED.assigned_at
    WHERE mentor_assignments.mentor_id IS DISTINCT FROM EXCLUDED.mentor_id
       OR mentor_assignments.assigned_by IS DISTINCT FROM EXCLUDED.assigned_by
"#;

// Rows saved in one transaction share `assigned_at`
const LIST_ASSIGNMENTS: &str = r#"
    SELECT mentee_id, mentor_id, assigned_by, run_id, assigned_at
    FROM mentor_assignments
    ORDER BY assigned_at DESC, mentee_id
"#;

/// PostgreSQL store for saved mentor assignments
///
/// Rows are keyed by mentee id, so saving a rerun replaces the previous
/// pairing instead of adding a second one. A row whose pairing is unchanged
/// is left alone, including its `assigned_at` and `run_id`.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Pool that connects on first use, for handler tests without a database
    #[cfg(test)]
    pub(crate) fn lazy(database_url: &str) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }

    /// Upsert every pairing of a run in one transaction
    ///
    /// Either all pairings are stored or none are.
    pub async fn upsert_pairings(
        &self,
        run_id: &str,
        pairings: &[Pairing],
    ) -> Result<u64, PostgresError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for pairing in pairings {
            let result = sqlx::query(UPSERT_ASSIGNMENT)
                .bind(&pairing.mentee_id)
                .bind(&pairing.mentor_id)
                .bind(&pairing.assigned_by)
                .bind(run_id)
                .execute(&mut *tx)
                .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;

        tracing::info!("Saved {} pairings from run {}", pairings.len(), run_id);

        Ok(affected)
    }

    /// All saved assignments, most recent first
    pub async fn list_assignments(&self) -> Result<Vec<StoredAssignment>, PostgresError> {
        let rows = sqlx::query(LIST_ASSIGNMENTS).fetch_all(&self.pool).await?;

        let assignments = rows
            .iter()
            .map(|row| StoredAssignment {
                mentee_id: row.get("mentee_id"),
                mentor_id: row.get("mentor_id"),
                assigned_by: row.get("assigned_by"),
                run_id: row.get("run_id"),
                assigned_at: row.get("assigned_at"),
            })
            .collect();

        Ok(assignments)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// The single shared sequence every job number is drawn from.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobCounter {
    pub id: i64,
    pub last_job_number: i64,
    pub updated_at: DateTime<Utc>,
}

impl JobCounter {
    pub const SINGLETON_ID: i64 = 1;

    /// Advance the counter and return the new value. The first call on a
    /// fresh database creates the row and returns 1.
    ///
    /// This is one statement, so two callers can never read the same
    /// pre-increment value. Run it on a transaction to tie the allocation to
    /// the insert that consumes it.
    pub async fn next_job_number<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar!(
            r#"
            INSERT INTO job_counter (id, last_job_number)
            VALUES ($1, 1)
            ON CONFLICT(id) DO UPDATE SET
                last_job_number = last_job_number + 1,
                updated_at = datetime('now', 'subsec')
            RETURNING last_job_number as "last_job_number!: i64"
            "#,
            Self::SINGLETON_ID
        )
        .fetch_one(executor)
        .await
    }

    pub async fn find(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            JobCounter,
            r#"
            SELECT
                id              as "id!: i64",
                last_job_number as "last_job_number!: i64",
                updated_at      as "updated_at!: DateTime<Utc>"
            FROM job_counter
            WHERE id = $1
            "#,
            Self::SINGLETON_ID
        )
        .fetch_optional(pool)
        .await
    }

    /// Last issued number, 0 when nothing has been allocated yet.
    pub async fn current(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        Ok(Self::find(pool).await?.map_or(0, |c| c.last_job_number))
    }
}

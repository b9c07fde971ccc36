use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::input::{OptionalDate, OptionalDecimal};

/// A hired asset or line item attached to a job.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
    pub id: Uuid,
    pub job_id: Uuid,
    pub item_description: String,
    pub item_asset_no: Option<String>,
    pub on_hire_date: Option<DateTime<Utc>>,
    pub off_hire_date: Option<DateTime<Utc>>,
    pub price_week: String,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobItem {
    pub item_description: String,
    pub item_asset_no: Option<String>,
    #[serde_as(as = "OptionalDate")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub on_hire_date: Option<DateTime<Utc>>,
    #[serde_as(as = "OptionalDate")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub off_hire_date: Option<DateTime<Utc>>,
    #[serde_as(as = "OptionalDecimal")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub price_week: Option<String>,
    pub comments: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobItem {
    pub item_description: Option<String>,
    pub item_asset_no: Option<String>,
    #[serde_as(as = "OptionalDate")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub on_hire_date: Option<DateTime<Utc>>,
    #[serde_as(as = "OptionalDate")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub off_hire_date: Option<DateTime<Utc>>,
    #[serde_as(as = "OptionalDecimal")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub price_week: Option<String>,
    pub comments: Option<String>,
}

impl JobItem {
    pub async fn find_by_job_id(pool: &SqlitePool, job_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as!(
            JobItem,
            r#"
            SELECT
                id               as "id!: Uuid",
                job_id           as "job_id!: Uuid",
                item_description,
                item_asset_no,
                on_hire_date     as "on_hire_date: DateTime<Utc>",
                off_hire_date    as "off_hire_date: DateTime<Utc>",
                price_week,
                comments,
                created_at       as "created_at!: DateTime<Utc>"
            FROM job_items
            WHERE job_id = $1
            ORDER BY created_at ASC, rowid ASC
            "#,
            job_id
        )
        .fetch_all(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        job_id: Uuid,
        data: &CreateJobItem,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let price_week = data.price_week.clone().unwrap_or_else(|| "0.00".to_string());
        sqlx::query_as!(
            JobItem,
            r#"
            INSERT INTO job_items (id, job_id, item_description, item_asset_no, on_hire_date, off_hire_date, price_week, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id               as "id!: Uuid",
                job_id           as "job_id!: Uuid",
                item_description,
                item_asset_no,
                on_hire_date     as "on_hire_date: DateTime<Utc>",
                off_hire_date    as "off_hire_date: DateTime<Utc>",
                price_week,
                comments,
                created_at       as "created_at!: DateTime<Utc>"
            "#,
            id,
            job_id,
            data.item_description,
            data.item_asset_no,
            data.on_hire_date,
            data.off_hire_date,
            price_week,
            data.comments
        )
        .fetch_one(executor)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateJobItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            JobItem,
            r#"
            UPDATE job_items SET
                item_description = COALESCE($2, item_description),
                item_asset_no = COALESCE($3, item_asset_no),
                on_hire_date = COALESCE($4, on_hire_date),
                off_hire_date = COALESCE($5, off_hire_date),
                price_week = COALESCE($6, price_week),
                comments = COALESCE($7, comments)
            WHERE id = $1
            RETURNING
                id               as "id!: Uuid",
                job_id           as "job_id!: Uuid",
                item_description,
                item_asset_no,
                on_hire_date     as "on_hire_date: DateTime<Utc>",
                off_hire_date    as "off_hire_date: DateTime<Utc>",
                price_week,
                comments,
                created_at       as "created_at!: DateTime<Utc>"
            "#,
            id,
            data.item_description,
            data.item_asset_no,
            data.on_hire_date,
            data.off_hire_date,
            data.price_week,
            data.comments
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query!("DELETE FROM job_items WHERE id = $1", id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_job_id<'e, E>(executor: E, job_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query!("DELETE FROM job_items WHERE job_id = $1", job_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::job::{AllocatedJobCode, CreateJob, Job},
    };

    async fn seed_job(db: &DBService) -> Job {
        Job::create(
            &db.pool,
            Uuid::new_v4(),
            &CreateJob::default(),
            &AllocatedJobCode {
                job_number: 1,
                job_les: "LEH000001".to_string(),
                department: "HIRE".to_string(),
            },
        )
        .await
        .unwrap()
    }

    fn item(description: &str) -> CreateJobItem {
        CreateJobItem {
            item_description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_hire_dates_and_price_export_as_nullable_strings() {
        for decl in [CreateJobItem::decl(), UpdateJobItem::decl()] {
            assert!(decl.contains("onHireDate: string | null"), "{decl}");
            assert!(decl.contains("offHireDate: string | null"), "{decl}");
            assert!(decl.contains("priceWeek: string | null"), "{decl}");
        }
    }

    #[tokio::test]
    async fn test_items_are_deleted_with_their_job() {
        let db = DBService::new_in_memory().await.unwrap();
        let job = seed_job(&db).await;
        JobItem::create(&db.pool, Uuid::new_v4(), job.id, &item("Generator 20kVA"))
            .await
            .unwrap();

        assert_eq!(Job::delete(&db.pool, job.id).await.unwrap(), 1);
        assert!(JobItem::find_by_job_id(&db.pool, job.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_item_requires_existing_job() {
        let db = DBService::new_in_memory().await.unwrap();
        let result = JobItem::create(&db.pool, Uuid::new_v4(), Uuid::new_v4(), &item("Orphan")).await;
        assert!(matches!(result, Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation()));
    }

    #[tokio::test]
    async fn test_update_and_defaults() {
        let db = DBService::new_in_memory().await.unwrap();
        let job = seed_job(&db).await;
        let created = JobItem::create(&db.pool, Uuid::new_v4(), job.id, &item("Light tower"))
            .await
            .unwrap();
        assert_eq!(created.price_week, "0.00");

        let updated = JobItem::update(
            &db.pool,
            created.id,
            &UpdateJobItem {
                price_week: Some("125.00".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.price_week, "125.00");
        assert_eq!(updated.item_description, "Light tower");
    }
}

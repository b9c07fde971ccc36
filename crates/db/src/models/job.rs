use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::input::{OptionalDate, OptionalDecimal};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub job_number: i64,
    pub job_les: String, // prefix + zero-padded job_number, fixed at creation
    pub job_no: Option<String>,
    pub job_status: String,
    pub pm: Option<String>,
    pub date: DateTime<Utc>,
    pub client_id: Option<Uuid>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub department: Option<String>,
    pub linked_job_ref: Option<String>,
    pub cost_nett: String,
    pub quote_ref: Option<String>,
    pub job_complete: bool,
    pub invoiced: bool,
    pub job_comments: Option<String>,
    pub purchase_order: Option<String>,
    pub attachments: Option<String>,
    pub invoice_comments: Option<String>,
    #[ts(type = "Array<string> | null")]
    pub completion_photos: Option<Json<Vec<String>>>,
    pub photo_uploaded_at: Option<DateTime<Utc>>,
    pub photo_uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a job creation request. `jobNumber` and `jobLes` are not accepted
/// from callers; they are allocated server side.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateJob {
    pub job_no: Option<String>,
    pub job_status: Option<String>,
    pub pm: Option<String>,
    #[serde_as(as = "OptionalDate")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub date: Option<DateTime<Utc>>,
    pub client_id: Option<Uuid>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub department: Option<String>,
    pub linked_job_ref: Option<String>,
    #[serde_as(as = "OptionalDecimal")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub cost_nett: Option<String>,
    pub quote_ref: Option<String>,
    pub job_complete: Option<bool>,
    pub invoiced: Option<bool>,
    pub job_comments: Option<String>,
    pub purchase_order: Option<String>,
    pub attachments: Option<String>,
    pub invoice_comments: Option<String>,
}

/// Partial update. There is deliberately no way to set `job_number` or
/// `job_les` here, and changing `department` does not rewrite `job_les`.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJob {
    pub job_no: Option<String>,
    pub job_status: Option<String>,
    pub pm: Option<String>,
    #[serde_as(as = "OptionalDate")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub date: Option<DateTime<Utc>>,
    pub client_id: Option<Uuid>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub department: Option<String>,
    pub linked_job_ref: Option<String>,
    #[serde_as(as = "OptionalDecimal")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub cost_nett: Option<String>,
    pub quote_ref: Option<String>,
    pub job_complete: Option<bool>,
    pub invoiced: Option<bool>,
    pub job_comments: Option<String>,
    pub purchase_order: Option<String>,
    pub attachments: Option<String>,
    pub invoice_comments: Option<String>,
    pub completion_photos: Option<Vec<String>>,
    #[serde_as(as = "OptionalDate")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub photo_uploaded_at: Option<DateTime<Utc>>,
    pub photo_uploaded_by: Option<String>,
}

/// Query string of `GET /api/jobs`.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub department: Option<String>,
}

/// Values fixed by the allocator for a new job.
#[derive(Debug, Clone)]
pub struct AllocatedJobCode {
    pub job_number: i64,
    pub job_les: String,
    pub department: String,
}

impl Job {
    pub async fn find_all(pool: &SqlitePool, filter: &JobFilter) -> Result<Vec<Self>, sqlx::Error> {
        let department = filter.department.as_deref().filter(|d| !d.is_empty());
        sqlx::query_as!(
            Job,
            r#"
            SELECT
                id                as "id!: Uuid",
                job_number,
                job_les,
                job_no,
                job_status,
                pm,
                date              as "date!: DateTime<Utc>",
                client_id         as "client_id: Uuid",
                description,
                job_type,
                department,
                linked_job_ref,
                cost_nett,
                quote_ref,
                job_complete      as "job_complete!: bool",
                invoiced          as "invoiced!: bool",
                job_comments,
                purchase_order,
                attachments,
                invoice_comments,
                completion_photos as "completion_photos: Json<Vec<String>>",
                photo_uploaded_at as "photo_uploaded_at: DateTime<Utc>",
                photo_uploaded_by,
                created_at        as "created_at!: DateTime<Utc>",
                updated_at        as "updated_at!: DateTime<Utc>"
            FROM jobs
            WHERE $1 IS NULL OR UPPER(department) = UPPER($1)
            ORDER BY job_number ASC
            "#,
            department
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            Job,
            r#"
            SELECT
                id                as "id!: Uuid",
                job_number,
                job_les,
                job_no,
                job_status,
                pm,
                date              as "date!: DateTime<Utc>",
                client_id         as "client_id: Uuid",
                description,
                job_type,
                department,
                linked_job_ref,
                cost_nett,
                quote_ref,
                job_complete      as "job_complete!: bool",
                invoiced          as "invoiced!: bool",
                job_comments,
                purchase_order,
                attachments,
                invoice_comments,
                completion_photos as "completion_photos: Json<Vec<String>>",
                photo_uploaded_at as "photo_uploaded_at: DateTime<Utc>",
                photo_uploaded_by,
                created_at        as "created_at!: DateTime<Utc>",
                updated_at        as "updated_at!: DateTime<Utc>"
            FROM jobs
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        data: &CreateJob,
        code: &AllocatedJobCode,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let job_status = data.job_status.clone().unwrap_or_else(|| "OPEN".to_string());
        let date = data.date.unwrap_or_else(Utc::now);
        let cost_nett = data.cost_nett.clone().unwrap_or_else(|| "0.00".to_string());
        let job_complete = data.job_complete.unwrap_or(false);
        let invoiced = data.invoiced.unwrap_or(false);
        sqlx::query_as!(
            Job,
            r#"
            INSERT INTO jobs (
                id, job_number, job_les, job_no, job_status, pm, date, client_id,
                description, job_type, department, linked_job_ref, cost_nett, quote_ref,
                job_complete, invoiced, job_comments, purchase_order, attachments,
                invoice_comments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING
                id                as "id!: Uuid",
                job_number,
                job_les,
                job_no,
                job_status,
                pm,
                date              as "date!: DateTime<Utc>",
                client_id         as "client_id: Uuid",
                description,
                job_type,
                department,
                linked_job_ref,
                cost_nett,
                quote_ref,
                job_complete      as "job_complete!: bool",
                invoiced          as "invoiced!: bool",
                job_comments,
                purchase_order,
                attachments,
                invoice_comments,
                completion_photos as "completion_photos: Json<Vec<String>>",
                photo_uploaded_at as "photo_uploaded_at: DateTime<Utc>",
                photo_uploaded_by,
                created_at        as "created_at!: DateTime<Utc>",
                updated_at        as "updated_at!: DateTime<Utc>"
            "#,
            id,
            code.job_number,
            code.job_les,
            data.job_no,
            job_status,
            data.pm,
            date,
            data.client_id,
            data.description,
            data.job_type,
            code.department,
            data.linked_job_ref,
            cost_nett,
            data.quote_ref,
            job_complete,
            invoiced,
            data.job_comments,
            data.purchase_order,
            data.attachments,
            data.invoice_comments
        )
        .fetch_one(executor)
        .await
    }

    /// Returns `None` when no job has this id.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateJob,
    ) -> Result<Option<Self>, sqlx::Error> {
        let completion_photos = data.completion_photos.as_ref().map(Json);
        sqlx::query_as!(
            Job,
            r#"
            UPDATE jobs SET
                job_no = COALESCE($2, job_no),
                job_status = COALESCE($3, job_status),
                pm = COALESCE($4, pm),
                date = COALESCE($5, date),
                client_id = COALESCE($6, client_id),
                description = COALESCE($7, description),
                job_type = COALESCE($8, job_type),
                department = COALESCE($9, department),
                linked_job_ref = COALESCE($10, linked_job_ref),
                cost_nett = COALESCE($11, cost_nett),
                quote_ref = COALESCE($12, quote_ref),
                job_complete = COALESCE($13, job_complete),
                invoiced = COALESCE($14, invoiced),
                job_comments = COALESCE($15, job_comments),
                purchase_order = COALESCE($16, purchase_order),
                attachments = COALESCE($17, attachments),
                invoice_comments = COALESCE($18, invoice_comments),
                completion_photos = COALESCE($19, completion_photos),
                photo_uploaded_at = COALESCE($20, photo_uploaded_at),
                photo_uploaded_by = COALESCE($21, photo_uploaded_by),
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING
                id                as "id!: Uuid",
                job_number,
                job_les,
                job_no,
                job_status,
                pm,
                date              as "date!: DateTime<Utc>",
                client_id         as "client_id: Uuid",
                description,
                job_type,
                department,
                linked_job_ref,
                cost_nett,
                quote_ref,
                job_complete      as "job_complete!: bool",
                invoiced          as "invoiced!: bool",
                job_comments,
                purchase_order,
                attachments,
                invoice_comments,
                completion_photos as "completion_photos: Json<Vec<String>>",
                photo_uploaded_at as "photo_uploaded_at: DateTime<Utc>",
                photo_uploaded_by,
                created_at        as "created_at!: DateTime<Utc>",
                updated_at        as "updated_at!: DateTime<Utc>"
            "#,
            id,
            data.job_no,
            data.job_status,
            data.pm,
            data.date,
            data.client_id,
            data.description,
            data.job_type,
            data.department,
            data.linked_job_ref,
            data.cost_nett,
            data.quote_ref,
            data.job_complete,
            data.invoiced,
            data.job_comments,
            data.purchase_order,
            data.attachments,
            data.invoice_comments,
            completion_photos,
            data.photo_uploaded_at,
            data.photo_uploaded_by
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query!("DELETE FROM jobs WHERE id = $1", id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

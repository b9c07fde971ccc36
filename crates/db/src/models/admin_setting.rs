use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Key/value configuration edited from the admin settings page
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AdminSetting {
    pub id: Uuid,
    pub setting_key: String,
    pub setting_value: Option<String>,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminSetting {
    pub setting_key: String,
    pub setting_value: Option<String>,
    pub description: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminSetting {
    pub setting_value: Option<String>,
    pub description: Option<String>,
    pub updated_by: Option<String>,
}

impl AdminSetting {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as!(
            AdminSetting,
            r#"
            SELECT
                id            as "id!: Uuid",
                setting_key,
                setting_value,
                description,
                updated_at    as "updated_at!: DateTime<Utc>",
                updated_by
            FROM admin_settings
            ORDER BY setting_key ASC
            "#
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_key(pool: &SqlitePool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            AdminSetting,
            r#"
            SELECT
                id            as "id!: Uuid",
                setting_key,
                setting_value,
                description,
                updated_at    as "updated_at!: DateTime<Utc>",
                updated_by
            FROM admin_settings
            WHERE setting_key = $1
            "#,
            key
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateAdminSetting,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as!(
            AdminSetting,
            r#"
            INSERT INTO admin_settings (id, setting_key, setting_value, description, updated_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id            as "id!: Uuid",
                setting_key,
                setting_value,
                description,
                updated_at    as "updated_at!: DateTime<Utc>",
                updated_by
            "#,
            id,
            data.setting_key,
            data.setting_value,
            data.description,
            data.updated_by
        )
        .fetch_one(pool)
        .await
    }

    pub async fn update_by_key(
        pool: &SqlitePool,
        key: &str,
        data: &UpdateAdminSetting,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            AdminSetting,
            r#"
            UPDATE admin_settings SET
                setting_value = COALESCE($2, setting_value),
                description = COALESCE($3, description),
                updated_by = COALESCE($4, updated_by),
                updated_at = datetime('now', 'subsec')
            WHERE setting_key = $1
            RETURNING
                id            as "id!: Uuid",
                setting_key,
                setting_value,
                description,
                updated_at    as "updated_at!: DateTime<Utc>",
                updated_by
            "#,
            key,
            data.setting_value,
            data.description,
            data.updated_by
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_by_key(pool: &SqlitePool, key: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query!("DELETE FROM admin_settings WHERE setting_key = $1", key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn setting(key: &str, value: &str) -> CreateAdminSetting {
        CreateAdminSetting {
            setting_key: key.to_string(),
            setting_value: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_by_key_keeps_unset_fields() {
        let db = DBService::new_in_memory().await.unwrap();
        AdminSetting::create(&db.pool, Uuid::new_v4(), &CreateAdminSetting {
            description: Some("Default VAT".to_string()),
            ..setting("vat_rate", "20")
        })
        .await
        .unwrap();

        let updated = AdminSetting::update_by_key(
            &db.pool,
            "vat_rate",
            &UpdateAdminSetting {
                setting_value: Some("17.5".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.setting_value.as_deref(), Some("17.5"));
        assert_eq!(updated.description.as_deref(), Some("Default VAT"));

        let missing = AdminSetting::update_by_key(&db.pool, "nope", &UpdateAdminSetting::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_unique_and_sorted() {
        let db = DBService::new_in_memory().await.unwrap();
        AdminSetting::create(&db.pool, Uuid::new_v4(), &setting("site_name", "Depot"))
            .await
            .unwrap();
        AdminSetting::create(&db.pool, Uuid::new_v4(), &setting("currency", "GBP"))
            .await
            .unwrap();

        let err = AdminSetting::create(&db.pool, Uuid::new_v4(), &setting("currency", "EUR"))
            .await
            .unwrap_err();
        assert!(
            err.as_database_error()
                .is_some_and(|e| e.is_unique_violation())
        );

        let keys: Vec<_> = AdminSetting::find_all(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.setting_key)
            .collect();
        assert_eq!(keys, vec!["currency", "site_name"]);

        assert_eq!(AdminSetting::delete_by_key(&db.pool, "currency").await.unwrap(), 1);
        assert!(AdminSetting::find_by_key(&db.pool, "currency").await.unwrap().is_none());
    }
}

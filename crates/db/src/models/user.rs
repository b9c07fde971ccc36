use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

impl User {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as!(
            User,
            r#"
            SELECT
                id            as "id!: Uuid",
                username,
                password_hash,
                role,
                email,
                first_name,
                last_name,
                is_active     as "is_active!: bool",
                created_at    as "created_at!: DateTime<Utc>",
                last_login    as "last_login: DateTime<Utc>"
            FROM users
            ORDER BY created_at ASC, rowid ASC
            "#
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            User,
            r#"
            SELECT
                id            as "id!: Uuid",
                username,
                password_hash,
                role,
                email,
                first_name,
                last_name,
                is_active     as "is_active!: bool",
                created_at    as "created_at!: DateTime<Utc>",
                last_login    as "last_login: DateTime<Utc>"
            FROM users
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            User,
            r#"
            SELECT
                id            as "id!: Uuid",
                username,
                password_hash,
                role,
                email,
                first_name,
                last_name,
                is_active     as "is_active!: bool",
                created_at    as "created_at!: DateTime<Utc>",
                last_login    as "last_login: DateTime<Utc>"
            FROM users
            WHERE username = $1
            "#,
            username
        )
        .fetch_optional(pool)
        .await
    }

    /// `password_hash` is stored as given; hashing happens before this call.
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateUser,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        let role = data.role.as_deref().unwrap_or("User");
        let is_active = data.is_active.unwrap_or(true);
        sqlx::query_as!(
            User,
            r#"
            INSERT INTO users (id, username, password_hash, role, email, first_name, last_name, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id            as "id!: Uuid",
                username,
                password_hash,
                role,
                email,
                first_name,
                last_name,
                is_active     as "is_active!: bool",
                created_at    as "created_at!: DateTime<Utc>",
                last_login    as "last_login: DateTime<Utc>"
            "#,
            id,
            data.username,
            password_hash,
            role,
            data.email,
            data.first_name,
            data.last_name,
            is_active
        )
        .fetch_one(pool)
        .await
    }

    /// The stored hash is replaced only when `password_hash` is `Some`.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateUser,
        password_hash: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            User,
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role),
                email = COALESCE($5, email),
                first_name = COALESCE($6, first_name),
                last_name = COALESCE($7, last_name),
                is_active = COALESCE($8, is_active)
            WHERE id = $1
            RETURNING
                id            as "id!: Uuid",
                username,
                password_hash,
                role,
                email,
                first_name,
                last_name,
                is_active     as "is_active!: bool",
                created_at    as "created_at!: DateTime<Utc>",
                last_login    as "last_login: DateTime<Utc>"
            "#,
            id,
            data.username,
            password_hash,
            data.role,
            data.email,
            data.first_name,
            data.last_name,
            data.is_active
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query!("DELETE FROM users WHERE id = $1", id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn jsmith() -> CreateUser {
        CreateUser {
            username: "jsmith".to_string(),
            password: "hunter2".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_password_never_serialized() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = User::create(&db.pool, Uuid::new_v4(), &jsmith(), "$2b$04$stored")
            .await
            .unwrap();

        assert_eq!(user.role, "User");
        assert!(user.is_active);
        assert_eq!(user.password_hash, "$2b$04$stored");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "jsmith");
    }

    #[tokio::test]
    async fn test_update_replaces_hash_only_when_given() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = User::create(&db.pool, Uuid::new_v4(), &jsmith(), "old-hash")
            .await
            .unwrap();

        let renamed = User::update(
            &db.pool,
            user.id,
            &UpdateUser {
                role: Some("Admin".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(renamed.password_hash, "old-hash");
        assert_eq!(renamed.role, "Admin");

        let rekeyed = User::update(&db.pool, user.id, &UpdateUser::default(), Some("new-hash"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rekeyed.password_hash, "new-hash");
        assert_eq!(rekeyed.role, "Admin");
    }
}

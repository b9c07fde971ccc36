//! The storage contract the HTTP layer is written against, and its SQLite
//! implementation.

use async_trait::async_trait;
use db::{
    DBService,
    models::{
        admin_setting::{AdminSetting, CreateAdminSetting, UpdateAdminSetting},
        client::{Client, ClientStatus, CreateClient, UpdateClient},
        job::{CreateJob, Job, JobFilter, UpdateJob},
        job_item::{CreateJobItem, JobItem, UpdateJobItem},
        user::{CreateUser, UpdateUser, User},
    },
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{
    job_numbers::{JobNumberAllocator, JobNumberError, format_job_code, resolve_department},
    password::{PasswordError, hash_password},
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error(transparent)]
    JobNumber(#[from] JobNumberError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StorageError::Conflict(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StorageError::InvalidReference(db_err.message().to_string());
            }
        }
        StorageError::Database(err)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), StorageError> {
    if value.trim().is_empty() {
        return Err(StorageError::MissingField(field));
    }
    Ok(())
}

/// Like [`require`], for partial updates where `None` means "leave as is".
fn require_if_set(value: Option<&str>, field: &'static str) -> Result<(), StorageError> {
    value.map_or(Ok(()), |v| require(v, field))
}

fn found<T>(record: Option<T>, entity: &'static str) -> Result<T, StorageError> {
    record.ok_or(StorageError::NotFound(entity))
}

fn deleted(rows_affected: u64, entity: &'static str) -> Result<(), StorageError> {
    if rows_affected == 0 {
        return Err(StorageError::NotFound(entity));
    }
    Ok(())
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
    async fn create_user(&self, data: &CreateUser) -> Result<User, StorageError>;
    async fn update_user(&self, id: Uuid, data: &UpdateUser) -> Result<User, StorageError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), StorageError>;

    async fn list_admin_settings(&self) -> Result<Vec<AdminSetting>, StorageError>;
    async fn get_admin_setting(&self, key: &str) -> Result<Option<AdminSetting>, StorageError>;
    async fn create_admin_setting(
        &self,
        data: &CreateAdminSetting,
    ) -> Result<AdminSetting, StorageError>;
    async fn update_admin_setting(
        &self,
        key: &str,
        data: &UpdateAdminSetting,
    ) -> Result<AdminSetting, StorageError>;
    async fn delete_admin_setting(&self, key: &str) -> Result<(), StorageError>;

    /// Active clients only.
    async fn list_clients(&self) -> Result<Vec<Client>, StorageError>;
    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, StorageError>;
    async fn create_client(&self, data: &CreateClient) -> Result<Client, StorageError>;
    async fn update_client(&self, id: Uuid, data: &UpdateClient) -> Result<Client, StorageError>;
    async fn delete_client(&self, id: Uuid) -> Result<(), StorageError>;
    async fn set_client_status(
        &self,
        id: Uuid,
        status: ClientStatus,
    ) -> Result<Client, StorageError>;

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StorageError>;
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StorageError>;
    /// Allocates the job number and code and inserts the job atomically.
    async fn create_job(&self, data: &CreateJob) -> Result<Job, StorageError>;
    async fn update_job(&self, id: Uuid, data: &UpdateJob) -> Result<Job, StorageError>;
    async fn delete_job(&self, id: Uuid) -> Result<(), StorageError>;

    async fn next_job_number(&self) -> Result<i64, StorageError>;
    fn generate_job_les(&self, job_number: i64, department: Option<&str>) -> String;

    async fn list_job_items(&self, job_id: Uuid) -> Result<Vec<JobItem>, StorageError>;
    async fn create_job_item(
        &self,
        job_id: Uuid,
        data: &CreateJobItem,
    ) -> Result<JobItem, StorageError>;
    async fn update_job_item(
        &self,
        id: Uuid,
        data: &UpdateJobItem,
    ) -> Result<JobItem, StorageError>;
    async fn delete_job_item(&self, id: Uuid) -> Result<(), StorageError>;
    /// Swap every item of a job for `items` in one transaction.
    async fn replace_job_items(
        &self,
        job_id: Uuid,
        items: &[CreateJobItem],
    ) -> Result<Vec<JobItem>, StorageError>;
}

#[derive(Clone)]
pub struct DbStorage {
    db: DBService,
    allocator: JobNumberAllocator,
}

impl DbStorage {
    pub fn new(db: DBService) -> Self {
        let allocator = JobNumberAllocator::new(db.pool.clone());
        Self { db, allocator }
    }
}

#[async_trait]
impl Storage for DbStorage {
    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        Ok(User::find_all(&self.db.pool).await?)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(User::find_by_id(&self.db.pool, id).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(User::find_by_username(&self.db.pool, username).await?)
    }

    async fn create_user(&self, data: &CreateUser) -> Result<User, StorageError> {
        require(&data.username, "username")?;
        require(&data.password, "password")?;
        let password_hash = hash_password(&data.password).await?;
        let user = User::create(&self.db.pool, Uuid::new_v4(), data, &password_hash).await?;
        info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, data: &UpdateUser) -> Result<User, StorageError> {
        require_if_set(data.username.as_deref(), "username")?;
        require_if_set(data.password.as_deref(), "password")?;
        let password_hash = match &data.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };
        found(
            User::update(&self.db.pool, id, data, password_hash.as_deref()).await?,
            "User",
        )
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StorageError> {
        deleted(User::delete(&self.db.pool, id).await?, "User")
    }

    async fn list_admin_settings(&self) -> Result<Vec<AdminSetting>, StorageError> {
        Ok(AdminSetting::find_all(&self.db.pool).await?)
    }

    async fn get_admin_setting(&self, key: &str) -> Result<Option<AdminSetting>, StorageError> {
        Ok(AdminSetting::find_by_key(&self.db.pool, key).await?)
    }

    async fn create_admin_setting(
        &self,
        data: &CreateAdminSetting,
    ) -> Result<AdminSetting, StorageError> {
        require(&data.setting_key, "settingKey")?;
        Ok(AdminSetting::create(&self.db.pool, Uuid::new_v4(), data).await?)
    }

    async fn update_admin_setting(
        &self,
        key: &str,
        data: &UpdateAdminSetting,
    ) -> Result<AdminSetting, StorageError> {
        found(
            AdminSetting::update_by_key(&self.db.pool, key, data).await?,
            "Setting",
        )
    }

    async fn delete_admin_setting(&self, key: &str) -> Result<(), StorageError> {
        deleted(
            AdminSetting::delete_by_key(&self.db.pool, key).await?,
            "Setting",
        )
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StorageError> {
        Ok(Client::find_all_active(&self.db.pool).await?)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, StorageError> {
        Ok(Client::find_by_id(&self.db.pool, id).await?)
    }

    async fn create_client(&self, data: &CreateClient) -> Result<Client, StorageError> {
        require(&data.company_name, "companyName")?;
        let client = Client::create(&self.db.pool, Uuid::new_v4(), data).await?;
        info!(client_id = %client.id, company_name = %client.company_name, "Created client");
        Ok(client)
    }

    async fn update_client(&self, id: Uuid, data: &UpdateClient) -> Result<Client, StorageError> {
        require_if_set(data.company_name.as_deref(), "companyName")?;
        found(Client::update(&self.db.pool, id, data).await?, "Client")
    }

    async fn delete_client(&self, id: Uuid) -> Result<(), StorageError> {
        match Client::delete(&self.db.pool, id).await.map_err(StorageError::from) {
            Ok(rows) => deleted(rows, "Client"),
            Err(StorageError::InvalidReference(_)) => Err(StorageError::Conflict(
                "client still has jobs".to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    async fn set_client_status(
        &self,
        id: Uuid,
        status: ClientStatus,
    ) -> Result<Client, StorageError> {
        found(Client::set_status(&self.db.pool, id, status).await?, "Client")
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StorageError> {
        Ok(Job::find_all(&self.db.pool, filter).await?)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StorageError> {
        Ok(Job::find_by_id(&self.db.pool, id).await?)
    }

    async fn create_job(&self, data: &CreateJob) -> Result<Job, StorageError> {
        let department = resolve_department(data);

        // The counter increment and the insert commit or roll back together,
        // so a failed insert never spends a number.
        let mut tx = self.db.pool.begin().await?;
        let code = JobNumberAllocator::allocate(&mut tx, &department).await?;
        let job = Job::create(&mut *tx, Uuid::new_v4(), data, &code).await?;
        tx.commit().await?;

        info!(
            job_id = %job.id,
            job_number = job.job_number,
            job_les = %job.job_les,
            department = %department,
            "Created job"
        );
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, data: &UpdateJob) -> Result<Job, StorageError> {
        found(Job::update(&self.db.pool, id, data).await?, "Job")
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), StorageError> {
        deleted(Job::delete(&self.db.pool, id).await?, "Job")
    }

    async fn next_job_number(&self) -> Result<i64, StorageError> {
        Ok(self.allocator.next_job_number().await?)
    }

    fn generate_job_les(&self, job_number: i64, department: Option<&str>) -> String {
        format_job_code(job_number, department)
    }

    async fn list_job_items(&self, job_id: Uuid) -> Result<Vec<JobItem>, StorageError> {
        Ok(JobItem::find_by_job_id(&self.db.pool, job_id).await?)
    }

    async fn create_job_item(
        &self,
        job_id: Uuid,
        data: &CreateJobItem,
    ) -> Result<JobItem, StorageError> {
        require(&data.item_description, "itemDescription")?;
        Ok(JobItem::create(&self.db.pool, Uuid::new_v4(), job_id, data).await?)
    }

    async fn update_job_item(
        &self,
        id: Uuid,
        data: &UpdateJobItem,
    ) -> Result<JobItem, StorageError> {
        require_if_set(data.item_description.as_deref(), "itemDescription")?;
        found(JobItem::update(&self.db.pool, id, data).await?, "Job item")
    }

    async fn delete_job_item(&self, id: Uuid) -> Result<(), StorageError> {
        deleted(JobItem::delete(&self.db.pool, id).await?, "Job item")
    }

    async fn replace_job_items(
        &self,
        job_id: Uuid,
        items: &[CreateJobItem],
    ) -> Result<Vec<JobItem>, StorageError> {
        for item in items {
            require(&item.item_description, "itemDescription")?;
        }
        if Job::find_by_id(&self.db.pool, job_id).await?.is_none() {
            return Err(StorageError::NotFound("Job"));
        }

        let mut tx = self.db.pool.begin().await?;
        let removed = JobItem::delete_by_job_id(&mut *tx, job_id).await?;
        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            saved.push(JobItem::create(&mut *tx, Uuid::new_v4(), job_id, item).await?);
        }
        tx.commit().await?;

        info!(job_id = %job_id, removed, saved = saved.len(), "Replaced job items");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use db::models::job_counter::JobCounter;

    use super::*;

    async fn storage() -> DbStorage {
        DbStorage::new(DBService::new_in_memory().await.unwrap())
    }

    fn job_in(department: Option<&str>) -> CreateJob {
        CreateJob {
            department: department.map(str::to_string),
            description: Some("Generator hire".to_string()),
            ..Default::default()
        }
    }

    fn item(description: &str) -> CreateJobItem {
        CreateJobItem {
            item_description: description.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_shared_counter_across_departments() {
        let storage = storage().await;
        let mut codes = Vec::new();
        for department in ["HIRE", "SALES", "HIRE"] {
            let job = storage.create_job(&job_in(Some(department))).await.unwrap();
            codes.push((job.job_number, job.job_les));
        }
        assert_eq!(
            codes,
            vec![
                (1, "LEH000001".to_string()),
                (2, "LES000002".to_string()),
                (3, "LEH000003".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_job_department_resolution() {
        let storage = storage().await;

        let general = storage.create_job(&job_in(None)).await.unwrap();
        assert_eq!(general.job_les, "LEG000001");
        assert_eq!(general.department.as_deref(), Some("GENERAL"));

        let typed = storage
            .create_job(&CreateJob {
                job_type: Some("Transport".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(typed.job_les, "LEX000002");
        assert_eq!(typed.department.as_deref(), Some("TRANSPORT"));

        let lowercase = storage.create_job(&job_in(Some("testing"))).await.unwrap();
        assert_eq!(lowercase.job_les, "LET000003");
        assert_eq!(lowercase.department.as_deref(), Some("testing"));

        let unknown = storage.create_job(&job_in(Some("Marketing"))).await.unwrap();
        assert_eq!(unknown.job_les, "LEG000004");
        assert_eq!(unknown.department.as_deref(), Some("Marketing"));
    }

    #[tokio::test]
    async fn test_failed_job_insert_does_not_spend_number() {
        let storage = storage().await;
        storage.create_job(&job_in(Some("HIRE"))).await.unwrap();

        let bad = CreateJob {
            client_id: Some(Uuid::new_v4()),
            ..job_in(Some("SALES"))
        };
        let err = storage.create_job(&bad).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidReference(_)));
        assert_eq!(JobCounter::current(&storage.db.pool).await.unwrap(), 1);

        let next = storage.create_job(&job_in(Some("SALES"))).await.unwrap();
        assert_eq!(next.job_les, "LES000002");
        assert_eq!(storage.list_jobs(&JobFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_department_edit_keeps_original_job_les() {
        let storage = storage().await;
        let job = storage.create_job(&job_in(Some("HIRE"))).await.unwrap();

        let updated = storage
            .update_job(
                job.id,
                &UpdateJob {
                    department: Some("SALES".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.department.as_deref(), Some("SALES"));
        assert_eq!(updated.job_les, "LEH000001");
        assert_eq!(updated.job_number, 1);
    }

    #[tokio::test]
    async fn test_concurrent_job_creation_yields_distinct_codes() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("jobs.db").display());
        let storage = DbStorage::new(DBService::new(&url, 4).await.unwrap());

        let handles: Vec<_> = (0..12)
            .map(|i| {
                let storage = storage.clone();
                let department = if i % 2 == 0 { "HIRE" } else { "SALES" };
                tokio::spawn(async move { storage.create_job(&job_in(Some(department))).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in futures::future::join_all(handles).await {
            numbers.push(handle.unwrap().unwrap().job_number);
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_generate_job_les_and_next_number() {
        let storage = storage().await;
        assert_eq!(storage.next_job_number().await.unwrap(), 1);
        assert_eq!(storage.generate_job_les(2, Some("engineering")), "LEE000002");
        let job = storage.create_job(&job_in(Some("ENGINEERING"))).await.unwrap();
        assert_eq!(job.job_les, "LEE000002");
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let storage = storage().await;
        let id = Uuid::new_v4();
        assert!(matches!(
            storage.update_job(id, &UpdateJob::default()).await,
            Err(StorageError::NotFound("Job"))
        ));
        assert!(matches!(
            storage.delete_user(id).await,
            Err(StorageError::NotFound("User"))
        ));
        assert!(matches!(
            storage.delete_admin_setting("missing").await,
            Err(StorageError::NotFound("Setting"))
        ));
        assert!(storage.get_client(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let storage = storage().await;
        let data = CreateUser {
            username: "amy".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        storage.create_user(&data).await.unwrap();
        assert!(matches!(
            storage.create_user(&data).await,
            Err(StorageError::Conflict(_))
        ));
        assert!(storage.get_user_by_username("amy").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_blank_required_fields_are_rejected() {
        let storage = storage().await;
        assert!(matches!(
            storage.create_client(&CreateClient::default()).await,
            Err(StorageError::MissingField("companyName"))
        ));
        assert!(matches!(
            storage
                .create_admin_setting(&CreateAdminSetting::default())
                .await,
            Err(StorageError::MissingField("settingKey"))
        ));
    }

    #[tokio::test]
    async fn test_blank_required_fields_are_rejected_on_update() {
        let storage = storage().await;
        let user = storage
            .create_user(&CreateUser {
                username: "amy".to_string(),
                password: "secret".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let client = storage
            .create_client(&CreateClient {
                company_name: "Acme Plant".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let job = storage.create_job(&job_in(Some("HIRE"))).await.unwrap();
        let job_item = storage.create_job_item(job.id, &item("Generator")).await.unwrap();

        assert!(matches!(
            storage
                .update_user(
                    user.id,
                    &UpdateUser {
                        username: Some(String::new()),
                        ..Default::default()
                    },
                )
                .await,
            Err(StorageError::MissingField("username"))
        ));
        assert!(matches!(
            storage
                .update_user(
                    user.id,
                    &UpdateUser {
                        password: Some("  ".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(StorageError::MissingField("password"))
        ));
        assert!(matches!(
            storage
                .update_client(
                    client.id,
                    &UpdateClient {
                        company_name: Some("   ".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(StorageError::MissingField("companyName"))
        ));
        assert!(matches!(
            storage
                .update_job_item(
                    job_item.id,
                    &UpdateJobItem {
                        item_description: Some("\t".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(StorageError::MissingField("itemDescription"))
        ));

        assert_eq!(storage.get_user(user.id).await.unwrap().unwrap().username, "amy");
        assert_eq!(
            storage.get_client(client.id).await.unwrap().unwrap().company_name,
            "Acme Plant"
        );
        let renamed = storage
            .update_client(
                client.id,
                &UpdateClient {
                    company_name: Some("Acme Plant Hire".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.company_name, "Acme Plant Hire");
    }

    #[tokio::test]
    async fn test_passwords_are_stored_as_bcrypt_hashes() {
        let storage = storage().await;
        let user = storage
            .create_user(&CreateUser {
                username: "amy".to_string(),
                password: "secret".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(bcrypt::verify("secret", &user.password_hash).unwrap());

        let renamed = storage
            .update_user(
                user.id,
                &UpdateUser {
                    username: Some("amy.b".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.password_hash, user.password_hash);

        let rekeyed = storage
            .update_user(
                user.id,
                &UpdateUser {
                    password: Some("changed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(bcrypt::verify("changed", &rekeyed.password_hash).unwrap());
        assert!(!bcrypt::verify("secret", &rekeyed.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_delete_client_with_jobs_conflicts() {
        let storage = storage().await;
        let client = storage
            .create_client(&CreateClient {
                company_name: "Acme Plant".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        storage
            .create_job(&CreateJob {
                client_id: Some(client.id),
                ..job_in(Some("HIRE"))
            })
            .await
            .unwrap();

        assert!(matches!(
            storage.delete_client(client.id).await,
            Err(StorageError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_job_items() {
        let storage = storage().await;
        let job = storage.create_job(&job_in(Some("HIRE"))).await.unwrap();
        storage.create_job_item(job.id, &item("Old lighting tower")).await.unwrap();

        let saved = storage
            .replace_job_items(job.id, &[item("Generator 20kVA"), item("Fuel bowser")])
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);

        let items = storage.list_job_items(job.id).await.unwrap();
        let descriptions: Vec<_> = items.iter().map(|i| i.item_description.as_str()).collect();
        assert_eq!(descriptions, vec!["Generator 20kVA", "Fuel bowser"]);

        assert!(matches!(
            storage.replace_job_items(Uuid::new_v4(), &[item("x")]).await,
            Err(StorageError::NotFound("Job"))
        ));
    }

    #[tokio::test]
    async fn test_replace_job_items_is_all_or_nothing() {
        let storage = storage().await;
        let job = storage.create_job(&job_in(Some("HIRE"))).await.unwrap();
        storage.create_job_item(job.id, &item("Keep me")).await.unwrap();

        let err = storage
            .replace_job_items(job.id, &[item("Fine"), item("   ")])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingField("itemDescription")));

        let items = storage.list_job_items(job.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_description, "Keep me");
    }
}

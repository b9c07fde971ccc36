use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::input::OptionalDecimal;

/// Review state of a client's credit application
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub company_name: String,
    pub trading_name: Option<String>,
    pub company_reg_no: Option<String>,
    pub company_vat_no: Option<String>,
    pub parent_company: Option<String>,
    pub years_trading: Option<i64>,
    pub business_type: String,
    pub invoice_address: Option<String>,
    pub delivery_address: Option<String>,
    pub telephone: Option<String>,
    pub delivery_telephone: Option<String>,
    pub email: Option<String>,
    pub delivery_email: Option<String>,
    pub nature_of_business: Option<String>,
    pub number_of_employees: Option<i64>,
    pub director_name: Option<String>,
    pub p_ledger_name: Option<String>,
    pub p_ledger_tel: Option<String>,
    pub p_ledger_email: Option<String>,
    pub trade_ref1_name: Option<String>,
    pub trade_ref1_phone: Option<String>,
    pub trade_ref1_website: Option<String>,
    pub trade_ref2_name: Option<String>,
    pub trade_ref2_phone: Option<String>,
    pub trade_ref2_website: Option<String>,
    pub credit_application_amount: Option<String>,
    pub bank_name: Option<String>,
    pub bank_sort_code: Option<String>,
    pub bank_post_code: Option<String>,
    pub bank_account_no: Option<String>,
    pub electronic_invoices: bool,
    pub active: bool,
    pub status: ClientStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credit application form. Every field other than `company_name` is optional.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetails {
    pub trading_name: Option<String>,
    pub company_reg_no: Option<String>,
    pub company_vat_no: Option<String>,
    pub parent_company: Option<String>,
    pub years_trading: Option<i64>,
    pub business_type: Option<String>,
    pub invoice_address: Option<String>,
    pub delivery_address: Option<String>,
    pub telephone: Option<String>,
    pub delivery_telephone: Option<String>,
    pub email: Option<String>,
    pub delivery_email: Option<String>,
    pub nature_of_business: Option<String>,
    pub number_of_employees: Option<i64>,
    pub director_name: Option<String>,
    pub p_ledger_name: Option<String>,
    pub p_ledger_tel: Option<String>,
    pub p_ledger_email: Option<String>,
    pub trade_ref1_name: Option<String>,
    pub trade_ref1_phone: Option<String>,
    pub trade_ref1_website: Option<String>,
    pub trade_ref2_name: Option<String>,
    pub trade_ref2_phone: Option<String>,
    pub trade_ref2_website: Option<String>,
    #[serde_as(as = "OptionalDecimal")]
    #[serde(default)]
    #[ts(type = "string | null")]
    pub credit_application_amount: Option<String>,
    pub bank_name: Option<String>,
    pub bank_sort_code: Option<String>,
    pub bank_post_code: Option<String>,
    pub bank_account_no: Option<String>,
    pub electronic_invoices: Option<bool>,
    pub active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub company_name: String,
    #[serde(flatten)]
    #[ts(flatten)]
    pub details: ClientDetails,
}

/// Partial update of the application form. Status changes go through the
/// approve/reject workflow instead.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    pub company_name: Option<String>,
    #[serde(flatten)]
    #[ts(flatten)]
    pub details: ClientDetails,
}

impl Client {
    pub async fn find_all_active(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as!(
            Client,
            r#"
            SELECT
                id                  as "id!: Uuid",
                company_name,
                trading_name,
                company_reg_no,
                company_vat_no,
                parent_company,
                years_trading,
                business_type,
                invoice_address,
                delivery_address,
                telephone,
                delivery_telephone,
                email,
                delivery_email,
                nature_of_business,
                number_of_employees,
                director_name,
                p_ledger_name,
                p_ledger_tel,
                p_ledger_email,
                trade_ref1_name,
                trade_ref1_phone,
                trade_ref1_website,
                trade_ref2_name,
                trade_ref2_phone,
                trade_ref2_website,
                credit_application_amount,
                bank_name,
                bank_sort_code,
                bank_post_code,
                bank_account_no,
                electronic_invoices as "electronic_invoices!: bool",
                active              as "active!: bool",
                status              as "status!: ClientStatus",
                approved_at         as "approved_at: DateTime<Utc>",
                rejected_at         as "rejected_at: DateTime<Utc>",
                notes,
                created_at          as "created_at!: DateTime<Utc>",
                updated_at          as "updated_at!: DateTime<Utc>"
            FROM clients
            WHERE active = 1
            ORDER BY company_name COLLATE NOCASE ASC
            "#
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            Client,
            r#"
            SELECT
                id                  as "id!: Uuid",
                company_name,
                trading_name,
                company_reg_no,
                company_vat_no,
                parent_company,
                years_trading,
                business_type,
                invoice_address,
                delivery_address,
                telephone,
                delivery_telephone,
                email,
                delivery_email,
                nature_of_business,
                number_of_employees,
                director_name,
                p_ledger_name,
                p_ledger_tel,
                p_ledger_email,
                trade_ref1_name,
                trade_ref1_phone,
                trade_ref1_website,
                trade_ref2_name,
                trade_ref2_phone,
                trade_ref2_website,
                credit_application_amount,
                bank_name,
                bank_sort_code,
                bank_post_code,
                bank_account_no,
                electronic_invoices as "electronic_invoices!: bool",
                active              as "active!: bool",
                status              as "status!: ClientStatus",
                approved_at         as "approved_at: DateTime<Utc>",
                rejected_at         as "rejected_at: DateTime<Utc>",
                notes,
                created_at          as "created_at!: DateTime<Utc>",
                updated_at          as "updated_at!: DateTime<Utc>"
            FROM clients
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateClient,
    ) -> Result<Self, sqlx::Error> {
        let d = &data.details;
        let business_type = d.business_type.as_deref().unwrap_or("Limited Company");
        let electronic_invoices = d.electronic_invoices.unwrap_or(false);
        let active = d.active.unwrap_or(true);
        sqlx::query_as!(
            Client,
            r#"
            INSERT INTO clients (
                id, company_name, trading_name, company_reg_no, company_vat_no, parent_company,
                years_trading, business_type, invoice_address, delivery_address, telephone,
                delivery_telephone, email, delivery_email, nature_of_business,
                number_of_employees, director_name, p_ledger_name, p_ledger_tel,
                p_ledger_email, trade_ref1_name, trade_ref1_phone, trade_ref1_website,
                trade_ref2_name, trade_ref2_phone, trade_ref2_website,
                credit_application_amount, bank_name, bank_sort_code, bank_post_code,
                bank_account_no, electronic_invoices, active, notes
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32,
                $33, $34
            )
            RETURNING
                id                  as "id!: Uuid",
                company_name,
                trading_name,
                company_reg_no,
                company_vat_no,
                parent_company,
                years_trading,
                business_type,
                invoice_address,
                delivery_address,
                telephone,
                delivery_telephone,
                email,
                delivery_email,
                nature_of_business,
                number_of_employees,
                director_name,
                p_ledger_name,
                p_ledger_tel,
                p_ledger_email,
                trade_ref1_name,
                trade_ref1_phone,
                trade_ref1_website,
                trade_ref2_name,
                trade_ref2_phone,
                trade_ref2_website,
                credit_application_amount,
                bank_name,
                bank_sort_code,
                bank_post_code,
                bank_account_no,
                electronic_invoices as "electronic_invoices!: bool",
                active              as "active!: bool",
                status              as "status!: ClientStatus",
                approved_at         as "approved_at: DateTime<Utc>",
                rejected_at         as "rejected_at: DateTime<Utc>",
                notes,
                created_at          as "created_at!: DateTime<Utc>",
                updated_at          as "updated_at!: DateTime<Utc>"
            "#,
            id,
            data.company_name,
            d.trading_name,
            d.company_reg_no,
            d.company_vat_no,
            d.parent_company,
            d.years_trading,
            business_type,
            d.invoice_address,
            d.delivery_address,
            d.telephone,
            d.delivery_telephone,
            d.email,
            d.delivery_email,
            d.nature_of_business,
            d.number_of_employees,
            d.director_name,
            d.p_ledger_name,
            d.p_ledger_tel,
            d.p_ledger_email,
            d.trade_ref1_name,
            d.trade_ref1_phone,
            d.trade_ref1_website,
            d.trade_ref2_name,
            d.trade_ref2_phone,
            d.trade_ref2_website,
            d.credit_application_amount,
            d.bank_name,
            d.bank_sort_code,
            d.bank_post_code,
            d.bank_account_no,
            electronic_invoices,
            active,
            d.notes
        )
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        let d = &data.details;
        sqlx::query_as!(
            Client,
            r#"
            UPDATE clients SET
                company_name = COALESCE($2, company_name),
                trading_name = COALESCE($3, trading_name),
                company_reg_no = COALESCE($4, company_reg_no),
                company_vat_no = COALESCE($5, company_vat_no),
                parent_company = COALESCE($6, parent_company),
                years_trading = COALESCE($7, years_trading),
                business_type = COALESCE($8, business_type),
                invoice_address = COALESCE($9, invoice_address),
                delivery_address = COALESCE($10, delivery_address),
                telephone = COALESCE($11, telephone),
                delivery_telephone = COALESCE($12, delivery_telephone),
                email = COALESCE($13, email),
                delivery_email = COALESCE($14, delivery_email),
                nature_of_business = COALESCE($15, nature_of_business),
                number_of_employees = COALESCE($16, number_of_employees),
                director_name = COALESCE($17, director_name),
                p_ledger_name = COALESCE($18, p_ledger_name),
                p_ledger_tel = COALESCE($19, p_ledger_tel),
                p_ledger_email = COALESCE($20, p_ledger_email),
                trade_ref1_name = COALESCE($21, trade_ref1_name),
                trade_ref1_phone = COALESCE($22, trade_ref1_phone),
                trade_ref1_website = COALESCE($23, trade_ref1_website),
                trade_ref2_name = COALESCE($24, trade_ref2_name),
                trade_ref2_phone = COALESCE($25, trade_ref2_phone),
                trade_ref2_website = COALESCE($26, trade_ref2_website),
                credit_application_amount = COALESCE($27, credit_application_amount),
                bank_name = COALESCE($28, bank_name),
                bank_sort_code = COALESCE($29, bank_sort_code),
                bank_post_code = COALESCE($30, bank_post_code),
                bank_account_no = COALESCE($31, bank_account_no),
                electronic_invoices = COALESCE($32, electronic_invoices),
                active = COALESCE($33, active),
                notes = COALESCE($34, notes),
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING
                id                  as "id!: Uuid",
                company_name,
                trading_name,
                company_reg_no,
                company_vat_no,
                parent_company,
                years_trading,
                business_type,
                invoice_address,
                delivery_address,
                telephone,
                delivery_telephone,
                email,
                delivery_email,
                nature_of_business,
                number_of_employees,
                director_name,
                p_ledger_name,
                p_ledger_tel,
                p_ledger_email,
                trade_ref1_name,
                trade_ref1_phone,
                trade_ref1_website,
                trade_ref2_name,
                trade_ref2_phone,
                trade_ref2_website,
                credit_application_amount,
                bank_name,
                bank_sort_code,
                bank_post_code,
                bank_account_no,
                electronic_invoices as "electronic_invoices!: bool",
                active              as "active!: bool",
                status              as "status!: ClientStatus",
                approved_at         as "approved_at: DateTime<Utc>",
                rejected_at         as "rejected_at: DateTime<Utc>",
                notes,
                created_at          as "created_at!: DateTime<Utc>",
                updated_at          as "updated_at!: DateTime<Utc>"
            "#,
            id,
            data.company_name,
            d.trading_name,
            d.company_reg_no,
            d.company_vat_no,
            d.parent_company,
            d.years_trading,
            d.business_type,
            d.invoice_address,
            d.delivery_address,
            d.telephone,
            d.delivery_telephone,
            d.email,
            d.delivery_email,
            d.nature_of_business,
            d.number_of_employees,
            d.director_name,
            d.p_ledger_name,
            d.p_ledger_tel,
            d.p_ledger_email,
            d.trade_ref1_name,
            d.trade_ref1_phone,
            d.trade_ref1_website,
            d.trade_ref2_name,
            d.trade_ref2_phone,
            d.trade_ref2_website,
            d.credit_application_amount,
            d.bank_name,
            d.bank_sort_code,
            d.bank_post_code,
            d.bank_account_no,
            d.electronic_invoices,
            d.active,
            d.notes
        )
        .fetch_optional(pool)
        .await
    }

    /// Record a review decision. Approving stamps `approved_at`, rejecting
    /// stamps `rejected_at`; the other timestamp is left as it was.
    pub async fn set_status(
        pool: &SqlitePool,
        id: Uuid,
        status: ClientStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as!(
            Client,
            r#"
            UPDATE clients SET
                status = $2,
                approved_at = CASE WHEN $2 = 'approved' THEN datetime('now', 'subsec') ELSE approved_at END,
                rejected_at = CASE WHEN $2 = 'rejected' THEN datetime('now', 'subsec') ELSE rejected_at END,
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING
                id                  as "id!: Uuid",
                company_name,
                trading_name,
                company_reg_no,
                company_vat_no,
                parent_company,
                years_trading,
                business_type,
                invoice_address,
                delivery_address,
                telephone,
                delivery_telephone,
                email,
                delivery_email,
                nature_of_business,
                number_of_employees,
                director_name,
                p_ledger_name,
                p_ledger_tel,
                p_ledger_email,
                trade_ref1_name,
                trade_ref1_phone,
                trade_ref1_website,
                trade_ref2_name,
                trade_ref2_phone,
                trade_ref2_website,
                credit_application_amount,
                bank_name,
                bank_sort_code,
                bank_post_code,
                bank_account_no,
                electronic_invoices as "electronic_invoices!: bool",
                active              as "active!: bool",
                status              as "status!: ClientStatus",
                approved_at         as "approved_at: DateTime<Utc>",
                rejected_at         as "rejected_at: DateTime<Utc>",
                notes,
                created_at          as "created_at!: DateTime<Utc>",
                updated_at          as "updated_at!: DateTime<Utc>"
            "#,
            id,
            status
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query!("DELETE FROM clients WHERE id = $1", id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn application(name: &str) -> CreateClient {
        CreateClient {
            company_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_credit_amount_exports_as_nullable_string() {
        let decl = ClientDetails::decl();
        assert!(decl.contains("creditApplicationAmount: string | null"), "{decl}");
        assert!(CreateClient::decl().contains("companyName: string"));
    }

    #[tokio::test]
    async fn test_create_applies_form_defaults() {
        let db = DBService::new_in_memory().await.unwrap();
        let client = Client::create(&db.pool, Uuid::new_v4(), &application("Acme Lifting Ltd"))
            .await
            .unwrap();

        assert_eq!(client.business_type, "Limited Company");
        assert_eq!(client.status, ClientStatus::Pending);
        assert!(client.active);
        assert!(!client.electronic_invoices);
        assert!(client.approved_at.is_none());
    }

    #[tokio::test]
    async fn test_inactive_clients_are_not_listed() {
        let db = DBService::new_in_memory().await.unwrap();
        let kept = Client::create(&db.pool, Uuid::new_v4(), &application("Kept"))
            .await
            .unwrap();
        let hidden = Client::create(&db.pool, Uuid::new_v4(), &application("Hidden"))
            .await
            .unwrap();
        Client::update(
            &db.pool,
            hidden.id,
            &UpdateClient {
                details: ClientDetails {
                    active: Some(false),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let listed = Client::find_all_active(&db.pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_set_status_stamps_decision_time() {
        let db = DBService::new_in_memory().await.unwrap();
        let client = Client::create(&db.pool, Uuid::new_v4(), &application("Acme"))
            .await
            .unwrap();

        let approved = Client::set_status(&db.pool, client.id, ClientStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, ClientStatus::Approved);
        assert!(approved.approved_at.is_some());
        assert!(approved.rejected_at.is_none());

        let rejected = Client::set_status(&db.pool, client.id, ClientStatus::Rejected)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rejected.status, ClientStatus::Rejected);
        assert!(rejected.rejected_at.is_some());
        assert_eq!(rejected.approved_at, approved.approved_at);
    }
}

//! Contacts repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::contact::{CapturedContact, Contact},
};

#[derive(Clone)]
pub struct ContactsRepository {
    pool: Pool<Postgres>,
}

impl ContactsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // Visitor action lookups and writes run on the caller's transaction

    /// Look up a contact by the identifier stored on the visitor device
    pub async fn find_by_unique_id(
        &self,
        conn: &mut PgConnection,
        business_id: i64,
        unique_id: &str,
    ) -> AppResult<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE business_id = $1 AND unique_id = $2",
        )
        .bind(business_id)
        .bind(unique_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(contact)
    }

    /// Find an existing contact with the same email or phone
    pub async fn find_matching(
        &self,
        conn: &mut PgConnection,
        business_id: i64,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<Option<Contact>> {
        if email.is_none() && phone.is_none() {
            return Ok(None);
        }

        let contact = sqlx::query_as::<_, Contact>(
            r#"
            SELECT * FROM contacts
            WHERE business_id = $1
              AND (($2::text IS NOT NULL AND LOWER(email) = LOWER($2))
                OR ($3::text IS NOT NULL AND phone = $3))
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(business_id)
        .bind(email)
        .bind(phone)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(contact)
    }

    /// Insert a contact or refresh the details of an existing one.
    ///
    /// A channel missing from `data` keeps its stored value.
    pub async fn upsert(
        &self,
        conn: &mut PgConnection,
        business_id: i64,
        unique_id: &str,
        data: &CapturedContact,
    ) -> AppResult<Contact> {
        let row = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (business_id, unique_id, name, email, phone, last_visit_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (business_id, unique_id) DO UPDATE SET
                name = EXCLUDED.name,
                email = COALESCE(EXCLUDED.email, contacts.email),
                phone = COALESCE(EXCLUDED.phone, contacts.phone),
                updated_at = NOW()
            RETURNING id, business_id, unique_id, name, email, phone, visit_count, last_visit_at, created_at
            "#,
        )
        .bind(business_id)
        .bind(unique_id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Atomically count a visit, returning the new total
    pub async fn record_visit(
        &self,
        conn: &mut PgConnection,
        business_id: i64,
        unique_id: &str,
    ) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE contacts
            SET visit_count = visit_count + 1, last_visit_at = NOW(), updated_at = NOW()
            WHERE business_id = $1 AND unique_id = $2
            RETURNING visit_count
            "#,
        )
        .bind(business_id)
        .bind(unique_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {} not found", unique_id)))
    }

    /// Current visit count of a contact
    pub async fn visit_count(&self, business_id: i64, unique_id: &str) -> AppResult<Option<i32>> {
        let count = sqlx::query_scalar::<_, i32>(
            "SELECT visit_count FROM contacts WHERE business_id = $1 AND unique_id = $2",
        )
        .bind(business_id)
        .bind(unique_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }

    /// List contacts with pagination
    pub async fn list(&self, business_id: i64, page: i64, per_page: i64) -> AppResult<(Vec<Contact>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE business_id = $1")
            .bind(business_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, business_id, unique_id, name, email, phone, visit_count, last_visit_at, created_at
            FROM contacts
            WHERE business_id = $1
            ORDER BY last_visit_at DESC NULLS LAST, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(business_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}

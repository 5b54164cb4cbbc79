//! Redemptions repository

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        loyalty,
        redemption::{RedemptionRequest, RedemptionStatus, ALREADY_REDEEMED},
    },
};

#[derive(Clone)]
pub struct RedemptionsRepository {
    pool: Pool<Postgres>,
}

/// Outcome of an approve/decline
#[derive(Debug, Clone)]
pub struct Resolution {
    pub redemption: RedemptionRequest,
    /// Visitor visit count after the resolution, when the contact exists
    pub visit_count: Option<i32>,
}

impl RedemptionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new request; `Ok(None)` when its code is already taken
    pub async fn try_create(
        &self,
        conn: &mut PgConnection,
        request: &RedemptionRequest,
    ) -> AppResult<Option<RedemptionRequest>> {
        // DO NOTHING keeps a surrounding transaction usable after a collision
        let row = sqlx::query_as::<_, RedemptionRequest>(
            r#"
            INSERT INTO redemptions (id, business_id, visitor_id, reward_id, reward_title, code, status, version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (business_id, code) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.business_id)
        .bind(&request.visitor_id)
        .bind(request.reward_id)
        .bind(&request.reward_title)
        .bind(&request.code)
        .bind(request.status)
        .bind(request.version)
        .bind(request.created_at)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Look up a request by its (normalized) code
    pub async fn find_by_code(&self, business_id: i64, code: &str) -> AppResult<Option<RedemptionRequest>> {
        let row = sqlx::query_as::<_, RedemptionRequest>(
            "SELECT * FROM redemptions WHERE business_id = $1 AND code = $2",
        )
        .bind(business_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Get request by ID
    pub async fn get_by_id(&self, business_id: i64, id: i64) -> AppResult<RedemptionRequest> {
        sqlx::query_as::<_, RedemptionRequest>(
            "SELECT * FROM redemptions WHERE business_id = $1 AND id = $2",
        )
        .bind(business_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Redemption {} not found", id)))
    }

    /// The visitor's open request, if any
    pub async fn find_pending_for_visitor(
        &self,
        conn: &mut PgConnection,
        business_id: i64,
        visitor_id: &str,
    ) -> AppResult<Option<RedemptionRequest>> {
        let row = sqlx::query_as::<_, RedemptionRequest>(
            r#"
            SELECT * FROM redemptions
            WHERE business_id = $1 AND visitor_id = $2 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(business_id)
        .bind(visitor_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// List requests, newest first
    pub async fn list(
        &self,
        business_id: i64,
        status: Option<RedemptionStatus>,
    ) -> AppResult<Vec<RedemptionRequest>> {
        let rows = sqlx::query_as::<_, RedemptionRequest>(
            r#"
            SELECT * FROM redemptions
            WHERE business_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT 500
            "#,
        )
        .bind(business_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Approve or decline a pending request in one transaction.
    ///
    /// The row is locked, checked, then updated with a version guard, so of
    /// two concurrent resolutions only the first commits; the other gets
    /// `Conflict("already redeemed")`. Approval subtracts the threshold from
    /// the visitor's visit count, never going below zero.
    pub async fn resolve(
        &self,
        business_id: i64,
        id: i64,
        status: RedemptionStatus,
        threshold: i32,
    ) -> AppResult<Resolution> {
        let mut tx = self.pool.begin().await?;

        let mut redemption = sqlx::query_as::<_, RedemptionRequest>(
            "SELECT * FROM redemptions WHERE business_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(business_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Redemption {} not found", id)))?;

        let expected_version = redemption.version;
        redemption
            .resolve(status, Utc::now())
            .map_err(|e| AppError::Conflict(e.message().to_string()))?;

        let updated = sqlx::query(
            r#"
            UPDATE redemptions
            SET status = $3, version = $4, resolved_at = $5
            WHERE business_id = $1 AND id = $2 AND version = $6 AND status = 'pending'
            "#,
        )
        .bind(business_id)
        .bind(id)
        .bind(redemption.status)
        .bind(redemption.version)
        .bind(redemption.resolved_at)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict(ALREADY_REDEEMED.to_string()));
        }

        let visit_count = if status == RedemptionStatus::Approved {
            let current = sqlx::query_scalar::<_, i32>(
                "SELECT visit_count FROM contacts WHERE business_id = $1 AND unique_id = $2 FOR UPDATE",
            )
            .bind(business_id)
            .bind(&redemption.visitor_id)
            .fetch_optional(&mut *tx)
            .await?;

            match current {
                Some(count) => {
                    let remaining = loyalty::visits_after_redemption(count, threshold);
                    sqlx::query(
                        r#"
                        UPDATE contacts SET visit_count = $3, updated_at = NOW()
                        WHERE business_id = $1 AND unique_id = $2
                        "#,
                    )
                    .bind(business_id)
                    .bind(&redemption.visitor_id)
                    .bind(remaining)
                    .execute(&mut *tx)
                    .await?;
                    Some(remaining)
                }
                None => None,
            }
        } else {
            None
        };

        tx.commit().await?;

        Ok(Resolution {
            redemption,
            visit_count,
        })
    }
}

//! Feedback repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    models::feedback::{Feedback, FeedbackForm},
};

#[derive(Clone)]
pub struct FeedbackRepository {
    pool: Pool<Postgres>,
}

impl FeedbackRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store survey feedback
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        business_id: i64,
        visitor_id: Option<&str>,
        data: &FeedbackForm,
    ) -> AppResult<Feedback> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (business_id, visitor_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(visitor_id)
        .bind(data.rating)
        .bind(&data.comment)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Latest feedback for a business
    pub async fn list(&self, business_id: i64, limit: i64) -> AppResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, Feedback>(
            "SELECT * FROM feedback WHERE business_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(business_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

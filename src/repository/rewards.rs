//! Rewards repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::reward::{CreateReward, Reward, UpdateReward},
};

#[derive(Clone)]
pub struct RewardsRepository {
    pool: Pool<Postgres>,
}

impl RewardsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List rewards of a business
    pub async fn list(&self, business_id: i64, active_only: bool) -> AppResult<Vec<Reward>> {
        let rows = sqlx::query_as::<_, Reward>(
            r#"
            SELECT * FROM rewards
            WHERE business_id = $1 AND (NOT $2 OR active)
            ORDER BY points_cost, title
            "#,
        )
        .bind(business_id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get reward by ID
    pub async fn get_by_id(&self, business_id: i64, id: i64) -> AppResult<Reward> {
        self.find_by_id(business_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reward {} not found", id)))
    }

    pub async fn find_by_id(&self, business_id: i64, id: i64) -> AppResult<Option<Reward>> {
        let row = sqlx::query_as::<_, Reward>(
            "SELECT * FROM rewards WHERE business_id = $1 AND id = $2",
        )
        .bind(business_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Active reward with the given title (case-insensitive)
    pub async fn find_by_title(&self, business_id: i64, title: &str) -> AppResult<Option<Reward>> {
        let row = sqlx::query_as::<_, Reward>(
            r#"
            SELECT * FROM rewards
            WHERE business_id = $1 AND LOWER(title) = LOWER($2)
            ORDER BY active DESC, id
            LIMIT 1
            "#,
        )
        .bind(business_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Create reward
    pub async fn create(&self, business_id: i64, data: &CreateReward) -> AppResult<Reward> {
        let row = sqlx::query_as::<_, Reward>(
            r#"
            INSERT INTO rewards (business_id, title, description, points_cost, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(data.title.trim())
        .bind(&data.description)
        .bind(data.points_cost)
        .bind(data.active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update reward
    pub async fn update(&self, business_id: i64, id: i64, data: &UpdateReward) -> AppResult<Reward> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.description, "description");
        add_field!(data.points_cost, "points_cost");
        add_field!(data.active, "active");

        let query = format!(
            "UPDATE rewards SET {} WHERE business_id = ${} AND id = ${} RETURNING *",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, Reward>(&query).bind(Utc::now());

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.description);
        bind_field!(data.points_cost);
        bind_field!(data.active);

        builder
            .bind(business_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reward {} not found", id)))
    }

    /// Delete reward
    pub async fn delete(&self, business_id: i64, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM rewards WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reward {} not found", id)));
        }
        Ok(())
    }
}

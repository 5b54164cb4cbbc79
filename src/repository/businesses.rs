//! Businesses repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::business::{BusinessProfile, CreateBusiness},
};

#[derive(Clone)]
pub struct BusinessesRepository {
    pool: Pool<Postgres>,
}

impl BusinessesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get business by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<BusinessProfile> {
        sqlx::query_as::<_, BusinessProfile>("SELECT * FROM businesses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Business with id {} not found", id)))
    }

    /// Create a business with default copy and engagement settings
    pub async fn create(&self, data: &CreateBusiness, default_threshold: i32) -> AppResult<BusinessProfile> {
        let row = sqlx::query_as::<_, BusinessProfile>(
            r#"
            INSERT INTO businesses (display_name, business_type, logo_url, reward_visit_threshold)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.display_name.trim())
        .bind(data.business_type)
        .bind(&data.logo_url)
        .bind(data.reward_visit_threshold.unwrap_or(default_threshold))
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Persist every editable field of a profile
    pub async fn save(&self, profile: &BusinessProfile) -> AppResult<BusinessProfile> {
        let engagement = &profile.engagement;
        sqlx::query_as::<_, BusinessProfile>(
            r#"
            UPDATE businesses SET
                display_name = $2, business_type = $3, logo_url = $4,
                welcome_message = $5, success_message = $6, privacy_message = $7, reward_message = $8,
                reward_enabled = $9, reward_visit_threshold = $10,
                show_review = $11, review_url = $12, show_social = $13, social_url = $14,
                show_feedback = $15, feedback_url = $16, updated_at = $17
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(profile.business_type)
        .bind(&profile.logo_url)
        .bind(&profile.welcome_message)
        .bind(&profile.success_message)
        .bind(&profile.privacy_message)
        .bind(&profile.reward_message)
        .bind(profile.reward_enabled)
        .bind(profile.reward_visit_threshold)
        .bind(engagement.show_review)
        .bind(&engagement.review_url)
        .bind(engagement.show_social)
        .bind(&engagement.social_url)
        .bind(engagement.show_feedback)
        .bind(&engagement.feedback_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Business with id {} not found", profile.id)))
    }
}

//! Reward catalogue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Reward record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reward {
    pub id: i64,
    pub business_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Visits (points) the reward costs
    pub points_cost: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create reward request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReward {
    #[validate(length(min = 1, max = 120, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Points cost cannot be negative"))]
    pub points_cost: i32,
    pub active: Option<bool>,
}

/// Update reward request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReward {
    #[validate(length(min = 1, max = 120))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Points cost cannot be negative"))]
    pub points_cost: Option<i32>,
    pub active: Option<bool>,
}

/// Query parameters for reward listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RewardQuery {
    /// Only return active rewards
    pub active_only: Option<bool>,
}

//! Repository layer for database operations

pub mod businesses;
pub mod contacts;
pub mod feedback;
pub mod redemptions;
pub mod rewards;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub businesses: businesses::BusinessesRepository,
    pub contacts: contacts::ContactsRepository,
    pub rewards: rewards::RewardsRepository,
    pub redemptions: redemptions::RedemptionsRepository,
    pub feedback: feedback::FeedbackRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            businesses: businesses::BusinessesRepository::new(pool.clone()),
            contacts: contacts::ContactsRepository::new(pool.clone()),
            rewards: rewards::RewardsRepository::new(pool.clone()),
            redemptions: redemptions::RedemptionsRepository::new(pool.clone()),
            feedback: feedback::FeedbackRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database (readiness check)
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

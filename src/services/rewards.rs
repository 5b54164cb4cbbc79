//! Reward catalogue service

use validator::Validate;

use crate::{
    error::AppResult,
    models::reward::{CreateReward, Reward, UpdateReward},
    repository::Repository,
};

#[derive(Clone)]
pub struct RewardsService {
    repository: Repository,
}

impl RewardsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, business_id: i64, active_only: bool) -> AppResult<Vec<Reward>> {
        self.repository.rewards.list(business_id, active_only).await
    }

    pub async fn get(&self, business_id: i64, id: i64) -> AppResult<Reward> {
        self.repository.rewards.get_by_id(business_id, id).await
    }

    /// Create a reward for an existing business
    pub async fn create(&self, business_id: i64, data: CreateReward) -> AppResult<Reward> {
        data.validate()?;
        self.repository.businesses.get_by_id(business_id).await?;
        self.repository.rewards.create(business_id, &data).await
    }

    pub async fn update(&self, business_id: i64, id: i64, data: UpdateReward) -> AppResult<Reward> {
        data.validate()?;
        self.repository.rewards.update(business_id, id, &data).await
    }

    pub async fn delete(&self, business_id: i64, id: i64) -> AppResult<()> {
        self.repository.rewards.delete(business_id, id).await
    }
}

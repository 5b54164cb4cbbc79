//! Business onboarding and merchant settings service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        business::{BusinessProfile, BusinessSettingsView, CreateBusiness, FlowSettings, UpdateBusinessSettings},
        feedback::Feedback,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BusinessesService {
    repository: Repository,
    default_threshold: i32,
}

impl BusinessesService {
    pub fn new(repository: Repository, default_threshold: i32) -> Self {
        Self {
            repository,
            default_threshold,
        }
    }

    /// Onboard a new business
    pub async fn create(&self, data: CreateBusiness) -> AppResult<BusinessProfile> {
        data.validate()?;
        let business = self
            .repository
            .businesses
            .create(&data, self.default_threshold)
            .await?;
        tracing::info!(
            "Business {} created ({}, type {})",
            business.id,
            business.display_name,
            business.business_type
        );
        Ok(business)
    }

    pub async fn get(&self, id: i64) -> AppResult<BusinessProfile> {
        self.repository.businesses.get_by_id(id).await
    }

    /// Settings as consulted by the visitor flow
    pub async fn flow_settings(&self, id: i64) -> AppResult<FlowSettings> {
        let profile = self.repository.businesses.get_by_id(id).await?;
        Ok(FlowSettings::from_profile(&profile))
    }

    pub async fn get_settings(&self, id: i64) -> AppResult<BusinessSettingsView> {
        Ok(self.repository.businesses.get_by_id(id).await?.into())
    }

    /// Validate and merge a partial settings update
    pub async fn update_settings(
        &self,
        id: i64,
        update: UpdateBusinessSettings,
    ) -> AppResult<BusinessSettingsView> {
        update.validate()?;

        let mut profile = self.repository.businesses.get_by_id(id).await?;
        update.apply_to(&mut profile);
        profile.engagement.validate()?;
        let saved = self.repository.businesses.save(&profile).await?;

        tracing::info!("Settings updated for business {}", id);
        Ok(saved.into())
    }

    /// Latest survey feedback
    pub async fn list_feedback(&self, id: i64, limit: i64) -> AppResult<Vec<Feedback>> {
        self.repository.businesses.get_by_id(id).await?;
        self.repository.feedback.list(id, limit.clamp(1, 500)).await
    }
}

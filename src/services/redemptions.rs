//! Redemption workflow: visitor requests, merchant verification and resolution

use chrono::Utc;
use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::{
        redemption::{
            generate_code, next_redemption_id, normalize_code, RedemptionRequest,
            RedemptionStatus, VerifyFailure, VerifyRedemptionResponse, NETWORK_ERROR,
        },
        reward::Reward,
    },
    repository::{redemptions::Resolution, Repository},
};

// Codes are random; collisions within one business are rare
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct RedemptionsService {
    repository: Repository,
    code_length: usize,
}

impl RedemptionsService {
    pub fn new(repository: Repository, code_length: usize) -> Self {
        Self {
            repository,
            code_length,
        }
    }

    /// Create a pending request for a visitor, or return the one still open.
    /// Runs on the caller's connection; nothing is final until it commits.
    pub async fn request(
        &self,
        conn: &mut PgConnection,
        business_id: i64,
        visitor_id: &str,
        reward_title: &str,
        reward_id: Option<i64>,
    ) -> AppResult<RedemptionRequest> {
        if let Some(pending) = self
            .repository
            .redemptions
            .find_pending_for_visitor(&mut *conn, business_id, visitor_id)
            .await?
        {
            tracing::debug!("Visitor {} already has pending redemption {}", visitor_id, pending.id);
            return Ok(pending);
        }

        if let Some(reward_id) = reward_id {
            let reward = self.repository.rewards.get_by_id(business_id, reward_id).await?;
            if !reward.active {
                return Err(AppError::BusinessRule(format!(
                    "Reward '{}' is not available",
                    reward.title
                )));
            }
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let request = RedemptionRequest {
                id: next_redemption_id(),
                business_id,
                visitor_id: visitor_id.to_string(),
                reward_id,
                reward_title: reward_title.to_string(),
                code: generate_code(self.code_length),
                status: RedemptionStatus::Pending,
                version: 0,
                created_at: Utc::now(),
                resolved_at: None,
            };

            match self
                .repository
                .redemptions
                .try_create(&mut *conn, &request)
                .await?
            {
                Some(created) => {
                    tracing::info!(
                        "Redemption {} requested by visitor {} for '{}'",
                        created.id,
                        visitor_id,
                        created.reward_title
                    );
                    return Ok(created);
                }
                None => tracing::warn!("Redemption code collision (attempt {})", attempt),
            }
        }

        Err(AppError::Internal(
            "Could not allocate a unique redemption code".to_string(),
        ))
    }

    /// Preview a code before staff confirm it. Never mutates anything.
    pub async fn verify(&self, business_id: i64, raw_code: &str) -> AppResult<VerifyRedemptionResponse> {
        let Some(code) = normalize_code(raw_code) else {
            return Ok(VerifyRedemptionResponse::failure(VerifyFailure::InvalidCode));
        };

        let redemption = self
            .repository
            .redemptions
            .find_by_code(business_id, &code)
            .await
            .map_err(as_network_error)?;

        let Some(redemption) = redemption else {
            tracing::warn!("Unknown redemption code {} for business {}", code, business_id);
            return Ok(VerifyRedemptionResponse::failure(VerifyFailure::InvalidCode));
        };

        if let Err(reason) = redemption.check_redeemable() {
            return Ok(VerifyRedemptionResponse::failure(reason));
        }

        let reward = self
            .matching_reward(&redemption)
            .await
            .map_err(as_network_error)?;

        Ok(VerifyRedemptionResponse::preview(redemption, reward))
    }

    async fn matching_reward(&self, redemption: &RedemptionRequest) -> AppResult<Option<Reward>> {
        let rewards = &self.repository.rewards;
        match redemption.reward_id {
            Some(id) => rewards.find_by_id(redemption.business_id, id).await,
            None => {
                rewards
                    .find_by_title(redemption.business_id, &redemption.reward_title)
                    .await
            }
        }
    }

    /// Confirm a verified request and spend the visitor's visits
    pub async fn approve(&self, business_id: i64, id: i64) -> AppResult<Resolution> {
        self.resolve(business_id, id, RedemptionStatus::Approved).await
    }

    /// Refuse a request; visits are kept
    pub async fn decline(&self, business_id: i64, id: i64) -> AppResult<Resolution> {
        self.resolve(business_id, id, RedemptionStatus::Declined).await
    }

    async fn resolve(&self, business_id: i64, id: i64, status: RedemptionStatus) -> AppResult<Resolution> {
        let business = self.repository.businesses.get_by_id(business_id).await?;
        let resolution = self
            .repository
            .redemptions
            .resolve(business_id, id, status, business.reward_visit_threshold)
            .await?;

        tracing::info!(
            "Redemption {} {} (visitor {}, visits now {:?})",
            id,
            status,
            resolution.redemption.visitor_id,
            resolution.visit_count
        );
        Ok(resolution)
    }

    pub async fn get(&self, business_id: i64, id: i64) -> AppResult<RedemptionRequest> {
        self.repository.redemptions.get_by_id(business_id, id).await
    }

    pub async fn list(
        &self,
        business_id: i64,
        status: Option<RedemptionStatus>,
    ) -> AppResult<Vec<RedemptionRequest>> {
        self.repository.redemptions.list(business_id, status).await
    }
}

/// Infrastructure failures during verification surface as a generic message
fn as_network_error(e: AppError) -> AppError {
    tracing::error!("Redemption verification failed: {}", e);
    AppError::ServiceUnavailable(NETWORK_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_failure_becomes_network_error() {
        let err = as_network_error(AppError::Database(sqlx::Error::PoolTimedOut));
        match err {
            AppError::ServiceUnavailable(msg) => assert_eq!(msg, "Network error during verification"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}

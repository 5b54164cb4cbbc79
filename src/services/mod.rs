//! Business logic services

pub mod businesses;
pub mod contacts;
pub mod flow;
pub mod redemptions;
pub mod rewards;
pub mod session_store;

use crate::{config::LoyaltyConfig, repository::Repository};

use session_store::SharedFlowStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub businesses: businesses::BusinessesService,
    pub contacts: contacts::ContactsService,
    pub flow: flow::FlowService,
    pub redemptions: redemptions::RedemptionsService,
    pub rewards: rewards::RewardsService,
    pub sessions: SharedFlowStore,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(repository: Repository, loyalty: &LoyaltyConfig, sessions: SharedFlowStore) -> Self {
        let businesses =
            businesses::BusinessesService::new(repository.clone(), loyalty.default_reward_threshold);
        let redemptions =
            redemptions::RedemptionsService::new(repository.clone(), loyalty.redemption_code_length);

        Self {
            flow: flow::FlowService::new(
                repository.clone(),
                businesses.clone(),
                redemptions.clone(),
                sessions.clone(),
            ),
            contacts: contacts::ContactsService::new(repository.clone()),
            rewards: rewards::RewardsService::new(repository.clone()),
            businesses,
            redemptions,
            sessions,
            repository,
        }
    }

    /// Readiness: database and session store both answer
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await?;
        self.sessions.ping().await
    }
}

//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{businesses, contacts, health, redemptions, rewards, sessions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tapflow API",
        version = "0.4.0",
        description = "Tap-to-engage visitor flow and loyalty redemption REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Businesses
        businesses::list_business_types,
        businesses::create_business,
        businesses::get_business,
        businesses::get_settings,
        businesses::update_settings,
        // Tap sessions
        sessions::start_session,
        sessions::get_session,
        sessions::end_session,
        sessions::dispatch_action,
        sessions::reset_session,
        // Redemptions
        redemptions::verify_redemption,
        redemptions::approve_redemption,
        redemptions::decline_redemption,
        redemptions::list_redemptions,
        // Rewards
        rewards::list_rewards,
        rewards::get_reward,
        rewards::create_reward,
        rewards::update_reward,
        rewards::delete_reward,
        // Contacts
        contacts::list_contacts,
        contacts::list_feedback,
    ),
    components(
        schemas(
            // Businesses
            crate::models::business_type::BusinessType,
            crate::models::business_type::BusinessTemplate,
            crate::models::business_type::BusinessTypeEntry,
            crate::models::business::BusinessProfile,
            crate::models::business::EngagementSettings,
            crate::models::business::EngagementPrompt,
            crate::models::business::PromptKind,
            crate::models::business::FlowSettings,
            crate::models::business::BusinessSettingsView,
            crate::models::business::CreateBusiness,
            crate::models::business::UpdateBusinessSettings,
            // Tap sessions
            sessions::StartSessionRequest,
            crate::models::flow::FlowStep,
            crate::models::flow::FlowAction,
            crate::models::flow::CustomerFlowState,
            crate::models::flow::FlowView,
            crate::models::loyalty::RewardProgress,
            crate::models::contact::ContactForm,
            crate::models::contact::CapturedContact,
            crate::models::feedback::FeedbackForm,
            crate::services::flow::FlowResponse,
            crate::services::flow::Notice,
            crate::services::flow::NoticeLevel,
            // Redemptions
            crate::models::redemption::RedemptionStatus,
            crate::models::redemption::RedemptionRequest,
            crate::models::redemption::RedemptionSnapshot,
            crate::models::redemption::VerifyRedemptionRequest,
            crate::models::redemption::VerifyRedemptionResponse,
            redemptions::ResolutionResponse,
            // Rewards
            crate::models::reward::Reward,
            crate::models::reward::CreateReward,
            crate::models::reward::UpdateReward,
            // Contacts
            crate::models::contact::Contact,
            crate::models::feedback::Feedback,
            contacts::ContactPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "businesses", description = "Business onboarding and settings"),
        (name = "tap", description = "Visitor tap sessions"),
        (name = "redemptions", description = "Reward redemption verification"),
        (name = "rewards", description = "Reward catalogue"),
        (name = "contacts", description = "Captured contacts and feedback")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_tap_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/tap/sessions"));
        assert!(doc.paths.paths.contains_key("/tap/sessions/{id}/actions"));
        assert!(doc
            .paths
            .paths
            .contains_key("/businesses/{id}/redemptions/verify"));
    }
}

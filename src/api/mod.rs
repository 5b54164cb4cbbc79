//! API handlers for Tapflow REST endpoints

pub mod businesses;
pub mod contacts;
pub mod health;
pub mod openapi;
pub mod redemptions;
pub mod rewards;
pub mod sessions;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Versioned API routes, without documentation or middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Businesses
        .route("/business-types", get(businesses::list_business_types))
        .route("/businesses", post(businesses::create_business))
        .route("/businesses/:id", get(businesses::get_business))
        .route(
            "/businesses/:id/settings",
            get(businesses::get_settings).put(businesses::update_settings),
        )
        // Tap sessions
        .route("/tap/sessions", post(sessions::start_session))
        .route(
            "/tap/sessions/:id",
            get(sessions::get_session).delete(sessions::end_session),
        )
        .route("/tap/sessions/:id/actions", post(sessions::dispatch_action))
        .route("/tap/sessions/:id/reset", post(sessions::reset_session))
        // Redemptions
        .route("/businesses/:id/redemptions", get(redemptions::list_redemptions))
        .route(
            "/businesses/:id/redemptions/verify",
            post(redemptions::verify_redemption),
        )
        .route(
            "/businesses/:id/redemptions/:redemption_id/approve",
            post(redemptions::approve_redemption),
        )
        .route(
            "/businesses/:id/redemptions/:redemption_id/decline",
            post(redemptions::decline_redemption),
        )
        // Rewards
        .route(
            "/businesses/:id/rewards",
            get(rewards::list_rewards).post(rewards::create_reward),
        )
        .route(
            "/businesses/:id/rewards/:reward_id",
            get(rewards::get_reward)
                .put(rewards::update_reward)
                .delete(rewards::delete_reward),
        )
        // Contacts
        .route("/businesses/:id/contacts", get(contacts::list_contacts))
        .route("/businesses/:id/feedback", get(contacts::list_feedback))
        .with_state(state)
}

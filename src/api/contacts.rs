//! Merchant contact list and feedback endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        contact::{Contact, ContactQuery},
        feedback::Feedback,
    },
    AppState,
};

/// One page of contacts
#[derive(Serialize, ToSchema)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    /// Total number of contacts
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FeedbackQuery {
    /// Maximum entries to return (default: 100)
    pub limit: Option<i64>,
}

/// List captured contacts
#[utoipa::path(
    get,
    path = "/businesses/{id}/contacts",
    tag = "contacts",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ContactQuery
    ),
    responses(
        (status = 200, description = "Contacts, most recent visitors first", body = ContactPage),
        (status = 404, description = "Business not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    Path(business_id): Path<i64>,
    Query(query): Query<ContactQuery>,
) -> AppResult<Json<ContactPage>> {
    let (contacts, total, page, per_page) = state
        .services
        .contacts
        .list(business_id, query.page, query.per_page)
        .await?;

    Ok(Json(ContactPage {
        contacts,
        total,
        page,
        per_page,
    }))
}

/// List survey feedback
#[utoipa::path(
    get,
    path = "/businesses/{id}/feedback",
    tag = "contacts",
    params(
        ("id" = i64, Path, description = "Business ID"),
        FeedbackQuery
    ),
    responses(
        (status = 200, description = "Feedback, newest first", body = Vec<Feedback>),
        (status = 404, description = "Business not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(business_id): Path<i64>,
    Query(query): Query<FeedbackQuery>,
) -> AppResult<Json<Vec<Feedback>>> {
    let feedback = state
        .services
        .businesses
        .list_feedback(business_id, query.limit.unwrap_or(100))
        .await?;
    Ok(Json(feedback))
}

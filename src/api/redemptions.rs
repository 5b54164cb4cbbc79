//! Merchant redemption endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::redemption::{
        RedemptionQuery, RedemptionRequest, VerifyRedemptionRequest, VerifyRedemptionResponse,
    },
    repository::redemptions::Resolution,
    AppState,
};

/// Approve/decline result
#[derive(Serialize, ToSchema)]
pub struct ResolutionResponse {
    pub redemption: RedemptionRequest,
    /// Visitor's remaining visits after an approval
    pub visit_count: Option<i32>,
}

impl From<Resolution> for ResolutionResponse {
    fn from(r: Resolution) -> Self {
        Self {
            redemption: r.redemption,
            visit_count: r.visit_count,
        }
    }
}

/// Verify a redemption code without changing it
#[utoipa::path(
    post,
    path = "/businesses/{id}/redemptions/verify",
    tag = "redemptions",
    params(("id" = i64, Path, description = "Business ID")),
    request_body = VerifyRedemptionRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyRedemptionResponse),
        (status = 503, description = "Network error during verification", body = crate::error::ErrorResponse)
    )
)]
pub async fn verify_redemption(
    State(state): State<AppState>,
    Path(business_id): Path<i64>,
    Json(request): Json<VerifyRedemptionRequest>,
) -> AppResult<Json<VerifyRedemptionResponse>> {
    let response = state
        .services
        .redemptions
        .verify(business_id, &request.code)
        .await?;
    Ok(Json(response))
}

/// Approve a pending redemption
#[utoipa::path(
    post,
    path = "/businesses/{id}/redemptions/{redemption_id}/approve",
    tag = "redemptions",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("redemption_id" = i64, Path, description = "Redemption ID")
    ),
    responses(
        (status = 200, description = "Redemption approved", body = ResolutionResponse),
        (status = 404, description = "Redemption not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already redeemed", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_redemption(
    State(state): State<AppState>,
    Path((business_id, redemption_id)): Path<(i64, i64)>,
) -> AppResult<Json<ResolutionResponse>> {
    let resolution = state
        .services
        .redemptions
        .approve(business_id, redemption_id)
        .await?;
    Ok(Json(resolution.into()))
}

/// Decline a pending redemption
#[utoipa::path(
    post,
    path = "/businesses/{id}/redemptions/{redemption_id}/decline",
    tag = "redemptions",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("redemption_id" = i64, Path, description = "Redemption ID")
    ),
    responses(
        (status = 200, description = "Redemption declined", body = ResolutionResponse),
        (status = 404, description = "Redemption not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already redeemed", body = crate::error::ErrorResponse)
    )
)]
pub async fn decline_redemption(
    State(state): State<AppState>,
    Path((business_id, redemption_id)): Path<(i64, i64)>,
) -> AppResult<Json<ResolutionResponse>> {
    let resolution = state
        .services
        .redemptions
        .decline(business_id, redemption_id)
        .await?;
    Ok(Json(resolution.into()))
}

/// List redemption requests
#[utoipa::path(
    get,
    path = "/businesses/{id}/redemptions",
    tag = "redemptions",
    params(
        ("id" = i64, Path, description = "Business ID"),
        RedemptionQuery
    ),
    responses(
        (status = 200, description = "Redemption requests, newest first", body = Vec<RedemptionRequest>)
    )
)]
pub async fn list_redemptions(
    State(state): State<AppState>,
    Path(business_id): Path<i64>,
    Query(query): Query<RedemptionQuery>,
) -> AppResult<Json<Vec<RedemptionRequest>>> {
    let redemptions = state
        .services
        .redemptions
        .list(business_id, query.status)
        .await?;
    Ok(Json(redemptions))
}

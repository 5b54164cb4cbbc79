//! Business onboarding and merchant settings endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        business::{BusinessProfile, BusinessSettingsView, CreateBusiness, UpdateBusinessSettings},
        business_type::{self, BusinessTypeEntry},
    },
    AppState,
};

/// List supported business types with their default copy
#[utoipa::path(
    get,
    path = "/business-types",
    tag = "businesses",
    responses(
        (status = 200, description = "Business type registry", body = Vec<BusinessTypeEntry>)
    )
)]
pub async fn list_business_types() -> Json<Vec<BusinessTypeEntry>> {
    Json(business_type::registry())
}

/// Onboard a business
#[utoipa::path(
    post,
    path = "/businesses",
    tag = "businesses",
    request_body = CreateBusiness,
    responses(
        (status = 201, description = "Business created", body = BusinessProfile),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_business(
    State(state): State<AppState>,
    Json(data): Json<CreateBusiness>,
) -> AppResult<(StatusCode, Json<BusinessProfile>)> {
    let business = state.services.businesses.create(data).await?;
    Ok((StatusCode::CREATED, Json(business)))
}

/// Get a business profile
#[utoipa::path(
    get,
    path = "/businesses/{id}",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Business profile", body = BusinessProfile),
        (status = 404, description = "Business not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BusinessProfile>> {
    let business = state.services.businesses.get(id).await?;
    Ok(Json(business))
}

/// Get merchant settings and the resulting visitor copy
#[utoipa::path(
    get,
    path = "/businesses/{id}/settings",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Current settings", body = BusinessSettingsView),
        (status = 404, description = "Business not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BusinessSettingsView>> {
    let settings = state.services.businesses.get_settings(id).await?;
    Ok(Json(settings))
}

/// Update merchant settings
#[utoipa::path(
    put,
    path = "/businesses/{id}/settings",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business ID")),
    request_body = UpdateBusinessSettings,
    responses(
        (status = 200, description = "Settings updated", body = BusinessSettingsView),
        (status = 400, description = "Invalid settings", body = crate::error::ErrorResponse),
        (status = 404, description = "Business not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateBusinessSettings>,
) -> AppResult<Json<BusinessSettingsView>> {
    let settings = state.services.businesses.update_settings(id, update).await?;
    Ok(Json(settings))
}

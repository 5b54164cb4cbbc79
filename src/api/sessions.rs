//! Visitor tap session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::flow::FlowAction,
    services::flow::FlowResponse,
    AppState,
};

/// Start session request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Business encoded in the tag URL; omit to choose it in the flow
    pub business_id: Option<i64>,
}

/// Start a tap session
#[utoipa::path(
    post,
    path = "/tap/sessions",
    tag = "tap",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = FlowResponse),
        (status = 404, description = "Business not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<FlowResponse>)> {
    let response = state.services.flow.start_session(request.business_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Resume a tap session
#[utoipa::path(
    get,
    path = "/tap/sessions/{id}",
    tag = "tap",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Current session", body = FlowResponse),
        (status = 404, description = "Session not found or expired", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FlowResponse>> {
    let response = state.services.flow.get_session(id).await?;
    Ok(Json(response))
}

/// End a tap session
#[utoipa::path(
    delete,
    path = "/tap/sessions/{id}",
    tag = "tap",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Session not found or expired", body = crate::error::ErrorResponse)
    )
)]
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.flow.end_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a visitor action
#[utoipa::path(
    post,
    path = "/tap/sessions/{id}/actions",
    tag = "tap",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = FlowAction,
    responses(
        (status = 200, description = "Action applied", body = FlowResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Action not allowed in the current step", body = crate::error::ErrorResponse),
        (status = 422, description = "Action refused", body = crate::error::ErrorResponse)
    )
)]
pub async fn dispatch_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(action): Json<FlowAction>,
) -> AppResult<Json<FlowResponse>> {
    let response = state.services.flow.dispatch(id, action).await?;
    Ok(Json(response))
}

/// Reset a session to business type selection
#[utoipa::path(
    post,
    path = "/tap/sessions/{id}/reset",
    tag = "tap",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session reset", body = FlowResponse),
        (status = 404, description = "Session not found or expired", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FlowResponse>> {
    let response = state.services.flow.reset(id).await?;
    Ok(Json(response))
}

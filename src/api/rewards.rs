//! Reward catalogue endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::reward::{CreateReward, Reward, RewardQuery, UpdateReward},
    AppState,
};

/// List rewards of a business
#[utoipa::path(
    get,
    path = "/businesses/{id}/rewards",
    tag = "rewards",
    params(
        ("id" = i64, Path, description = "Business ID"),
        RewardQuery
    ),
    responses(
        (status = 200, description = "Rewards", body = Vec<Reward>)
    )
)]
pub async fn list_rewards(
    State(state): State<AppState>,
    Path(business_id): Path<i64>,
    Query(query): Query<RewardQuery>,
) -> AppResult<Json<Vec<Reward>>> {
    let rewards = state
        .services
        .rewards
        .list(business_id, query.active_only.unwrap_or(false))
        .await?;
    Ok(Json(rewards))
}

/// Get a reward
#[utoipa::path(
    get,
    path = "/businesses/{id}/rewards/{reward_id}",
    tag = "rewards",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("reward_id" = i64, Path, description = "Reward ID")
    ),
    responses(
        (status = 200, description = "Reward", body = Reward),
        (status = 404, description = "Reward not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_reward(
    State(state): State<AppState>,
    Path((business_id, reward_id)): Path<(i64, i64)>,
) -> AppResult<Json<Reward>> {
    let reward = state.services.rewards.get(business_id, reward_id).await?;
    Ok(Json(reward))
}

/// Create a reward
#[utoipa::path(
    post,
    path = "/businesses/{id}/rewards",
    tag = "rewards",
    params(("id" = i64, Path, description = "Business ID")),
    request_body = CreateReward,
    responses(
        (status = 201, description = "Reward created", body = Reward),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_reward(
    State(state): State<AppState>,
    Path(business_id): Path<i64>,
    Json(data): Json<CreateReward>,
) -> AppResult<(StatusCode, Json<Reward>)> {
    let reward = state.services.rewards.create(business_id, data).await?;
    Ok((StatusCode::CREATED, Json(reward)))
}

/// Update a reward
#[utoipa::path(
    put,
    path = "/businesses/{id}/rewards/{reward_id}",
    tag = "rewards",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("reward_id" = i64, Path, description = "Reward ID")
    ),
    request_body = UpdateReward,
    responses(
        (status = 200, description = "Reward updated", body = Reward),
        (status = 404, description = "Reward not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_reward(
    State(state): State<AppState>,
    Path((business_id, reward_id)): Path<(i64, i64)>,
    Json(data): Json<UpdateReward>,
) -> AppResult<Json<Reward>> {
    let reward = state
        .services
        .rewards
        .update(business_id, reward_id, data)
        .await?;
    Ok(Json(reward))
}

/// Delete a reward
#[utoipa::path(
    delete,
    path = "/businesses/{id}/rewards/{reward_id}",
    tag = "rewards",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("reward_id" = i64, Path, description = "Reward ID")
    ),
    responses(
        (status = 204, description = "Reward deleted"),
        (status = 404, description = "Reward not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_reward(
    State(state): State<AppState>,
    Path((business_id, reward_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.rewards.delete(business_id, reward_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Demo user and trip handlers

use crate::store::{parse_leading_int, TripFilter, TripInput, UserInput};
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;

type ApiResult<T> = Result<T, ApiError>;

fn envelope<T: Serialize>(data: T, message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": data,
        "message": message,
    }))
}

/// Ids that don't read as a number match nothing
fn user_id(raw: &str) -> ApiResult<u64> {
    parse_leading_int(raw)
        .and_then(|id| u64::try_from(id).ok())
        .ok_or_else(|| ApiError::not_found("User not found", format!("No user with id {}", raw)))
}

fn trip_id(raw: &str) -> ApiResult<u64> {
    parse_leading_int(raw)
        .and_then(|id| u64::try_from(id).ok())
        .ok_or_else(|| ApiError::not_found("Trip not found", format!("No trip with id {}", raw)))
}

pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    envelope(state.store.users(), "Users retrieved")
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state.store.user(user_id(&id)?)?;
    Ok(envelope(user, "User retrieved"))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body?;
    let user = state.store.create_user(input)?;
    Ok((StatusCode::CREATED, envelope(user, "User created")))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = user_id(&id)?;
    let Json(input) = body?;
    let user = state.store.update_user(id, input)?;
    Ok(envelope(user, "User updated"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state.store.delete_user(user_id(&id)?)?;
    Ok(envelope(user, "User deleted"))
}

pub async fn list_trips(State(state): State<AppState>) -> impl IntoResponse {
    envelope(state.store.trips(), "Trips retrieved")
}

pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let trip = state.store.trip(trip_id(&id)?)?;
    Ok(envelope(trip, "Trip retrieved"))
}

pub async fn create_trip(
    State(state): State<AppState>,
    body: Result<Json<TripInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body?;
    let trip = state.store.create_trip(input)?;
    Ok((StatusCode::CREATED, envelope(trip, "Trip created")))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Query(filter): Query<TripFilter>,
) -> impl IntoResponse {
    envelope(state.store.recommendations(&filter), "Recommended trips retrieved")
}

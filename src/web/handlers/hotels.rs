//! Hotel search handlers

use super::non_empty;
use crate::hotels;
use crate::providers::{CredentialProvider, HotelSearchParams, ProviderReply, TravelProvider};
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelQuery {
    pub city_code: Option<String>,
    pub hotel_ids: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub adults: Option<String>,
}

impl HotelQuery {
    fn into_params(self) -> HotelSearchParams {
        HotelSearchParams {
            city_code: non_empty(self.city_code),
            hotel_ids: non_empty(self.hotel_ids),
            check_in_date: non_empty(self.check_in_date),
            check_out_date: non_empty(self.check_out_date),
            adults: non_empty(self.adults),
        }
    }
}

async fn token(state: &AppState) -> ApiResult<String> {
    state
        .credentials
        .access_token()
        .await
        .map_err(ApiError::credential)
}

fn relay(reply: ProviderReply) -> ApiResult<Value> {
    if (200..300).contains(&reply.status) {
        Ok(reply.body)
    } else {
        warn!("Hotel search rejected with status {}: {}", reply.status, reply.body);
        Err(ApiError::upstream(reply.status, reply.body))
    }
}

/// Hotel offers in a city
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<HotelQuery>,
) -> ApiResult<Json<Value>> {
    let mut params = query.into_params();
    if params.city_code.is_none() {
        return Err(ApiError::bad_request(
            "Missing required parameters",
            "cityCode is required (e.g. OSA, NRT, ICN)",
        ));
    }
    params.hotel_ids = None;

    let token = token(&state).await?;
    let body = relay(state.provider.hotel_offers(&params, &token).await?)?;
    Ok(Json(json!({ "success": true, "data": body })))
}

/// Offers of a single hotel
pub async fn by_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    Query(query): Query<HotelQuery>,
) -> ApiResult<Json<Value>> {
    let mut params = query.into_params();
    params.city_code = None;
    params.hotel_ids = Some(hotel_id);

    let token = token(&state).await?;
    let body = relay(state.provider.hotel_offers_by_hotel(&params, &token).await?)?;
    Ok(Json(json!({ "success": true, "data": body })))
}

/// Price comparison across the hotels of a city or an id list
pub async fn compare(
    State(state): State<AppState>,
    Query(query): Query<HotelQuery>,
) -> ApiResult<Json<Value>> {
    let params = query.into_params();
    if params.city_code.is_none() && params.hotel_ids.is_none() {
        return Err(ApiError::bad_request(
            "Missing required parameters",
            "cityCode or hotelIds is required",
        ));
    }

    let token = token(&state).await?;
    let body = relay(state.provider.hotel_offers(&params, &token).await?)?;
    let comparison = hotels::compare(&body);

    Ok(Json(json!({
        "success": true,
        "data": {
            "comparison": comparison,
            "original": body,
        },
    })))
}

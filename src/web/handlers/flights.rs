//! Flight search handlers

use super::non_empty;
use crate::providers::{
    CredentialProvider, DestinationSearchParams, FlightOffersProvider, ProviderReply,
    TravelProvider,
};
use crate::search::{FlightOfferParams, MultiSearchRequest, Offer, TravelClass};
use crate::store::parse_leading_int;
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;
use tracing::info;

type ApiResult<T> = Result<T, ApiError>;

const OFFERS_SUGGESTIONS: &[&str] = &[
    "The departure date may be too far ahead; usually only the next year is bookable.",
    "The test environment may only cover certain date ranges.",
    "Try a departure date one to six months from today.",
    "Make sure returnDate is at least one day after departureDate.",
    "Try without currencyCode, or with USD or EUR.",
    "Consider switching to the production environment.",
];

const DESTINATIONS_SUGGESTIONS: &[&str] = &[
    "Flight inspiration search only covers a limited set of origins.",
    "Try another origin code such as NRT, ICN or JFK.",
    "Try again without maxPrice.",
    "Data in the test environment may be limited.",
    "Consider switching to the production environment.",
];

/// Query of `GET /api/flights/offers/multiple`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSearchQuery {
    pub origin_location_code: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub adults: Option<String>,
    pub children: Option<String>,
    pub infants: Option<String>,
    pub travel_class: Option<String>,
    pub currency_code: Option<String>,
    pub max: Option<String>,
    pub non_stop: Option<String>,
    pub max_price: Option<String>,
}

/// Query of `GET /api/flights/offers`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffersQuery {
    pub origin_location_code: Option<String>,
    pub destination_location_code: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub adults: Option<String>,
    pub children: Option<String>,
    pub infants: Option<String>,
    pub travel_class: Option<String>,
    pub currency_code: Option<String>,
    pub max_price: Option<String>,
    pub max: Option<String>,
    pub non_stop: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationsQuery {
    pub origin: Option<String>,
    pub max_price: Option<String>,
}

fn parse_date(field: &str, value: Option<String>) -> ApiResult<Option<NaiveDate>> {
    non_empty(value)
        .map(|v| {
            v.trim().parse::<NaiveDate>().map_err(|_| {
                ApiError::bad_request(
                    format!("Invalid {}", field),
                    format!("{} must be a YYYY-MM-DD date", field),
                )
            })
        })
        .transpose()
}

fn parse_travel_class(value: Option<String>) -> ApiResult<Option<TravelClass>> {
    non_empty(value)
        .map(|v| {
            v.parse::<TravelClass>().map_err(|e| {
                ApiError::bad_request(
                    "Invalid travelClass",
                    format!("{}; expected ECONOMY, PREMIUM_ECONOMY, BUSINESS or FIRST", e),
                )
            })
        })
        .transpose()
}

/// Unparseable counts are ignored
fn count(value: Option<String>) -> Option<u32> {
    non_empty(value)
        .and_then(|v| parse_leading_int(&v))
        .and_then(|n| u32::try_from(n).ok())
}

/// `"true"` is true; any other non-empty value is false
fn flag(value: Option<String>) -> Option<bool> {
    non_empty(value).map(|v| v == "true")
}

impl MultiSearchQuery {
    pub fn into_request(self) -> ApiResult<MultiSearchRequest> {
        let max_price = non_empty(self.max_price)
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite() && *p >= 0.0)
                    .ok_or_else(|| {
                        ApiError::bad_request(
                            "Invalid maxPrice",
                            "maxPrice must be a non-negative number",
                        )
                    })
            })
            .transpose()?;

        // Zero falls back to the defaults, as an absent value would.
        let max = count(self.max).filter(|n| *n > 0);

        Ok(MultiSearchRequest {
            origin_location_code: non_empty(self.origin_location_code),
            departure_date: parse_date("departureDate", self.departure_date)?,
            return_date: parse_date("returnDate", self.return_date)?,
            adults: count(self.adults).filter(|n| *n > 0),
            children: count(self.children),
            infants: count(self.infants),
            travel_class: parse_travel_class(self.travel_class)?,
            currency_code: non_empty(self.currency_code),
            max_results_per_destination: max,
            non_stop: flag(self.non_stop),
            max_price,
            overall_max: max.map(|n| n as usize),
        })
    }
}

/// Departure no earlier than today; both dates at most a year out; return
/// strictly after departure.
pub fn validate_dates(
    departure: NaiveDate,
    return_date: Option<NaiveDate>,
    today: NaiveDate,
) -> ApiResult<()> {
    let latest = today.checked_add_months(Months::new(12)).unwrap_or(NaiveDate::MAX);

    if departure < today {
        return Err(ApiError::bad_request(
            "Invalid departure date",
            "departureDate must be today or later",
        ));
    }
    if departure > latest {
        return Err(ApiError::bad_request(
            "Departure date too far ahead",
            "departureDate must be within one year from today",
        ));
    }
    if let Some(return_date) = return_date {
        if return_date <= departure {
            return Err(ApiError::bad_request(
                "Invalid return date",
                "returnDate must be after departureDate",
            ));
        }
        if return_date > latest {
            return Err(ApiError::bad_request(
                "Return date too far ahead",
                "returnDate must be within one year from today",
            ));
        }
    }
    Ok(())
}

impl FlightOffersQuery {
    /// Validate against `today` and build the upstream parameters
    pub fn into_params(self, today: NaiveDate) -> ApiResult<FlightOfferParams> {
        let origin = non_empty(self.origin_location_code);
        let destination = non_empty(self.destination_location_code);
        let departure = non_empty(self.departure_date);

        let (Some(origin), Some(destination), Some(departure)) = (origin, destination, departure)
        else {
            return Err(ApiError::BadRequest {
                error: "Missing required parameters".to_string(),
                message: "originLocationCode, destinationLocationCode, departureDate are required"
                    .to_string(),
                example: Some(json!({
                    "originLocationCode": "ICN",
                    "destinationLocationCode": "NRT",
                    "departureDate": today.checked_add_months(Months::new(1)).unwrap_or(today).to_string(),
                    "adults": 1,
                    "max": 10,
                })),
            });
        };

        let departure_date = parse_date("departureDate", Some(departure))?
            .ok_or_else(|| ApiError::bad_request("Invalid departureDate", "departureDate is empty"))?;
        let return_date = parse_date("returnDate", self.return_date)?;
        validate_dates(departure_date, return_date, today)?;

        let mut params = FlightOfferParams::new(&origin, &destination, departure_date);
        params.return_date = return_date;
        params.adults = non_empty(self.adults).map(|v| count(Some(v)).filter(|n| *n > 0).unwrap_or(1));
        params.children = count(self.children);
        params.infants = count(self.infants);
        params.travel_class = parse_travel_class(self.travel_class)?;
        params.currency_code = non_empty(self.currency_code).map(|c| c.to_uppercase());
        params.max_price = non_empty(self.max_price)
            .and_then(|v| parse_leading_int(&v))
            .and_then(|n| u64::try_from(n).ok());
        params.max = non_empty(self.max).map(|v| count(Some(v)).filter(|n| *n > 0).unwrap_or(10));
        params.non_stop = flag(self.non_stop);
        Ok(params)
    }
}

/// Summary attached to a single-destination offers response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersSummary {
    pub total_results: usize,
    pub cheapest_price: Option<String>,
    pub cheapest_currency: Option<String>,
    pub airlines: Vec<String>,
}

impl OffersSummary {
    pub fn from_reply(reply: &ProviderReply) -> Self {
        let offers = reply.offers();

        // First of the minimum-priced offers wins ties.
        let cheapest = offers
            .iter()
            .filter_map(|o| o.price().map(|p| (p, o)))
            .fold(None::<(f64, &Offer)>, |best, (price, offer)| match best {
                Some((min, _)) if price.partial_cmp(&min) != Some(Ordering::Less) => best,
                _ => Some((price, offer)),
            })
            .map(|(_, offer)| offer);

        let mut airlines: Vec<String> = Vec::new();
        for code in offers.iter().flat_map(Offer::validating_airlines) {
            if !airlines.iter().any(|a| a == code) {
                airlines.push(code.to_string());
            }
        }

        Self {
            total_results: reply.data_items().len(),
            cheapest_price: cheapest.and_then(Offer::total_raw),
            cheapest_currency: cheapest.and_then(|o| o.currency().map(str::to_string)),
            airlines,
        }
    }
}

fn upstream_failure(
    reply: ProviderReply,
    request_params: Value,
    suggestions: &'static [&'static str],
) -> ApiError {
    let suggestions = if reply.first_error_code() == Some(141) {
        suggestions
    } else {
        &[]
    };
    ApiError::Upstream {
        status: reply.status,
        debug: Some(json!({
            "requestParams": request_params,
            "responseStatus": reply.status,
        })),
        body: reply.body,
        suggestions,
    }
}

/// Multi-destination search handler
pub async fn multiple(
    State(state): State<AppState>,
    Query(query): Query<MultiSearchQuery>,
) -> ApiResult<Json<Value>> {
    let request = query.into_request()?;
    let result = state.search.execute(&request).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "data": result.offers },
        "summary": result.summary,
    })))
}

/// Single-destination offers handler
pub async fn offers(
    State(state): State<AppState>,
    Query(query): Query<FlightOffersQuery>,
) -> ApiResult<Json<Value>> {
    let params = query.into_params(Local::now().date_naive())?;
    info!(
        "Flight offers search {} -> {} on {}",
        params.origin_location_code, params.destination_location_code, params.departure_date
    );

    let token = state
        .credentials
        .access_token()
        .await
        .map_err(ApiError::credential_with_suggestion)?;

    let reply = state.provider.search_offers(&params, &token).await?;
    info!("Flight offers search responded with status {}", reply.status);

    if reply.is_failure() {
        return Err(upstream_failure(reply, json!(params), OFFERS_SUGGESTIONS));
    }

    let summary = OffersSummary::from_reply(&reply);
    Ok(Json(json!({
        "success": true,
        "data": reply.body,
        "summary": summary,
    })))
}

/// Flight inspiration (cheapest destinations) handler
pub async fn destinations(
    State(state): State<AppState>,
    Query(query): Query<DestinationsQuery>,
) -> ApiResult<Json<Value>> {
    let origin = non_empty(query.origin).ok_or_else(|| {
        ApiError::bad_request(
            "Missing required parameters",
            "origin is required (e.g. PAR, NRT, ICN)",
        )
    })?;

    let params = DestinationSearchParams {
        origin: origin.trim().to_uppercase(),
        max_price: non_empty(query.max_price)
            .and_then(|v| parse_leading_int(&v))
            .and_then(|n| u64::try_from(n).ok()),
    };
    info!("Flight destinations search from {}", params.origin);

    let token = state
        .credentials
        .access_token()
        .await
        .map_err(ApiError::credential_with_suggestion)?;

    let reply = state.provider.flight_destinations(&params, &token).await?;
    if reply.is_failure() {
        return Err(upstream_failure(reply, json!(params), DESTINATIONS_SUGGESTIONS));
    }

    Ok(Json(json!({
        "success": true,
        "data": reply.body,
    })))
}

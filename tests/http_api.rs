use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Local};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;
use travel_proxy::config::Settings;
use travel_proxy::error::{CredentialError, ProviderError};
use travel_proxy::providers::{
    CredentialProvider, DestinationSearchParams, FlightOffersProvider, HotelSearchParams,
    ProviderReply, TravelProvider,
};
use travel_proxy::search::{Destination, FlightOfferParams};
use travel_proxy::web::{create_router, AppState};

/// Upstream stand-in with canned replies
struct FakeAmadeus {
    token: Result<String, CredentialError>,
    flights: HashMap<String, ProviderReply>,
    hotels: ProviderReply,
    flight_calls: AtomicUsize,
    token_calls: AtomicUsize,
}

impl FakeAmadeus {
    fn new() -> Self {
        Self {
            token: Ok("tok".to_string()),
            flights: HashMap::new(),
            hotels: ProviderReply::new(200, json!({"data": []})),
            flight_calls: AtomicUsize::new(0),
            token_calls: AtomicUsize::new(0),
        }
    }

    fn flights(mut self, code: &str, prices: &[&str]) -> Self {
        let data: Vec<Value> = prices
            .iter()
            .map(|p| json!({"type": "flight-offer", "price": {"total": p, "currency": "EUR"}}))
            .collect();
        self.flights
            .insert(code.to_string(), ProviderReply::new(200, json!({ "data": data })));
        self
    }
}

#[async_trait]
impl CredentialProvider for FakeAmadeus {
    async fn access_token(&self) -> Result<String, CredentialError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        self.token.clone()
    }
}

#[async_trait]
impl FlightOffersProvider for FakeAmadeus {
    async fn search_offers(
        &self,
        params: &FlightOfferParams,
        _token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        self.flight_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .flights
            .get(&params.destination_location_code)
            .cloned()
            .unwrap_or_else(|| {
                ProviderReply::new(
                    400,
                    json!({"errors": [{"code": 141, "title": "SYSTEM ERROR HAS OCCURRED"}]}),
                )
            }))
    }
}

#[async_trait]
impl TravelProvider for FakeAmadeus {
    async fn flight_destinations(
        &self,
        params: &DestinationSearchParams,
        _token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        Ok(ProviderReply::new(
            200,
            json!({"data": [{"origin": params.origin, "destination": "NRT"}]}),
        ))
    }

    async fn hotel_offers(
        &self,
        _params: &HotelSearchParams,
        _token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        Ok(self.hotels.clone())
    }

    async fn hotel_offers_by_hotel(
        &self,
        params: &HotelSearchParams,
        _token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        Ok(ProviderReply::new(
            200,
            json!({"data": {"hotel": {"hotelId": params.hotel_ids}}}),
        ))
    }
}

fn app(provider: FakeAmadeus) -> (Router, AppState) {
    let mut settings = Settings::default();
    settings.search.destinations = vec![Destination::new("CJU", "Jeju"), Destination::new("NRT", "Tokyo")];
    settings.search.dispatch_timeout = 1.0;

    let state = AppState::new(settings, provider);
    (create_router(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn future_date(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days)).to_string()
}

#[tokio::test]
async fn multi_destination_search_merges_and_orders() {
    let (app, _) = app(FakeAmadeus::new().flights("CJU", &["100.00", "50.00"]));

    let (status, body) = get(
        &app,
        "/api/flights/offers/multiple?originLocationCode=ICN&departureDate=2026-12-01",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let offers = body["data"]["data"].as_array().unwrap();
    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0]["price"]["total"], "50.00");
    assert_eq!(offers[0]["type"], "flight-offer");
    assert_eq!(offers[0]["destinationInfo"], json!({"code": "CJU", "name": "Jeju"}));

    assert_eq!(
        body["summary"],
        json!({
            "totalDestinations": 2,
            "successfulDestinations": 1,
            "totalFlights": 2,
            "cheapestPrice": "50.00",
            "cheapestCurrency": "EUR"
        })
    );
}

#[tokio::test]
async fn multi_destination_search_applies_max_price_and_max() {
    let (app, _) = app(
        FakeAmadeus::new()
            .flights("CJU", &["200", "90"])
            .flights("NRT", &["150", "120"]),
    );

    let (_, body) = get(
        &app,
        "/api/flights/offers/multiple?originLocationCode=ICN&departureDate=2026-12-01&maxPrice=180&max=2",
    )
    .await;

    let prices: Vec<&str> = body["data"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["price"]["total"].as_str().unwrap())
        .collect();
    assert_eq!(prices, vec!["90", "120"]);
    assert_eq!(body["summary"]["totalFlights"], 2);
}

#[tokio::test]
async fn multi_destination_search_validates_before_any_call() {
    let (app, state) = app(FakeAmadeus::new().flights("CJU", &["1"]));

    let (status, body) = get(&app, "/api/flights/offers/multiple?departureDate=2026-12-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("originLocationCode"));

    let (status, _) = get(
        &app,
        "/api/flights/offers/multiple?originLocationCode=ICN&departureDate=tomorrow",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(state.metrics.get_total_searches(), 0);
}

#[tokio::test]
async fn multi_destination_search_credential_failure_is_500() {
    let mut provider = FakeAmadeus::new().flights("CJU", &["1"]);
    provider.token = Err(CredentialError::new(
        "Amadeus token request rejected with status 401",
        json!({"error": "invalid_client"}),
    ));
    let (app, state) = app(provider);

    let (status, body) = get(
        &app,
        "/api/flights/offers/multiple?originLocationCode=ICN&departureDate=2026-12-01",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["detail"]["error"], "invalid_client");
    assert_eq!(state.metrics.get_total_searches(), 0);
}

#[tokio::test]
async fn total_outage_is_still_ok() {
    let (app, state) = app(FakeAmadeus::new());

    let (status, body) = get(
        &app,
        "/api/flights/offers/multiple?originLocationCode=ICN&departureDate=2026-12-01",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["successfulDestinations"], 0);
    assert_eq!(body["summary"]["totalFlights"], 0);
    assert_eq!(body["summary"]["cheapestPrice"], Value::Null);

    let (_, stats) = get(&app, "/api/stats").await;
    assert_eq!(stats["data"]["totalSearches"], 1);
    assert_eq!(stats["data"]["destinations"]["NRT"]["failures"], 1);
    assert_eq!(state.metrics.get_reliability("CJU"), 0.0);
}

#[tokio::test]
async fn single_destination_offers() {
    let (app, _) = app(FakeAmadeus::new().flights("NRT", &["300.00", "210.00"]));
    let departure = future_date(30);

    let (status, body) = get(
        &app,
        &format!(
            "/api/flights/offers?originLocationCode=icn&destinationLocationCode=nrt&departureDate={}",
            departure
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["totalResults"], 2);
    assert_eq!(body["summary"]["cheapestPrice"], "210.00");

    let (status, body) = get(
        &app,
        &format!(
            "/api/flights/offers?originLocationCode=ICN&destinationLocationCode=BKK&departureDate={}",
            departure
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["errors"][0]["code"], 141);
    assert_eq!(body["debug"]["requestParams"]["destinationLocationCode"], "BKK");
    assert!(!body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn single_destination_offers_validation() {
    let (app, _) = app(FakeAmadeus::new());

    let (status, body) = get(&app, "/api/flights/offers?originLocationCode=ICN").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["example"]["destinationLocationCode"], "NRT");

    let (status, _) = get(
        &app,
        &format!(
            "/api/flights/offers?originLocationCode=ICN&destinationLocationCode=NRT&departureDate={}",
            future_date(-1)
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn flight_destinations() {
    let (app, _) = app(FakeAmadeus::new());

    let (status, body) = get(&app, "/api/flights/destinations?origin=icn&maxPrice=300").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"][0]["origin"], "ICN");

    let (status, _) = get(&app, "/api/flights/destinations").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn hotel_compare() {
    let mut provider = FakeAmadeus::new();
    provider.hotels = ProviderReply::new(
        200,
        json!({
            "data": [
                {"hotel": {"hotelId": "EXPENSIVE"}, "offers": [{"price": {"total": "500"}}]},
                {"hotel": {"hotelId": "CHEAP"}, "offers": [{"price": {"total": "80", "currency": "JPY"}}]}
            ]
        }),
    );
    let (app, _) = app(provider);

    let (status, body) = get(&app, "/api/hotels/compare?cityCode=osa").await;
    assert_eq!(status, StatusCode::OK);

    let comparison = &body["data"]["comparison"];
    assert_eq!(comparison[0]["hotelId"], "CHEAP");
    assert_eq!(comparison[0]["lowestPrice"], 80.0);
    assert_eq!(comparison[0]["prices"][0]["currency"], "JPY");
    assert_eq!(comparison[1]["prices"][0]["currency"], "USD");
    assert_eq!(body["data"]["original"]["data"].as_array().unwrap().len(), 2);

    let (status, _) = get(&app, "/api/hotels/compare").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn hotel_routes() {
    let mut provider = FakeAmadeus::new();
    provider.hotels = ProviderReply::new(400, json!({"errors": [{"code": 477}]}));
    let (app, _) = app(provider);

    let (status, body) = get(&app, "/api/hotels?cityCode=OSA").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["errors"][0]["code"], 477);

    let (status, _) = get(&app, "/api/hotels").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/hotels/HLOSA123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["hotel"]["hotelId"], "HLOSA123");
}

#[tokio::test]
async fn user_crud() {
    let (app, _) = app(FakeAmadeus::new());

    let (status, body) = get(&app, "/api/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"name": "Lee", "email": "lee@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 3);

    let (status, _) = send(&app, Method::POST, "/api/users", Some(json!({"name": "Lee"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::PUT, "/api/users/3", Some(json!({"name": "Park"}))).await;
    assert_eq!(body["data"]["name"], "Park");
    assert_eq!(body["data"]["email"], "lee@example.com");

    let (status, _) = send(&app, Method::DELETE, "/api/users/3", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/users/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = get(&app, "/api/users/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trips_and_recommendations() {
    let (app, _) = app(FakeAmadeus::new());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trips",
        Some(json!({"destination": "Jeju Olle", "budget": "450000", "peopleCount": "2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["budget"], 450000);

    let (_, body) = get(&app, "/api/trips/3").await;
    assert_eq!(body["data"]["destination"], "Jeju Olle");

    let (_, body) = get(&app, "/api/recommendations?budget=460000&peopleCount=2&region=Jeju").await;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn service_routes() {
    let (app, _) = app(FakeAmadeus::new());

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["timestamp"].as_str().is_some());

    let (status, _) = get(&app, "/favicon.ico").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

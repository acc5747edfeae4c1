//! Amadeus self-service API provider
//!
//! Issues OAuth2 client-credentials tokens and calls the flight and hotel
//! shopping endpoints. Tokens are requested fresh for every call site; no
//! caching happens here.

use super::traits::*;
use crate::config::AmadeusSettings;
use crate::error::{CredentialError, ProviderError};
use crate::network::{is_timeout, HttpClient, ProviderRequest};
use crate::search::FlightOfferParams;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const FLIGHT_DESTINATIONS_PATH: &str = "/v1/shopping/flight-destinations";
const HOTEL_OFFERS_PATH: &str = "/v2/shopping/hotel-offers";
const HOTEL_OFFERS_BY_HOTEL_PATH: &str = "/v2/shopping/hotel-offers/by-hotel";

/// Amadeus API client
pub struct Amadeus {
    client: HttpClient,
    api_key: Option<String>,
    api_secret: Option<String>,
    token_url: String,
    flight_offers_url: String,
    flight_destinations_url: String,
    hotel_offers_url: String,
    hotel_offers_by_hotel_url: String,
}

impl Amadeus {
    /// Create a client for the configured environment
    pub fn new(client: HttpClient, settings: &AmadeusSettings) -> Result<Self> {
        let base = Url::parse(&settings.base_url)?;
        let endpoint = |path: &str| -> Result<String> { Ok(base.join(path)?.to_string()) };

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            token_url: endpoint(TOKEN_PATH)?,
            flight_offers_url: endpoint(FLIGHT_OFFERS_PATH)?,
            flight_destinations_url: endpoint(FLIGHT_DESTINATIONS_PATH)?,
            hotel_offers_url: endpoint(HOTEL_OFFERS_PATH)?,
            hotel_offers_by_hotel_url: endpoint(HOTEL_OFFERS_BY_HOTEL_PATH)?,
        })
    }

    /// Authorized GET returning the upstream status and JSON body
    async fn get(
        &self,
        url: &str,
        query: Vec<(String, String)>,
        token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        debug!("GET {} {:?}", url, query);
        let request = ProviderRequest::get(url).bearer(token).params(query);

        let response = self.client.execute(request).await.map_err(|e| {
            if is_timeout(&e) {
                ProviderError::Timeout
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let body = if response.is_success() {
            response
                .json::<Value>()
                .map_err(|e| ProviderError::Decode(e.to_string()))?
        } else {
            response.json_or_text()
        };

        debug!("{} responded with status {}", url, response.status);
        Ok(ProviderReply::new(response.status, body))
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some((key, secret))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl CredentialProvider for Amadeus {
    async fn access_token(&self) -> Result<String, CredentialError> {
        let (key, secret) = self.credentials().ok_or_else(|| {
            CredentialError::new(
                "Amadeus credentials are not configured",
                json!("AMADEUS_API_KEY or AMADEUS_API_SECRET is not set"),
            )
        })?;

        info!("Requesting Amadeus access token");
        let request = ProviderRequest::post(&self.token_url).form(vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), key.to_string()),
            ("client_secret".to_string(), secret.to_string()),
        ]);

        let response = self.client.execute(request).await.map_err(|e| {
            error!("Amadeus token request failed: {}", e);
            CredentialError::new("Amadeus token request failed", json!(e.to_string()))
        })?;

        let body = response.json_or_text();
        if !response.is_success() {
            error!(
                "Amadeus token request rejected with status {}: {}",
                response.status, body
            );
            return Err(CredentialError::new(
                format!("Amadeus token request rejected with status {}", response.status),
                body,
            ));
        }

        match body.get("access_token").and_then(|t| t.as_str()) {
            Some(token) if !token.is_empty() => {
                info!("Amadeus access token issued");
                Ok(token.to_string())
            }
            _ => Err(CredentialError::new(
                "Token response has no access_token",
                body,
            )),
        }
    }
}

#[async_trait]
impl FlightOffersProvider for Amadeus {
    async fn search_offers(
        &self,
        params: &FlightOfferParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        self.get(&self.flight_offers_url, params.to_query(), token)
            .await
    }
}

#[async_trait]
impl TravelProvider for Amadeus {
    async fn flight_destinations(
        &self,
        params: &DestinationSearchParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        self.get(&self.flight_destinations_url, params.to_query(), token)
            .await
    }

    async fn hotel_offers(
        &self,
        params: &HotelSearchParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        self.get(&self.hotel_offers_url, params.to_query(), token)
            .await
    }

    async fn hotel_offers_by_hotel(
        &self,
        params: &HotelSearchParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError> {
        self.get(&self.hotel_offers_by_hotel_url, params.to_query(), token)
            .await
    }
}

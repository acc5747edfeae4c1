//! Provider traits and types

use crate::error::{CredentialError, ProviderError};
use crate::search::{FlightOfferParams, Offer};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status and JSON body of an upstream call
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    pub status: u16,
    pub body: Value,
}

impl ProviderReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// The `errors` member, when present and non-empty
    pub fn errors(&self) -> Option<&Value> {
        match self.body.get("errors")? {
            Value::Null => None,
            Value::Array(items) if items.is_empty() => None,
            errors => Some(errors),
        }
    }

    /// Code of the first upstream error, if any
    pub fn first_error_code(&self) -> Option<i64> {
        self.errors()?.get(0)?.get("code")?.as_i64()
    }

    /// `status >= 400` or an `errors` payload, whatever the rest looks like
    pub fn is_failure(&self) -> bool {
        self.status >= 400 || self.errors().is_some()
    }

    /// Offers under `data`; non-object entries are skipped
    pub fn offers(&self) -> Vec<Offer> {
        self.data_items()
            .iter()
            .cloned()
            .filter_map(Offer::from_value)
            .collect()
    }

    /// Entries of the `data` array, empty when absent
    pub fn data_items(&self) -> &[Value] {
        self.body
            .get("data")
            .and_then(|d| d.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Parameters of a flight inspiration (cheapest destinations) search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationSearchParams {
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
}

impl DestinationSearchParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("origin".to_string(), self.origin.to_uppercase())];
        if let Some(max_price) = self.max_price {
            query.push(("maxPrice".to_string(), max_price.to_string()));
        }
        query
    }
}

/// Parameters of a hotel offers search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_ids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adults: Option<String>,
}

impl HotelSearchParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        [
            ("cityCode", self.city_code.as_ref().map(|c| c.to_uppercase())),
            ("hotelIds", self.hotel_ids.clone()),
            ("checkInDate", self.check_in_date.clone()),
            ("checkOutDate", self.check_out_date.clone()),
            ("adults", self.adults.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
    }
}

/// Source of bearer tokens for the upstream API
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Acquire a fresh access token
    async fn access_token(&self) -> Result<String, CredentialError>;
}

/// Single-destination flight offers search
#[async_trait]
pub trait FlightOffersProvider: Send + Sync {
    async fn search_offers(
        &self,
        params: &FlightOfferParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError>;
}

/// Full upstream surface used by the HTTP layer
#[async_trait]
pub trait TravelProvider: FlightOffersProvider {
    /// Cheapest destinations from an origin
    async fn flight_destinations(
        &self,
        params: &DestinationSearchParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError>;

    /// Hotel offers by city or hotel ids
    async fn hotel_offers(
        &self,
        params: &HotelSearchParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError>;

    /// Offers of one hotel
    async fn hotel_offers_by_hotel(
        &self,
        params: &HotelSearchParams,
        token: &str,
    ) -> Result<ProviderReply, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_failure_rules() {
        assert!(ProviderReply::new(500, json!({"data": [{"id": "1"}]})).is_failure());
        assert!(ProviderReply::new(200, json!({"errors": [{"code": 141}]})).is_failure());
        assert!(!ProviderReply::new(200, json!({"errors": []})).is_failure());
        assert!(!ProviderReply::new(200, json!({"data": []})).is_failure());

        let reply = ProviderReply::new(400, json!({"errors": [{"code": 141, "title": "SYSTEM ERROR"}]}));
        assert_eq!(reply.first_error_code(), Some(141));
    }

    #[test]
    fn test_reply_offers() {
        let reply = ProviderReply::new(200, json!({"data": [{"id": "1"}, "junk", {"id": "2"}]}));
        assert_eq!(reply.offers().len(), 2);
        assert!(ProviderReply::new(200, json!({"meta": {}})).offers().is_empty());
    }

    #[test]
    fn test_hotel_query() {
        let params = HotelSearchParams {
            city_code: Some("osa".to_string()),
            adults: Some("2".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("cityCode".to_string(), "OSA".to_string()),
                ("adults".to_string(), "2".to_string()),
            ]
        );
    }
}

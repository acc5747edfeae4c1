//! Flight search query and result data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A candidate destination searched by the multi-destination search
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    /// Location code (IATA airport or city code)
    pub code: String,
    /// Human readable label
    #[serde(rename = "name", alias = "display_name")]
    pub display_name: String,
}

impl Destination {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }
}

/// Cabin class accepted by the flight offers API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }
}

impl fmt::Display for TravelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ECONOMY" => Ok(Self::Economy),
            "PREMIUM_ECONOMY" => Ok(Self::PremiumEconomy),
            "BUSINESS" => Ok(Self::Business),
            "FIRST" => Ok(Self::First),
            other => Err(format!("unknown travel class: {}", other)),
        }
    }
}

/// Parameters of one flight offers search against the upstream API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOfferParams {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adults: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_class: Option<TravelClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_stop: Option<bool>,
}

impl FlightOfferParams {
    pub fn new(origin: &str, destination: &str, departure_date: NaiveDate) -> Self {
        Self {
            origin_location_code: origin.trim().to_uppercase(),
            destination_location_code: destination.trim().to_uppercase(),
            departure_date,
            return_date: None,
            adults: None,
            children: None,
            infants: None,
            travel_class: None,
            currency_code: None,
            max_price: None,
            max: None,
            non_stop: None,
        }
    }

    /// Query string pairs in the upstream's parameter names
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            (
                "originLocationCode".to_string(),
                self.origin_location_code.clone(),
            ),
            (
                "destinationLocationCode".to_string(),
                self.destination_location_code.clone(),
            ),
            ("departureDate".to_string(), self.departure_date.to_string()),
        ];

        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                query.push((key.to_string(), value));
            }
        };

        push("returnDate", self.return_date.map(|d| d.to_string()));
        push("adults", self.adults.map(|n| n.to_string()));
        push("children", self.children.map(|n| n.to_string()));
        push("infants", self.infants.map(|n| n.to_string()));
        push("travelClass", self.travel_class.map(|c| c.to_string()));
        push("currencyCode", self.currency_code.as_ref().map(|c| c.to_uppercase()));
        push("maxPrice", self.max_price.map(|p| p.to_string()));
        push("max", self.max.map(|n| n.to_string()));
        push("nonStop", self.non_stop.map(|b| b.to_string()));

        query
    }
}

/// A multi-destination search as requested by a client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiSearchRequest {
    pub origin_location_code: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub infants: Option<u32>,
    pub travel_class: Option<TravelClass>,
    pub currency_code: Option<String>,
    pub max_results_per_destination: Option<u32>,
    pub non_stop: Option<bool>,
    pub max_price: Option<f64>,
    pub overall_max: Option<usize>,
}

impl MultiSearchRequest {
    pub fn new(origin: impl Into<String>, departure_date: NaiveDate) -> Self {
        Self {
            origin_location_code: Some(origin.into()),
            departure_date: Some(departure_date),
            ..Default::default()
        }
    }

    /// Names of mandatory fields that are absent
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self
            .origin_location_code
            .as_deref()
            .map_or(true, |o| o.trim().is_empty())
        {
            missing.push("originLocationCode");
        }
        if self.departure_date.is_none() {
            missing.push("departureDate");
        }
        missing
    }

    /// Build the upstream request for one candidate destination.
    ///
    /// Returns `None` when a mandatory field is missing.
    pub fn for_destination(
        &self,
        destination: &Destination,
        per_destination_max: u32,
        default_adults: u32,
    ) -> Option<FlightOfferParams> {
        let origin = self.origin_location_code.as_deref()?;
        let departure_date = self.departure_date?;

        let mut params = FlightOfferParams::new(origin, &destination.code, departure_date);
        params.return_date = self.return_date;
        params.adults = Some(self.adults.unwrap_or(default_adults));
        params.children = self.children;
        params.infants = self.infants;
        params.travel_class = self.travel_class;
        params.currency_code = self.currency_code.as_ref().map(|c| c.to_uppercase());
        params.max = Some(
            self.max_results_per_destination
                .unwrap_or(per_destination_max),
        );
        params.non_stop = self.non_stop;
        // Rounded up so the upstream never drops what the local filter keeps.
        params.max_price = self.max_price.map(|p| p.ceil() as u64);
        Some(params)
    }
}

/// An offer as returned by the upstream, preserved field for field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Offer(pub Map<String, Value>);

impl Offer {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    fn price_field(&self, key: &str) -> Option<&Value> {
        self.0.get("price").and_then(|p| p.get(key))
    }

    /// `price.total` exactly as the upstream sent it
    pub fn total_raw(&self) -> Option<String> {
        match self.price_field("total")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric total price; `None` when missing, unparseable or non-finite
    pub fn price(&self) -> Option<f64> {
        let price = match self.price_field("total")? {
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            Value::Number(n) => n.as_f64()?,
            _ => return None,
        };
        price.is_finite().then_some(price)
    }

    /// `price.currency`
    pub fn currency(&self) -> Option<&str> {
        self.price_field("currency").and_then(|c| c.as_str())
    }

    /// `validatingAirlineCodes`
    pub fn validating_airlines(&self) -> impl Iterator<Item = &str> {
        self.0
            .get("validatingAirlineCodes")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|c| c.as_str())
    }
}

/// An offer tagged with the destination it was found for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedOffer {
    #[serde(flatten)]
    pub offer: Offer,
    pub destination_info: Destination,
}

impl AnnotatedOffer {
    pub fn new(mut offer: Offer, destination: Destination) -> Self {
        offer.0.remove("destinationInfo");
        Self {
            offer,
            destination_info: destination,
        }
    }

    pub fn price(&self) -> Option<f64> {
        self.offer.price()
    }
}

/// Settled result of one destination's dispatch
#[derive(Debug, Clone)]
pub struct DestinationOutcome {
    pub destination: Destination,
    pub succeeded: bool,
    /// Provider order; empty when failed
    pub offers: Vec<Offer>,
    /// Opaque upstream error payload or local failure description
    pub failure_reason: Option<Value>,
    pub elapsed_ms: u64,
}

impl DestinationOutcome {
    pub fn success(destination: Destination, offers: Vec<Offer>, elapsed_ms: u64) -> Self {
        Self {
            destination,
            succeeded: true,
            offers,
            failure_reason: None,
            elapsed_ms,
        }
    }

    pub fn failure(destination: Destination, reason: Value, elapsed_ms: u64) -> Self {
        Self {
            destination,
            succeeded: false,
            offers: Vec::new(),
            failure_reason: Some(reason),
            elapsed_ms,
        }
    }
}

/// Aggregate counters for one multi-destination search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    #[serde(rename = "totalDestinations")]
    pub total_candidate_destinations: usize,
    #[serde(rename = "successfulDestinations")]
    pub succeeded_destination_count: usize,
    #[serde(rename = "totalFlights")]
    pub total_offer_count: usize,
    #[serde(rename = "cheapestPrice")]
    pub cheapest_price: Option<String>,
    #[serde(rename = "cheapestCurrency")]
    pub cheapest_currency: Option<String>,
}

/// Merged offers plus their summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiSearchResult {
    pub offers: Vec<AnnotatedOffer>,
    pub summary: SearchSummary,
}

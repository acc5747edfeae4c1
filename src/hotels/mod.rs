//! Hotel price comparison
//!
//! Flattens a hotel offers response into one row per hotel, each with its
//! room prices and the lowest of them, cheapest hotel first.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// One priced room of a hotel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPrice {
    pub price: String,
    pub currency: String,
    pub room_type: String,
    pub board_type: String,
}

/// A hotel with all of its offers' prices
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelComparison {
    pub hotel_id: Option<Value>,
    pub hotel_name: Option<Value>,
    pub address: Option<Value>,
    pub prices: Vec<RoomPrice>,
    pub lowest_price: Option<f64>,
}

fn text(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn total(offer: &Value) -> Option<f64> {
    let total = offer.get("price")?.get("total")?;
    let price = match total {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}

impl HotelComparison {
    pub fn from_hotel(entry: &Value) -> Self {
        let hotel = entry.get("hotel");
        let field = |key: &str| hotel.and_then(|h| h.get(key)).cloned();

        let offers = entry
            .get("offers")
            .and_then(|o| o.as_array())
            .map(|o| o.as_slice())
            .unwrap_or(&[]);

        let prices = offers
            .iter()
            .map(|offer| {
                let price = offer.get("price");
                RoomPrice {
                    price: text(price.and_then(|p| p.get("total")), "N/A"),
                    currency: text(price.and_then(|p| p.get("currency")), "USD"),
                    room_type: text(offer.get("room").and_then(|r| r.get("type")), "Standard"),
                    board_type: text(offer.get("boardType"), "Room only"),
                }
            })
            .collect();

        let lowest_price = offers
            .iter()
            .filter_map(total)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        Self {
            hotel_id: field("hotelId"),
            hotel_name: field("name"),
            address: field("address"),
            prices,
            lowest_price,
        }
    }
}

/// Build the comparison for every hotel under `data`, cheapest first.
///
/// Hotels with no readable price go last, in response order.
pub fn compare(response: &Value) -> Vec<HotelComparison> {
    let mut hotels: Vec<HotelComparison> = response
        .get("data")
        .and_then(|d| d.as_array())
        .into_iter()
        .flatten()
        .map(HotelComparison::from_hotel)
        .collect();

    hotels.sort_by(|a, b| match (a.lowest_price, b.lowest_price) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    hotels
}

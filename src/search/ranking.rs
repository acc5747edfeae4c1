//! Merging, ordering and capping of per-destination results

use super::models::{AnnotatedOffer, DestinationOutcome, MultiSearchResult, SearchSummary};
use std::cmp::Ordering;

/// Ascending price order with unpriced offers last
fn compare_price(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Concatenate the offers of successful outcomes, in outcome order,
/// tagging each with its destination.
pub fn merge(outcomes: &[DestinationOutcome]) -> Vec<AnnotatedOffer> {
    outcomes
        .iter()
        .filter(|o| o.succeeded)
        .flat_map(|o| {
            o.offers
                .iter()
                .cloned()
                .map(move |offer| AnnotatedOffer::new(offer, o.destination.clone()))
        })
        .collect()
}

/// Stable sort by ascending price
pub fn sort_by_price(offers: &mut [AnnotatedOffer]) {
    offers.sort_by(|a, b| compare_price(a.price(), b.price()));
}

/// Keep offers priced at or under `max_price`; unpriced offers never pass.
pub fn filter_max_price(offers: Vec<AnnotatedOffer>, max_price: Option<f64>) -> Vec<AnnotatedOffer> {
    match max_price {
        Some(limit) => offers
            .into_iter()
            .filter(|o| o.price().map_or(false, |p| p <= limit))
            .collect(),
        None => offers,
    }
}

/// Merge, sort, filter and truncate, then summarize.
pub fn rank(
    outcomes: &[DestinationOutcome],
    max_price: Option<f64>,
    overall_max: usize,
) -> MultiSearchResult {
    let mut offers = merge(outcomes);
    sort_by_price(&mut offers);
    let mut offers = filter_max_price(offers, max_price);
    offers.truncate(overall_max);

    let cheapest = offers.first();
    let summary = SearchSummary {
        total_candidate_destinations: outcomes.len(),
        succeeded_destination_count: outcomes.iter().filter(|o| o.succeeded).count(),
        total_offer_count: offers.len(),
        cheapest_price: cheapest.and_then(|o| o.offer.total_raw()),
        cheapest_currency: cheapest.and_then(|o| o.offer.currency().map(str::to_string)),
    };

    MultiSearchResult { offers, summary }
}

//! Multi-destination search execution

use super::models::{Destination, DestinationOutcome, MultiSearchRequest, MultiSearchResult};
use super::ranking;
use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::metrics::Metrics;
use crate::providers::{CredentialProvider, FlightOffersProvider};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Searches every candidate destination concurrently and merges the offers
pub struct MultiDestinationSearch {
    /// Single-destination flight offers provider
    provider: Arc<dyn FlightOffersProvider>,
    /// Token source, asked once per search
    credentials: Arc<dyn CredentialProvider>,
    /// Fixed, ordered candidate list
    destinations: Vec<Destination>,
    /// Upper bound on a single dispatch
    dispatch_timeout: Duration,
    /// Shared cap on in-flight dispatches across concurrent searches
    limiter: Arc<Semaphore>,
    per_destination_max: u32,
    overall_max: usize,
    default_adults: u32,
    metrics: Option<Arc<Metrics>>,
}

impl MultiDestinationSearch {
    /// Create a new multi-destination search executor
    pub fn new(
        provider: Arc<dyn FlightOffersProvider>,
        credentials: Arc<dyn CredentialProvider>,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            provider,
            credentials,
            destinations: settings.destinations.clone(),
            dispatch_timeout: settings.dispatch_timeout(),
            limiter: Arc::new(Semaphore::new(settings.max_concurrent_dispatches.max(1))),
            per_destination_max: settings.per_destination_max,
            overall_max: settings.overall_max,
            default_adults: settings.default_adults,
            metrics: None,
        }
    }

    /// Record dispatch outcomes into a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Candidate destinations, in search order
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Validate, acquire a token, then search every destination.
    pub async fn execute(&self, request: &MultiSearchRequest) -> Result<MultiSearchResult, SearchError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(SearchError::Validation { missing });
        }

        if self.destinations.is_empty() {
            return Ok(MultiSearchResult::default());
        }

        let token = self.credentials.access_token().await?;
        self.execute_with_token(request, &token).await
    }

    /// Search every destination with an already acquired token.
    ///
    /// Individual destination failures never fail the call.
    pub async fn execute_with_token(
        &self,
        request: &MultiSearchRequest,
        token: &str,
    ) -> Result<MultiSearchResult, SearchError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(SearchError::Validation { missing });
        }

        if let Some(metrics) = &self.metrics {
            metrics.inc_search();
        }

        info!(
            "Executing multi-destination search from {:?} on {} destinations",
            request.origin_location_code,
            self.destinations.len()
        );

        let dispatches: Vec<_> = self
            .destinations
            .iter()
            .map(|destination| self.dispatch(destination, request, token))
            .collect();

        // Join barrier: every dispatch settles before anything is merged.
        let outcomes = join_all(dispatches).await;

        let overall_max = request.overall_max.unwrap_or(self.overall_max);
        let result = ranking::rank(&outcomes, request.max_price, overall_max);

        info!(
            "Multi-destination search finished: {} of {} destinations answered, {} offers returned",
            result.summary.succeeded_destination_count,
            result.summary.total_candidate_destinations,
            result.summary.total_offer_count
        );

        Ok(result)
    }

    /// Search a single destination; always settles into an outcome
    async fn dispatch(
        &self,
        destination: &Destination,
        request: &MultiSearchRequest,
        token: &str,
    ) -> DestinationOutcome {
        let start = Instant::now();
        let outcome = self.dispatch_inner(destination, request, token, start).await;

        if let Some(metrics) = &self.metrics {
            metrics.record_dispatch(&destination.code, outcome.succeeded, outcome.elapsed_ms);
        }

        match &outcome.failure_reason {
            Some(reason) => warn!(
                "Destination {} failed after {}ms: {}",
                destination.code, outcome.elapsed_ms, reason
            ),
            None => debug!(
                "Destination {} returned {} offers in {}ms",
                destination.code,
                outcome.offers.len(),
                outcome.elapsed_ms
            ),
        }

        outcome
    }

    async fn dispatch_inner(
        &self,
        destination: &Destination,
        request: &MultiSearchRequest,
        token: &str,
        start: Instant,
    ) -> DestinationOutcome {
        let elapsed = || start.elapsed().as_millis() as u64;

        let Some(params) =
            request.for_destination(destination, self.per_destination_max, self.default_adults)
        else {
            return DestinationOutcome::failure(
                destination.clone(),
                json!("Missing required parameters"),
                elapsed(),
            );
        };

        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return DestinationOutcome::failure(
                    destination.clone(),
                    json!("Dispatch limiter closed"),
                    elapsed(),
                )
            }
        };

        let reply = match timeout(self.dispatch_timeout, self.provider.search_offers(&params, token)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                return DestinationOutcome::failure(destination.clone(), e.detail(), elapsed())
            }
            Err(_) => {
                return DestinationOutcome::failure(
                    destination.clone(),
                    json!({ "message": format!("timed out after {:?}", self.dispatch_timeout) }),
                    elapsed(),
                )
            }
        };

        let offers = reply.offers();
        if reply.is_failure() || !(200..300).contains(&reply.status) || offers.is_empty() {
            let reason = reply
                .errors()
                .cloned()
                .unwrap_or_else(|| json!("No flights found"));
            return DestinationOutcome::failure(destination.clone(), reason, elapsed());
        }

        DestinationOutcome::success(destination.clone(), offers, elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CredentialError, ProviderError};
    use crate::providers::ProviderReply;
    use crate::search::FlightOfferParams;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider returning canned replies per destination, counting calls
    #[derive(Default)]
    struct FakeProvider {
        replies: HashMap<String, Result<ProviderReply, ProviderError>>,
        delays: HashMap<String, Duration>,
        calls: AtomicUsize,
        seen: Mutex<Vec<FlightOfferParams>>,
    }

    impl FakeProvider {
        fn reply(mut self, code: &str, prices: &[&str]) -> Self {
            let data: Vec<Value> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    json!({
                        "id": format!("{}-{}", code, i),
                        "price": {"total": p, "currency": "EUR"}
                    })
                })
                .collect();
            self.replies.insert(
                code.to_string(),
                Ok(ProviderReply::new(200, json!({ "data": data }))),
            );
            self
        }

        fn fail(mut self, code: &str, result: Result<ProviderReply, ProviderError>) -> Self {
            self.replies.insert(code.to_string(), result);
            self
        }

        fn delay(mut self, code: &str, delay: Duration) -> Self {
            self.delays.insert(code.to_string(), delay);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FlightOffersProvider for FakeProvider {
        async fn search_offers(
            &self,
            params: &FlightOfferParams,
            token: &str,
        ) -> Result<ProviderReply, ProviderError> {
            assert_eq!(token, "tok");
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(params.clone());

            let code = &params.destination_location_code;
            if let Some(delay) = self.delays.get(code) {
                tokio::time::sleep(*delay).await;
            }
            self.replies.get(code).cloned().unwrap_or_else(|| {
                Ok(ProviderReply::new(
                    400,
                    json!({"errors": [{"code": 425, "title": "INVALID DATE"}]}),
                ))
            })
        }
    }

    struct FakeCredentials {
        token: Result<String, CredentialError>,
        calls: AtomicUsize,
    }

    impl FakeCredentials {
        fn ok() -> Self {
            Self {
                token: Ok("tok".to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CredentialProvider for FakeCredentials {
        async fn access_token(&self) -> Result<String, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.token.clone()
        }
    }

    fn settings(codes: &[&str]) -> SearchSettings {
        SearchSettings {
            destinations: codes.iter().map(|c| Destination::new(*c, *c)).collect(),
            dispatch_timeout: 0.2,
            ..Default::default()
        }
    }

    fn search(
        provider: &Arc<FakeProvider>,
        credentials: &Arc<FakeCredentials>,
        codes: &[&str],
    ) -> MultiDestinationSearch {
        MultiDestinationSearch::new(provider.clone(), credentials.clone(), &settings(codes))
    }

    fn request() -> MultiSearchRequest {
        MultiSearchRequest::new("ICN", NaiveDate::from_ymd_opt(2026, 12, 1).unwrap())
    }

    fn prices(result: &MultiSearchResult) -> Vec<f64> {
        result.offers.iter().map(|o| o.price().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_without_dispatch() {
        let provider = Arc::new(FakeProvider::default().reply("CJU", &["100"]));
        let credentials = Arc::new(FakeCredentials::ok());
        let search = search(&provider, &credentials, &["CJU", "NRT"]);

        for bad in [
            MultiSearchRequest {
                origin_location_code: None,
                ..request()
            },
            MultiSearchRequest {
                departure_date: None,
                ..request()
            },
        ] {
            let err = search.execute(&bad).await.unwrap_err();
            assert!(matches!(err, SearchError::Validation { .. }));
        }

        assert_eq!(provider.calls(), 0);
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_dispatch_per_candidate() {
        let provider = Arc::new(FakeProvider::default());
        let credentials = Arc::new(FakeCredentials::ok());
        let codes = ["CJU", "NRT", "HND", "KIX", "FUK"];
        let search = search(&provider, &credentials, &codes);

        let mut req = request();
        req.max_price = Some(1.0);
        req.overall_max = Some(1);
        search.execute(&req).await.unwrap();

        assert_eq!(provider.calls(), codes.len());
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 1);

        let seen = provider.seen.lock().unwrap();
        assert!(seen.iter().all(|p| p.origin_location_code == "ICN"));
        assert!(seen.iter().all(|p| p.max == Some(5) && p.adults == Some(1)));
    }

    #[tokio::test]
    async fn test_all_destinations_fail() {
        let provider = Arc::new(
            FakeProvider::default()
                .fail("CJU", Err(ProviderError::Network("connection refused".into())))
                .fail("NRT", Ok(ProviderReply::new(500, json!("Internal Server Error")))),
        );
        let credentials = Arc::new(FakeCredentials::ok());
        let result = search(&provider, &credentials, &["CJU", "NRT", "HND"])
            .execute(&request())
            .await
            .unwrap();

        assert!(result.offers.is_empty());
        assert_eq!(result.summary.succeeded_destination_count, 0);
        assert_eq!(result.summary.total_candidate_destinations, 3);
        assert_eq!(result.summary.cheapest_price, None);
    }

    #[tokio::test]
    async fn test_partial_failure_merges_survivors() {
        let provider = Arc::new(FakeProvider::default().reply("CJU", &["100", "50"]));
        let credentials = Arc::new(FakeCredentials::ok());
        let result = search(&provider, &credentials, &["CJU", "NRT"])
            .execute(&request())
            .await
            .unwrap();

        assert_eq!(prices(&result), vec![50.0, 100.0]);
        assert!(result.offers.iter().all(|o| o.destination_info.code == "CJU"));
        assert_eq!(result.summary.succeeded_destination_count, 1);
        assert_eq!(result.summary.cheapest_price.as_deref(), Some("50"));
        assert_eq!(result.summary.cheapest_currency.as_deref(), Some("EUR"));
    }

    #[tokio::test]
    async fn test_max_price_filter() {
        let provider = Arc::new(
            FakeProvider::default()
                .reply("CJU", &["200"])
                .reply("NRT", &["150"]),
        );
        let credentials = Arc::new(FakeCredentials::ok());
        let mut req = request();
        req.max_price = Some(180.0);

        let result = search(&provider, &credentials, &["CJU", "NRT"])
            .execute(&req)
            .await
            .unwrap();

        assert_eq!(prices(&result), vec![150.0]);
        assert_eq!(result.summary.total_offer_count, 1);
        assert_eq!(result.summary.cheapest_price.as_deref(), Some("150"));
        assert_eq!(result.summary.succeeded_destination_count, 2);

        let seen = provider.seen.lock().unwrap();
        assert!(seen.iter().all(|p| p.max_price == Some(180)));
    }

    #[tokio::test]
    async fn test_overall_max() {
        let provider = Arc::new(
            FakeProvider::default()
                .reply("CJU", &["80"])
                .reply("NRT", &["40"]),
        );
        let credentials = Arc::new(FakeCredentials::ok());
        let mut req = request();
        req.overall_max = Some(1);

        let result = search(&provider, &credentials, &["CJU", "NRT"])
            .execute(&req)
            .await
            .unwrap();

        assert_eq!(prices(&result), vec![40.0]);
        assert_eq!(result.offers[0].destination_info.code, "NRT");
    }

    #[tokio::test]
    async fn test_zero_offers_and_error_payloads_are_failures() {
        let provider = Arc::new(
            FakeProvider::default()
                .fail("CJU", Ok(ProviderReply::new(200, json!({"data": []}))))
                .fail(
                    "NRT",
                    Ok(ProviderReply::new(
                        200,
                        json!({
                            "data": [{"price": {"total": "1", "currency": "EUR"}}],
                            "errors": [{"code": 141}]
                        }),
                    )),
                )
                .reply("HND", &["300"]),
        );
        let credentials = Arc::new(FakeCredentials::ok());
        let result = search(&provider, &credentials, &["CJU", "NRT", "HND"])
            .execute(&request())
            .await
            .unwrap();

        assert_eq!(prices(&result), vec![300.0]);
        assert_eq!(result.summary.succeeded_destination_count, 1);
    }

    #[tokio::test]
    async fn test_slow_destination_times_out_without_blocking_others() {
        let provider = Arc::new(
            FakeProvider::default()
                .reply("CJU", &["10"])
                .reply("NRT", &["5"])
                .delay("NRT", Duration::from_secs(30)),
        );
        let credentials = Arc::new(FakeCredentials::ok());

        let started = Instant::now();
        let result = search(&provider, &credentials, &["CJU", "NRT"])
            .execute(&request())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(prices(&result), vec![10.0]);
        assert_eq!(result.summary.succeeded_destination_count, 1);
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let provider = Arc::new(FakeProvider::default());
        let credentials = Arc::new(FakeCredentials::ok());
        let result = search(&provider, &credentials, &[])
            .execute(&request())
            .await
            .unwrap();

        assert_eq!(result, MultiSearchResult::default());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_credential_failure_is_fatal() {
        let provider = Arc::new(FakeProvider::default().reply("CJU", &["1"]));
        let credentials = Arc::new(FakeCredentials {
            token: Err(CredentialError::new("nope", json!("invalid_client"))),
            calls: AtomicUsize::new(0),
        });

        let err = search(&provider, &credentials, &["CJU"])
            .execute(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::Credential(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_metrics_recorded_per_dispatch() {
        let provider = Arc::new(FakeProvider::default().reply("CJU", &["1"]));
        let credentials = Arc::new(FakeCredentials::ok());
        let metrics = Arc::new(Metrics::new());
        let search = search(&provider, &credentials, &["CJU", "NRT"]).with_metrics(metrics.clone());

        search.execute(&request()).await.unwrap();

        assert_eq!(metrics.get_total_searches(), 1);
        assert_eq!(metrics.get_reliability("CJU"), 100.0);
        assert_eq!(metrics.get_reliability("NRT"), 0.0);
    }
}

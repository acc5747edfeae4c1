//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::providers::{CredentialProvider, FlightOffersProvider, TravelProvider};
use crate::search::MultiDestinationSearch;
use crate::store::DemoStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Upstream travel API
    pub provider: Arc<dyn TravelProvider>,
    /// Token source for the upstream API
    pub credentials: Arc<dyn CredentialProvider>,
    /// Multi-destination search executor
    pub search: Arc<MultiDestinationSearch>,
    /// Demo users and trips
    pub store: Arc<DemoStore>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state around a single upstream client
    pub fn new<P>(settings: Settings, provider: P) -> Self
    where
        P: TravelProvider + CredentialProvider + 'static,
    {
        let provider = Arc::new(provider);
        let flights: Arc<dyn FlightOffersProvider> = provider.clone();
        let credentials: Arc<dyn CredentialProvider> = provider.clone();
        let metrics = Arc::new(Metrics::new());

        let search = MultiDestinationSearch::new(flights, credentials.clone(), &settings.search)
            .with_metrics(metrics.clone());

        Self {
            settings: Arc::new(settings),
            provider,
            credentials,
            search: Arc::new(search),
            store: Arc::new(DemoStore::seeded()),
            metrics,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }

    /// Directory static files are served from
    pub fn static_dir(&self) -> PathBuf {
        PathBuf::from(&self.settings.server.static_dir)
    }
}

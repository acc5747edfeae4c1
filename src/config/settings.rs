//! Settings structures for Travel-Proxy-RS configuration

use crate::search::Destination;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub amadeus: AmadeusSettings,
    pub outgoing: OutgoingSettings,
    pub search: SearchSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("TRAVEL_PROXY_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("TRAVEL_PROXY_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("AMADEUS_API_KEY") {
            self.amadeus.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("AMADEUS_API_SECRET") {
            self.amadeus.api_secret = Some(val);
        }
        if let Ok(val) = std::env::var("AMADEUS_BASE_URL") {
            self.amadeus.base_url = val;
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug mode
    pub debug: bool,
    /// Instance name reported by the health endpoint
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "travel-proxy".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Directory served for static files (test page)
    pub static_dir: String,
    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            static_dir: "public".to_string(),
            cors: true,
        }
    }
}

/// Amadeus API settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmadeusSettings {
    /// API base URL (test or production environment)
    pub base_url: String,
    /// OAuth client id
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// OAuth client secret
    #[serde(skip_serializing)]
    pub api_secret: Option<String>,
}

impl AmadeusSettings {
    /// Whether both halves of the client credentials are present
    pub fn has_credentials(&self) -> bool {
        matches!((&self.api_key, &self.api_secret), (Some(k), Some(s)) if !k.is_empty() && !s.is_empty())
    }
}

impl Default for AmadeusSettings {
    fn default() -> Self {
        Self {
            base_url: "https://test.api.amadeus.com".to_string(),
            api_key: None,
            api_secret: None,
        }
    }
}

// Secrets stay out of debug logs.
impl std::fmt::Debug for AmadeusSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmadeusSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Multi-destination search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Candidate destinations searched on every multi-destination request
    pub destinations: Vec<Destination>,
    /// Per-dispatch timeout in seconds
    pub dispatch_timeout: f64,
    /// Concurrent outbound dispatches shared by all in-flight searches
    pub max_concurrent_dispatches: usize,
    /// Offers requested per destination when the client gives no `max`
    pub per_destination_max: u32,
    /// Final list cap when the client gives no `max`
    pub overall_max: usize,
    /// Adults assumed when the client gives none
    pub default_adults: u32,
}

impl SearchSettings {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.dispatch_timeout.max(0.0))
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            destinations: default_destinations(),
            dispatch_timeout: 8.0,
            max_concurrent_dispatches: 32,
            per_destination_max: 5,
            overall_max: 50,
            default_adults: 1,
        }
    }
}

/// Popular destinations out of Korea
fn default_destinations() -> Vec<Destination> {
    [
        ("CJU", "Jeju"),
        ("NRT", "Tokyo (Narita)"),
        ("HND", "Tokyo (Haneda)"),
        ("KIX", "Osaka"),
        ("FUK", "Fukuoka"),
        ("NGO", "Nagoya"),
        ("BKK", "Bangkok"),
        ("SIN", "Singapore"),
        ("HKG", "Hong Kong"),
        ("TPE", "Taipei"),
        ("PEK", "Beijing"),
        ("PVG", "Shanghai"),
        ("DPS", "Bali"),
        ("MNL", "Manila"),
        // domestic
        ("GMP", "Gimpo"),
    ]
    .into_iter()
    .map(|(code, name)| Destination::new(code, name))
    .collect()
}

//! HTTP client for calling upstream travel APIs

use super::types::{ProviderRequest, ProviderResponse, RequestBody};
use crate::config::{OutgoingSettings, ProxySettings};
use anyhow::Result;
use reqwest::{header, Client, ClientBuilder, Proxy};
use std::time::Duration;
use tracing::debug;

/// Shared reqwest client with the outgoing settings applied.
///
/// Non-2xx replies come back as values; only transport failures (connect,
/// TLS, timeout, body read) are errors.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
    user_agent: String,
}

fn with_proxies(builder: ClientBuilder, proxies: &ProxySettings) -> Result<ClientBuilder> {
    if let Some(all) = &proxies.all {
        return Ok(builder.proxy(Proxy::all(all)?));
    }
    let mut builder = builder;
    if let Some(http) = &proxies.http {
        builder = builder.proxy(Proxy::http(http)?);
    }
    if let Some(https) = &proxies.https {
        builder = builder.proxy(Proxy::https(https)?);
    }
    Ok(builder)
}

impl HttpClient {
    /// Client with default outgoing settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = Duration::from_secs_f64(settings.request_timeout);
        let builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .gzip(true)
            .brotli(true);

        Ok(Self {
            inner: with_proxies(builder, &settings.proxies)?.build()?,
            timeout,
            user_agent: format!("travel-proxy-rs/{}", crate::VERSION),
        })
    }

    /// Send a request with the default timeout
    pub async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        self.execute_with_timeout(request, self.timeout).await
    }

    pub async fn execute_with_timeout(
        &self,
        request: ProviderRequest,
        timeout: Duration,
    ) -> Result<ProviderResponse> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .inner
            .request(request.method, &request.url)
            .timeout(timeout)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT, "application/json")
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            Some(RequestBody::Json(value)) => builder.json(&value),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ProviderResponse { status, body })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// True when an error returned by [`HttpClient`] came from a timeout
pub fn is_timeout(err: &anyhow::Error) -> bool {
    err.downcast_ref::<reqwest::Error>()
        .map_or(false, reqwest::Error::is_timeout)
}

use reqwest::Url;
use serde::Deserialize;
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

use crate::{
    config::ClientConfig,
    error::WeatherError,
    model::WeatherReport,
    transport::{HttpResponse, HttpTransport, ReqwestTransport},
};

/// Number of days requested from the forecast endpoint.
pub const FORECAST_DAYS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `forecast.json`: current conditions plus [`FORECAST_DAYS`] daily entries.
    Forecast,
    /// `current.json`: current conditions only.
    Current,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Forecast => "forecast.json",
            Endpoint::Current => "current.json",
        }
    }

    fn days(&self) -> Option<u8> {
        match self {
            Endpoint::Forecast => Some(FORECAST_DAYS),
            Endpoint::Current => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Client for the weatherapi.com JSON API.
///
/// Holds no mutable state; clones share the transport and may be used from
/// any number of tasks at once. Identical concurrent lookups are not merged.
#[derive(Clone)]
pub struct WeatherClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient").field("config", &self.config).finish_non_exhaustive()
    }
}

impl WeatherClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current conditions plus a three-day forecast for `city`.
    ///
    /// Resolves exactly once. Issues exactly one GET when the request URL can
    /// be built and none otherwise. Failures are never retried.
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        self.fetch(city, Endpoint::Forecast).await
    }

    /// Current conditions only; the returned report has no forecast.
    pub async fn fetch_current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        self.fetch(city, Endpoint::Current).await
    }

    pub async fn fetch(&self, city: &str, endpoint: Endpoint) -> Result<WeatherReport, WeatherError> {
        let result = self.fetch_inner(city, endpoint).await;

        if let Err(err) = &result {
            warn!(city, %endpoint, kind = ?err.kind(), error = %err, "Weather lookup failed");
        }

        result
    }

    async fn fetch_inner(
        &self,
        city: &str,
        endpoint: Endpoint,
    ) -> Result<WeatherReport, WeatherError> {
        let url = self.build_url(city, endpoint)?;

        debug!(city = city.trim(), %endpoint, "Requesting weather");

        let res = self.transport.get(&url).await.map_err(WeatherError::Transport)?;

        debug!(status = res.status, bytes = res.body.len(), "Weather response received");

        interpret_response(res)
    }

    /// `{base_url}/{endpoint}?key=..&q=..[&days=3]` with the city percent-encoded.
    pub fn build_url(&self, city: &str, endpoint: Endpoint) -> Result<Url, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::invalid_request("city name is empty"));
        }
        if city.chars().any(char::is_control) {
            return Err(WeatherError::invalid_request("city name contains control characters"));
        }

        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{}", endpoint.path())).map_err(|e| {
            WeatherError::invalid_request(format!("invalid base URL '{base}': {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WeatherError::invalid_request(format!(
                "unsupported scheme '{}' in base URL",
                url.scheme()
            )));
        }

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.config.api_key).append_pair("q", city);
            if let Some(days) = endpoint.days() {
                query.append_pair("days", &days.to_string());
            }
        }

        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Classify a received response: status first, then body presence, then shape.
fn interpret_response(res: HttpResponse) -> Result<WeatherReport, WeatherError> {
    if !res.is_success() {
        let message = serde_json::from_slice::<ProviderErrorBody>(&res.body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| truncate_body(&String::from_utf8_lossy(&res.body)));

        return Err(WeatherError::Status { status: res.status, message });
    }

    if res.body.is_empty() {
        return Err(WeatherError::NoData);
    }

    Ok(WeatherReport::from_json(&res.body)?)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

//! Client side of the lookup: turns a parameter bag into one proxy call.
//!
//! Renderers go through [`WeatherClient`]; nothing here knows the upstream
//! provider or its credential.

use reqwest::{Client, Url};
use tracing::{debug, instrument};

use crate::{
    error::{ClientError, GENERIC_FAILURE},
    model::{ErrorEnvelope, LookupParams, LookupRequest, Units, WeatherPayload},
    server::LOOKUP_PATH,
};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

impl LookupParams {
    pub fn city(city: impl Into<String>) -> Self {
        Self { city: Some(city.into()), ..Self::default() }
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        Self { lat: Some(lat), lon: Some(lon), ..Self::default() }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Decide the lookup mode, failing fast when there is nothing to look up.
    pub fn normalize(&self) -> Result<LookupRequest, ClientError> {
        LookupRequest::from_parts(self.city.as_deref(), self.lat, self.lon, self.units.unwrap_or_default())
            .map_err(|_| ClientError::InvalidInput)
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full proxy URL for a normalized request.
    pub fn lookup_url(&self, request: &LookupRequest) -> Result<Url, ClientError> {
        let raw = format!("{}{}?{}", self.base_url, LOOKUP_PATH, request.to_query_string());
        Ok(Url::parse(&raw)?)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_weather(&self, params: &LookupParams) -> Result<WeatherPayload, ClientError> {
        let request = params.normalize()?;
        let url = self.lookup_url(&request)?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            debug!(status = status.as_u16(), %message, "weather proxy returned an error");
            return Err(ClientError::Server { status: status.as_u16(), message });
        }

        Ok(WeatherPayload::from_json_bytes(body)?)
    }
}

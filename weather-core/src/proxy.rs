//! Server-side lookup: the only component that holds the upstream credential.

use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::{
    Config, LookupError,
    model::{LookupQuery, WeatherPayload},
    provider::{WeatherProvider, provider_from_config},
};

/// Validates inbound lookups and forwards them to the upstream provider.
///
/// A proxy without a provider is a deployment without a credential: every
/// lookup fails with [`LookupError::Configuration`] before the query is
/// even looked at.
#[derive(Debug, Clone)]
pub struct WeatherProxy {
    provider: Option<Arc<dyn WeatherProvider>>,
}

impl WeatherProxy {
    pub fn new(provider: Option<Arc<dyn WeatherProvider>>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &Config) -> Self {
        let proxy = Self::new(provider_from_config(config));
        if !proxy.is_configured() {
            error!("OpenWeather API key is not configured; all lookups will fail");
        }
        proxy
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    #[instrument(skip(self))]
    pub async fn lookup(&self, query: &LookupQuery) -> Result<WeatherPayload, LookupError> {
        let provider = self.provider.as_ref().ok_or(LookupError::Configuration)?;
        let request = query.to_request()?;

        let payload = provider.current_weather(&request).await?;
        info!(units = %request.units, "weather lookup served");
        Ok(payload)
    }
}

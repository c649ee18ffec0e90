use crate::{Config, LookupError, LookupRequest, WeatherPayload, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Upstream source of current conditions.
///
/// Implementations classify the upstream outcome themselves: a missing city
/// is [`LookupError::NotFound`], anything else that went wrong is
/// [`LookupError::UpstreamFailure`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, request: &LookupRequest) -> Result<WeatherPayload, LookupError>;
}

/// Construct the upstream provider from config, or `None` when no credential is set.
pub fn provider_from_config(config: &Config) -> Option<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = match config.base_url.as_deref() {
        Some(url) => OpenWeatherProvider::with_base_url(api_key.to_owned(), url),
        None => OpenWeatherProvider::new(api_key.to_owned()),
    };

    Some(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_provider_without_api_key() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg).is_none());
    }

    #[test]
    fn provider_built_when_api_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg).expect("provider");
        assert!(!format!("{provider:?}").contains("KEY"));
    }
}

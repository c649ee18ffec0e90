use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::{
    LookupError,
    model::{Location, LookupRequest, WeatherPayload},
};

use super::WeatherProvider;

pub const OPENWEATHER_CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, OPENWEATHER_CURRENT_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }

    fn upstream_query(&self, request: &LookupRequest) -> Vec<(&'static str, String)> {
        let mut query = match &request.location {
            Location::ByCity(city) => vec![("q", city.clone())],
            Location::ByCoordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        query.push(("appid", self.api_key.clone()));
        query.push(("units", request.units.as_str().to_string()));
        query
    }

    async fn fetch(&self, request: &LookupRequest) -> anyhow::Result<Fetched> {
        // The request URL carries the credential, so strip it from transport errors.
        let res = self
            .http
            .get(&self.base_url)
            .query(&self.upstream_query(request))
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Fetched::NotFound);
        }

        let body = res
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&String::from_utf8_lossy(&body)),
            ));
        }

        let payload = WeatherPayload::from_json_bytes(body)
            .context("Failed to parse OpenWeather current JSON")?;

        Ok(Fetched::Found(payload))
    }
}

enum Fetched {
    Found(WeatherPayload),
    NotFound,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn current_weather(&self, request: &LookupRequest) -> Result<WeatherPayload, LookupError> {
        match self.fetch(request).await {
            Ok(Fetched::Found(payload)) => {
                debug!(bytes = payload.as_bytes().len(), "upstream lookup succeeded");
                Ok(payload)
            }
            Ok(Fetched::NotFound) => {
                debug!("upstream reported no match");
                Err(LookupError::NotFound)
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "upstream lookup failed");
                Err(LookupError::UpstreamFailure(err))
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Units;
    use wiremock::matchers::{method, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london() -> serde_json::Value {
        serde_json::json!({
            "name": "London",
            "main": { "temp": 14.2, "feels_like": 13.1, "humidity": 70, "pressure": 1015 },
            "weather": [{ "description": "overcast clouds" }],
            "wind": { "speed": 3.6 }
        })
    }

    #[tokio::test]
    async fn city_lookup_sends_q_and_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .and(query_param_is_missing("lat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri());
        let payload = provider
            .current_weather(&LookupRequest::by_city("London", Units::Metric))
            .await
            .expect("payload");

        assert_eq!(payload.to_value().unwrap(), london());
    }

    #[tokio::test]
    async fn coordinate_lookup_sends_lat_lon() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("lat", "51.5074"))
            .and(query_param("lon", "-0.1278"))
            .and(query_param("units", "imperial"))
            .and(query_param_is_missing("q"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri());
        let result = provider
            .current_weather(&LookupRequest::by_coordinates(51.5074, -0.1278, Units::Imperial))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn upstream_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri());
        let err = provider
            .current_weather(&LookupRequest::by_city("Nonexistent", Units::Metric))
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::NotFound));
    }

    #[tokio::test]
    async fn other_failures_are_upstream_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Broken"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri());
        for city in ["Broken", "Garbled"] {
            let err = provider
                .current_weather(&LookupRequest::by_city(city, Units::Metric))
                .await
                .unwrap_err();
            assert!(matches!(err, LookupError::UpstreamFailure(_)), "{city}: {err:?}");
        }
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_credential() {
        // Nothing listens on port 9 locally.
        let provider = OpenWeatherProvider::with_base_url("SECRET".into(), "http://127.0.0.1:9/");
        let err = provider
            .current_weather(&LookupRequest::by_city("London", Units::Metric))
            .await
            .unwrap_err();

        match err {
            LookupError::UpstreamFailure(cause) => assert!(!format!("{cause:#}").contains("SECRET")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}

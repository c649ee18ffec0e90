use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::LookupError;

/// Measurement system understood by the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    /// Parse a wire value; absent, empty or unrecognised means the default.
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.trim().parse().ok()).unwrap_or_default()
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// Where to look the weather up.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    ByCity(String),
    ByCoordinates { lat: f64, lon: f64 },
}

/// A validated lookup: exactly one location plus the units to report in.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRequest {
    pub location: Location,
    pub units: Units,
}

impl LookupRequest {
    pub fn by_city(city: impl Into<String>, units: Units) -> Self {
        Self { location: Location::ByCity(city.into()), units }
    }

    pub fn by_coordinates(lat: f64, lon: f64, units: Units) -> Self {
        Self { location: Location::ByCoordinates { lat, lon }, units }
    }

    /// The only place a loose set of inputs becomes a request.
    ///
    /// A non-blank city wins and any coordinates are ignored. Otherwise both
    /// coordinates must be present and finite.
    pub fn from_parts(
        city: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
        units: Units,
    ) -> Result<Self, LookupError> {
        if let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) {
            return Ok(Self::by_city(city, units));
        }

        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Ok(Self::by_coordinates(lat, lon, units))
            }
            _ => Err(LookupError::InvalidRequest),
        }
    }

    /// Query pairs identifying this lookup, without any credential.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = match &self.location {
            Location::ByCity(city) => vec![("city", city.clone())],
            Location::ByCoordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        pairs.push(("units", self.units.as_str().to_string()));
        pairs
    }

    /// Canonical `application/x-www-form-urlencoded` query for the proxy.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

/// Raw query parameters of `GET /weather-lookup` as they arrive on the wire.
#[derive(Debug, Clone, Default)]
pub struct LookupQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub city: Option<String>,
    pub units: Option<String>,
}

impl LookupQuery {
    pub fn city(city: &str) -> Self {
        Self { city: Some(city.to_string()), ..Self::default() }
    }

    pub fn coordinates(lat: &str, lon: &str) -> Self {
        Self { lat: Some(lat.to_string()), lon: Some(lon.to_string()), ..Self::default() }
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    /// Build a query from a raw query string. The first value of a repeated key wins.
    pub fn from_query_str(raw: &str) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match key.as_ref() {
                "lat" => &mut query.lat,
                "lon" => &mut query.lon,
                "city" => &mut query.city,
                "units" => &mut query.units,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }

    pub fn to_request(&self) -> Result<LookupRequest, LookupError> {
        LookupRequest::from_parts(
            self.city.as_deref(),
            parse_coordinate(self.lat.as_deref()),
            parse_coordinate(self.lon.as_deref()),
            Units::from_param(self.units.as_deref()),
        )
    }
}

// Unparsable coordinates count as absent.
fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

/// Client-side parameter bag handed to the query normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupParams {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub units: Option<Units>,
}

/// Upstream response body, kept as the exact bytes received.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload(Bytes);

impl WeatherPayload {
    /// Wrap a body after checking it is well-formed JSON.
    pub fn from_json_bytes(body: Bytes) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<serde::de::IgnoredAny>(&body)?;
        Ok(Self(body))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.0)
    }

    pub fn summary(&self) -> Result<WeatherSummary, serde_json::Error> {
        let parsed: OwCurrentResponse = serde_json::from_slice(&self.0)?;
        Ok(parsed.into())
    }
}

/// `{ "error": "..." }` body used for every non-success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

/// The handful of fields a renderer shows from a current-weather payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub location_name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed: f64,
    pub observation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl From<OwCurrentResponse> for WeatherSummary {
    fn from(parsed: OwCurrentResponse) -> Self {
        let condition = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            location_name: parsed.name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            condition,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            observation_time: parsed.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

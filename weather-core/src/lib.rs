//! Core library for the weather lookup proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream provider abstraction and its OpenWeather implementation
//! - The proxy that validates, forwards and classifies lookups, plus its HTTP router
//! - The client-side query normalizer used by renderers
//!
//! It is used by `weather-cli`, but can also be embedded in other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod proxy;
pub mod server;

pub use client::WeatherClient;
pub use config::Config;
pub use error::{ClientError, LookupError};
pub use model::{
    ErrorEnvelope, Location, LookupParams, LookupQuery, LookupRequest, Units, WeatherPayload,
    WeatherSummary,
};
pub use provider::WeatherProvider;
pub use proxy::WeatherProxy;

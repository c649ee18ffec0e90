//! HTTP surface of the proxy.

use anyhow::Context;
use axum::{
    Router,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::{model::LookupQuery, proxy::WeatherProxy};

pub const LOOKUP_PATH: &str = "/weather-lookup";
/// Path the browser front end historically called.
pub const LEGACY_LOOKUP_PATH: &str = "/api/weather";

pub fn router(proxy: Arc<WeatherProxy>) -> Router {
    Router::new()
        .route(LOOKUP_PATH, get(weather_lookup))
        .route(LEGACY_LOOKUP_PATH, get(weather_lookup))
        .route("/health", get(health))
        .with_state(proxy)
}

/// Bind `address` and serve until the process is stopped.
pub async fn serve(address: SocketAddr, proxy: Arc<WeatherProxy>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(%address, "weather proxy listening");
    axum::serve(listener, router(proxy)).await.context("HTTP server failed")
}

async fn weather_lookup(
    State(proxy): State<Arc<WeatherProxy>>,
    RawQuery(raw): RawQuery,
) -> Response {
    // Repeated keys keep their first value; no query shape is rejected here.
    let query = LookupQuery::from_query_str(raw.as_deref().unwrap_or_default());
    match proxy.lookup(&query).await {
        Ok(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            payload.into_bytes(),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::model::ErrorEnvelope;

/// Fallback message when the proxy's error body can't be read.
pub const GENERIC_FAILURE: &str = "Failed to fetch weather data";

/// Everything the proxy can answer besides a successful lookup.
///
/// The `Display` text of each variant is exactly what the caller receives;
/// any underlying cause stays in the server log.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("API key is not configured")]
    Configuration,

    #[error("Either city name or coordinates (lat/lon) are required")]
    InvalidRequest,

    #[error("City not found")]
    NotFound,

    #[error("Failed to fetch weather data")]
    UpstreamFailure(#[source] anyhow::Error),
}

impl LookupError {
    pub fn status(&self) -> StatusCode {
        match self {
            LookupError::Configuration | LookupError::UpstreamFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LookupError::InvalidRequest => StatusCode::BAD_REQUEST,
            LookupError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.to_string())
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// Failures seen by callers of [`crate::client::WeatherClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Either city or coordinates must be provided")]
    InvalidInput,

    #[error("Invalid weather service URL: {0}")]
    InvalidServerUrl(#[from] url::ParseError),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to reach the weather service")]
    Transport(#[from] reqwest::Error),

    #[error("Weather service returned an unreadable payload")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(LookupError::Configuration.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(LookupError::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(LookupError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            LookupError::UpstreamFailure(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_cause_is_not_in_the_envelope() {
        let err = LookupError::UpstreamFailure(anyhow::anyhow!("status 503 from appid=SECRET"));
        assert_eq!(err.envelope().error, GENERIC_FAILURE);
    }
}

use axum::response::{IntoResponse, Response};
use reqwest::StatusCode;

use crate::bridge::Failure;

pub mod gif;

pub type ApiResult<T> = Result<T, ApiError>;

pub struct ApiError(Failure);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Failure::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Failure::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
            Failure::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Failure::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Failure::ProcessLaunch(_) | Failure::Stream(_) | Failure::Transcode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        log::error!("Api: {}", self.0);
        (status, self.0.to_string()).into_response()
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        Self(failure)
    }
}

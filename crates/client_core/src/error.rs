use std::fmt;

use thiserror::Error;

use crate::sequencer::Generation;

/// Transport-level failure of a single ApiClient call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ApiError::Server {
                status: status.as_u16(),
                detail: None,
            };
        }
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        if err.is_timeout() {
            return ApiError::Network(format!("request timed out: {err}"));
        }
        ApiError::Network(err.to_string())
    }
}

/// Input rejected before any request is issued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("invalid {field} coordinate (latitude={latitude}, longitude={longitude})")]
    Coordinate {
        field: &'static str,
        latitude: f64,
        longitude: f64,
    },
    #[error("no file selected")]
    NoFileSelected,
    #[error("file '{0}' is not a .csv file")]
    NotCsv(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStep {
    Route,
    Nearby,
}

impl fmt::Display for RouteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteStep::Route => f.write_str("route"),
            RouteStep::Nearby => f.write_str("nearby accidents"),
        }
    }
}

/// One sub-request of a safe-route computation failed; the other is reflected
/// in the view independently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step} request failed for generation {generation}: {error}")]
pub struct PartialFailure {
    pub generation: Generation,
    pub step: RouteStep,
    pub error: ApiError,
}

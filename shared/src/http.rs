//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// Standard API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
            code: None,
            missing: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(message.into()),
            code: None,
            missing: None,
        }
    }

    /// Envelope describing a failed operation.
    pub fn from_error(err: &Error) -> Self {
        let mut response = Self::error(err.to_string());
        response.code = err.code().map(String::from);
        if let Error::Config { missing } = err {
            response.error = Some("Missing environment variables".to_string());
            response.missing = Some(missing.clone());
        }
        response
    }
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("access-control-allow-origin", ALLOW_ORIGIN)
        .header("access-control-allow-methods", ALLOW_METHODS)
        .header("access-control-allow-headers", ALLOW_HEADERS)
        .body(Body::from(serde_json::to_string(data)?))
        .map_err(Box::new)?;

    Ok(response)
}

/// Create an error response for the given error.
pub fn error_response(err: &Error) -> std::result::Result<Response<Body>, lambda_http::Error> {
    json_response(err.status_code(), &ApiResponse::from_error(err))
}

/// Empty 200 answer to a CORS preflight.
pub fn preflight_response() -> std::result::Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(200)
        .header("access-control-allow-origin", ALLOW_ORIGIN)
        .header("access-control-allow-methods", ALLOW_METHODS)
        .header("access-control-allow-headers", ALLOW_HEADERS)
        .body(Body::Empty)
        .map_err(Box::new)?;

    Ok(response)
}

/// Parse a request body as JSON, treating an empty body as `{}`.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    serde_json::from_slice(body)
        .map_err(|e| Error::Validation(format!("Invalid request body: {}", e)))
}

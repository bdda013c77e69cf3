use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;
use utoipa::ToSchema;

use crate::store::PersistenceError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Validation messages keyed by request field; `_schema` refers to the body as a whole
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[schema(value_type = Object, example = json!({"latitude": ["Not a valid number."]}))]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub const SCHEMA_FIELD: &'static str = "_schema";

    pub fn schema(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(Self::SCHEMA_FIELD, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request body, reported per field
    #[error("Invalid request body")]
    Validation(FieldErrors),
    /// Malformed query string, reported as `{error}`
    #[error("{0}")]
    InvalidQuery(&'static str),
    /// Well-formed request that cannot be applied, reported as `{message}`
    #[error("{0}")]
    Rejected(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::InvalidQuery(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: message.to_string(),
                }),
            )
                .into_response(),
            ApiError::Rejected(message) => {
                (StatusCode::BAD_REQUEST, Json(MessageResponse::new(message))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(MessageResponse::new(message))).into_response()
            }
            ApiError::Persistence(err) => internal_error(err).into_response(),
        }
    }
}

/// Helper to log error and return it to the client as an internal server error
pub fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<ErrorResponse>) {
    error!("Internal error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use invite::{
    ValidationErrors,
    payloads::{ConfirmationResponse, ErrorBody},
};
use thiserror::Error;
use tracing::debug;

use crate::{database::StoreError, gate::GateError, notifier::NotifyError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Database error")]
    ServiceUnavailable(#[source] StoreError),

    #[error("Failed to record RSVP, please try again")]
    Persistence(#[source] StoreError),

    #[error("PIN verification not configured")]
    PinNotConfigured,

    #[error("Failed to send email")]
    Notification(#[source] NotifyError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected payload: {rejection}");

        AppError::MalformedPayload
    }
}

impl From<GateError> for AppError {
    fn from(error: GateError) -> Self {
        match error {
            GateError::ServiceUnavailable(e) => AppError::ServiceUnavailable(e),
            GateError::PinNotConfigured => AppError::PinNotConfigured,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::MissingField { .. } => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Persistence { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PinNotConfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Notification { .. } => StatusCode::BAD_GATEWAY,
        };

        if let AppError::Notification(_) = self {
            let body = ConfirmationResponse {
                success: false,
                error: Some(self.to_string()),
            };
            return (status, Json(body)).into_response();
        }

        let fields = match &self {
            AppError::Validation(errors) => errors.messages(),
            _ => Vec::new(),
        };

        let body = ErrorBody {
            error: self.to_string(),
            fields,
        };

        (status, Json(body)).into_response()
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crates::domain::value_objects::enums::features::Feature;
use serde::Serialize;
use thiserror::Error;

use crate::usecases::{
    gateway::GenerationError, payments::PaymentError, sessions::SessionError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<Feature>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Quota exhausted with no active subscription: the expected signal
    /// to open the payment flow, not a fault.
    #[error("Payment required for {0}")]
    PaymentRequired(Feature),

    /// The generation API rejected our credentials; the operator has to
    /// refresh them before retrying.
    #[error("Generation credentials rejected: {0}")]
    Credential(String),

    #[error("No {0} was produced")]
    NothingGenerated(&'static str),

    #[error("Generation service error: {0}")]
    Upstream(String),

    #[error("Generation service unreachable, check your connection")]
    Transport,

    #[error("The render did not finish in time")]
    Timeout,

    #[error("The render was canceled")]
    Canceled,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, feature) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::PaymentRequired(feature) => (
                StatusCode::PAYMENT_REQUIRED,
                format!(
                    "Free {feature} quota is exhausted; submit a payment to continue"
                ),
                Some(feature),
            ),
            AppError::Credential(_) => (
                StatusCode::BAD_GATEWAY,
                "Generation credentials were rejected; select a valid API key".to_string(),
                None,
            ),
            AppError::NothingGenerated(what) => (
                StatusCode::BAD_GATEWAY,
                format!("The generation service produced no {what}"),
                None,
            ),
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "The generation service reported an error".to_string(),
                None,
            ),
            AppError::Transport => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Generation service unreachable, check your connection".to_string(),
                None,
            ),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "The render did not finish in time".to_string(),
                None,
            ),
            AppError::Canceled => (
                StatusCode::REQUEST_TIMEOUT,
                "The render was canceled".to_string(),
                None,
            ),
            AppError::Internal(_) => {
                // Don't leak internal error detail to client
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
            feature,
        });

        (status, body).into_response()
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::ProfileNotFound => AppError::NotFound("profile not found".to_string()),
            GenerationError::UnknownVoice(voice) => {
                AppError::BadRequest(format!("unknown voice: {voice}"))
            }
            GenerationError::Credential(message) => AppError::Credential(message),
            GenerationError::NothingGenerated(what) => AppError::NothingGenerated(what),
            GenerationError::Upstream { message, .. } => AppError::Upstream(message),
            GenerationError::Transport => AppError::Transport,
            GenerationError::DeadlineExceeded => AppError::Timeout,
            GenerationError::Canceled => AppError::Canceled,
            GenerationError::Internal(err) => AppError::Internal(err),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidEmail => AppError::BadRequest(err.to_string()),
            SessionError::ProfileNotFound => AppError::NotFound(err.to_string()),
            SessionError::Internal(inner) => AppError::Internal(inner),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::ProfileNotFound => AppError::NotFound(err.to_string()),
            PaymentError::MissingReference | PaymentError::UnsupportedFeature => {
                AppError::BadRequest(err.to_string())
            }
            PaymentError::Internal(inner) => AppError::Internal(inner),
        }
    }
}

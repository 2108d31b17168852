use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use trackbox_core::core::album_service::AlbumError;

use crate::envelope::{ErrorsEnvelope, ServerErrorEnvelope};
use crate::validation::ValidationErrors;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const PAYLOAD_TOO_LARGE: &str = "request body is larger than the upload size limit";

#[derive(Debug)]
pub enum HttpError {
    Validation(ValidationErrors),
    /// Body exceeded the configured upload size limit
    PayloadTooLarge,
    Album(AlbumError),
    Internal(eyre::Error),
}

fn client_error(status: StatusCode, messages: Vec<String>) -> Response {
    (status, Json(ErrorsEnvelope::new(messages))).into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ServerErrorEnvelope {
            error: INTERNAL_SERVER_ERROR.to_owned(),
        }),
    )
        .into_response()
}

// Tell axum how to convert `HttpError` into a response.
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::Validation(errors) => {
                warn!("invalid request: {}", errors);
                client_error(StatusCode::BAD_REQUEST, errors.messages())
            }
            HttpError::PayloadTooLarge => {
                warn!("request rejected: {}", PAYLOAD_TOO_LARGE);
                client_error(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    vec![PAYLOAD_TOO_LARGE.to_owned()],
                )
            }
            HttpError::Album(err @ (AlbumError::NotFound(_) | AlbumError::BadRequest(_))) => {
                warn!("request rejected: {}", err);
                client_error(StatusCode::BAD_REQUEST, err.client_messages())
            }
            HttpError::Album(err @ AlbumError::Conflict(_)) => {
                warn!("request rejected: {}", err);
                client_error(StatusCode::CONFLICT, err.client_messages())
            }
            HttpError::Album(err) => {
                error!("error handling request: {:?}", eyre::Report::new(err));
                server_error()
            }
            HttpError::Internal(err) => {
                error!("error handling request: {:?}", err);
                server_error()
            }
        }
    }
}

macro_rules! impl_from {
    ($from:ty) => {
        impl From<$from> for HttpError {
            fn from(err: $from) -> Self {
                Self::Internal(err.into())
            }
        }
    };
}

impl_from!(std::io::Error);
impl_from!(color_eyre::Report);

impl From<AlbumError> for HttpError {
    fn from(err: AlbumError) -> Self {
        Self::Album(err)
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type ApiResult<T> = Result<T, HttpError>;

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Validation(errors) => write!(f, "{}", errors),
            HttpError::PayloadTooLarge => write!(f, "{}", PAYLOAD_TOO_LARGE),
            HttpError::Album(err) => write!(f, "{}", err),
            HttpError::Internal(err) => write!(f, "{}", err),
        }
    }
}

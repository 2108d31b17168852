use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Wrapper around every successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    pub message: &'static str,
}

pub type Enveloped<T> = Json<Envelope<T>>;

impl<T> Envelope<T> {
    pub fn new(data: T, message: &'static str) -> Enveloped<T> {
        Json(Envelope {
            success: true,
            data,
            message,
        })
    }
}

/// Body of 4xx responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorsEnvelope {
    pub success: bool,
    pub errors: Vec<String>,
}

impl ErrorsEnvelope {
    pub fn new(errors: Vec<String>) -> ErrorsEnvelope {
        ErrorsEnvelope {
            success: false,
            errors,
        }
    }
}

/// Body of 5xx responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServerErrorEnvelope {
    pub error: String,
}

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Reasons an input is rejected before anything is stored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationKind {
    #[error("signature name must not be empty")]
    MissingName,

    #[error("signature image is empty")]
    EmptyImage,

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("file is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("unknown font family: {0}")]
    UnknownFont(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid font size: {0}")]
    InvalidSize(f32),

    #[error("invalid preview scale: {0}")]
    InvalidScale(f32),

    #[error("stored image cannot be decoded: {0}")]
    UndecodableImage(String),

    #[error("text, font, color, size and style only apply to typed signatures")]
    NotTyped,

    #[error("malformed upload: {0}")]
    MalformedUpload(String),
}

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationKind),

    #[error("signature quota exceeded: at most {limit} signatures allowed")]
    QuotaExceeded { limit: usize },

    #[error("signature not found: {0}")]
    NotFound(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl SignatureError {
    pub fn kind(&self) -> &'static str {
        match self {
            SignatureError::Validation(_) => "validation",
            SignatureError::QuotaExceeded { .. } => "quota_exceeded",
            SignatureError::NotFound(_) => "not_found",
            SignatureError::Persistence(_) => "persistence",
        }
    }
}

impl From<rusqlite::Error> for SignatureError {
    fn from(e: rusqlite::Error) -> Self {
        SignatureError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for SignatureError {
    fn from(e: serde_json::Error) -> Self {
        SignatureError::Persistence(e.to_string())
    }
}

impl From<tokio::task::JoinError> for SignatureError {
    fn from(e: tokio::task::JoinError) -> Self {
        SignatureError::Persistence(format!("background task failed: {}", e))
    }
}

impl From<actix_web::error::BlockingError> for SignatureError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        SignatureError::Persistence(format!("render worker unavailable: {}", e))
    }
}

impl From<actix_multipart::MultipartError> for SignatureError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        SignatureError::Validation(ValidationKind::MalformedUpload(e.to_string()))
    }
}

impl From<png::EncodingError> for SignatureError {
    fn from(e: png::EncodingError) -> Self {
        SignatureError::Validation(ValidationKind::UndecodableImage(e.to_string()))
    }
}

impl From<image::ImageError> for SignatureError {
    fn from(e: image::ImageError) -> Self {
        SignatureError::Validation(ValidationKind::UndecodableImage(e.to_string()))
    }
}

/// JSON body of every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ResponseError for SignatureError {
    fn status_code(&self) -> StatusCode {
        match self {
            SignatureError::Validation(_) => StatusCode::BAD_REQUEST,
            SignatureError::QuotaExceeded { .. } => StatusCode::CONFLICT,
            SignatureError::NotFound(_) => StatusCode::NOT_FOUND,
            SignatureError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, SignatureError>;

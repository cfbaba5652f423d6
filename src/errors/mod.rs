use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Request-fatal errors. Anything a handler propagates with `?` ends up here
/// and is rendered as a JSON error response by the `ResponseError` impl.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error")]
    Database(#[from] mongodb::error::Error),

    #[error("Password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Invalid or expired token")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Malformed document")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound(message.to_string())
    }

    pub fn unauthorized(message: &str) -> Self {
        ApiError::Unauthorized(message.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::Token(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("request failed: {:?}", self);
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::not_found("No document found with that ID");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "No document found with that ID");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let err = ApiError::unauthorized("Authentication required");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}

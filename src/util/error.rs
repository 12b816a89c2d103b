use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub enum HandlerErrorKind {
    NotFound,
    Validation,
    Internal,
    Unauthorized,
    Forbidden,
    Conflict,
    BadRequest,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::NotFound => "NotFound",
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::Internal => "Internal",
            HandlerErrorKind::Unauthorized => "Unauthorized",
            HandlerErrorKind::Forbidden => "Forbidden",
            HandlerErrorKind::Conflict => "Conflict",
            HandlerErrorKind::BadRequest => "BadRequest",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize)]
pub struct HandlerError {
    pub error: HandlerErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl HandlerError {
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HandlerError {
            error: HandlerErrorKind::BadRequest,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation<T: Into<String>>(message: T) -> Self {
        HandlerError {
            error: HandlerErrorKind::Validation,
            message: message.into(),
            details: None,
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self.error {
            HandlerErrorKind::NotFound => StatusCode::NOT_FOUND,
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerErrorKind::Forbidden => StatusCode::FORBIDDEN,
            HandlerErrorKind::Conflict => StatusCode::CONFLICT,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

#[derive(Debug, Clone)]
pub enum ServiceError {
    NotFound(String),
    InvalidInput(String),
    InternalError(String),
    /// Already converted, already exists, or a disallowed lifecycle
    /// transition. All surface as HTTP 409.
    Conflict(String),
    Forbidden(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ServiceError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ServiceError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<crate::repository::repository_error::RepositoryError> for ServiceError {
    fn from(err: crate::repository::repository_error::RepositoryError) -> Self {
        use crate::repository::repository_error::RepositoryError;
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::ValidationError(msg) => ServiceError::InvalidInput(msg),
            RepositoryError::AlreadyExists(msg) => ServiceError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => ServiceError::InternalError(msg),
            RepositoryError::ConnectionError(msg) => ServiceError::InternalError(msg),
            RepositoryError::SerializationError(msg) => ServiceError::InternalError(msg),
            RepositoryError::Generic(err) => ServiceError::InternalError(err.to_string()),
        }
    }
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        let (kind, message) = match err {
            ServiceError::NotFound(msg) => (HandlerErrorKind::NotFound, msg),
            ServiceError::InvalidInput(msg) => (HandlerErrorKind::Validation, msg),
            ServiceError::Conflict(msg) => (HandlerErrorKind::Conflict, msg),
            ServiceError::Forbidden(msg) => (HandlerErrorKind::Forbidden, msg),
            ServiceError::InternalError(msg) => (HandlerErrorKind::Internal, msg),
        };
        HandlerError {
            error: kind,
            message,
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::repository_error::RepositoryError;

    #[test]
    fn test_repository_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(RepositoryError::not_found("missing")),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::already_exists("dup")),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::generic(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk on fire"
            ))),
            ServiceError::InternalError(_)
        ));
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use daycare_core::errors::{AuthError, Error as CoreError, StoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Duplicate(_) | CoreError::ConstraintViolation(_) => StatusCode::CONFLICT,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::NoSession => StatusCode::UNAUTHORIZED,
        CoreError::Auth(AuthError::InvalidCredentials(_) | AuthError::SessionExpired) => {
            StatusCode::UNAUTHORIZED
        }
        CoreError::Auth(_) => StatusCode::BAD_REQUEST,
        CoreError::BackendDisabled(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Store(StoreError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
        CoreError::Store(StoreError::UniqueViolation(_)) => StatusCode::CONFLICT,
        CoreError::Store(_) | CoreError::Upload(_) => StatusCode::BAD_GATEWAY,
        CoreError::Export(_) | CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.user_message()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use daycare_core::errors::ValidationError;

    #[test]
    fn maps_core_errors_to_statuses() {
        let missing = CoreError::from(ValidationError::MissingField("Name".to_string()));
        assert_eq!(core_status(&missing), StatusCode::BAD_REQUEST);
        assert_eq!(
            core_status(&CoreError::BackendDisabled("no url".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(core_status(&CoreError::NoSession), StatusCode::UNAUTHORIZED);
        assert_eq!(
            core_status(&CoreError::NotFound("Invoice not found.".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn body_carries_user_message() {
        let response =
            ApiError::from(CoreError::NotFound("Invoice not found.".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Central API error type.
//!
//! Every repository and domain error converges on `ApiError` so handlers
//! can use `?` and denials stay ordinary JSON outcomes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use muhasib_core::access::AccessError;
use muhasib_core::invoice::InvoiceError as CalcError;
use muhasib_core::storage::StorageError;
use muhasib_core::tax::TaxError;
use muhasib_db::repositories::{
    ClientError, CompanyError, FilingError, InvoiceError, TaskError, UserError,
};
use muhasib_shared::AppError;

/// Wrapper over the shared error type implementing `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = json!({
            "error": self.0.error_code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        Self(AppError::Forbidden(err.to_string()))
    }
}

impl From<TaxError> for ApiError {
    fn from(err: TaxError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let app = match &err {
            StorageError::ExtensionNotAllowed { .. }
            | StorageError::MissingExtension
            | StorageError::FileTooLarge { .. } => AppError::Validation(err.to_string()),
            StorageError::Configuration(_) | StorageError::Backend(_) => {
                AppError::Storage(err.to_string())
            }
        };
        Self(app)
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let app = match &err {
            UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UserError::DuplicateUsername | UserError::DuplicateEmail => {
                AppError::Conflict(err.to_string())
            }
            UserError::Database(_) => AppError::Database(err.to_string()),
        };
        Self(app)
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let app = match &err {
            ClientError::NotFound(_) | ClientError::DocumentNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ClientError::Database(_) => AppError::Database(err.to_string()),
        };
        Self(app)
    }
}

impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        let app = match &err {
            InvoiceError::NotFound(_)
            | InvoiceError::ItemNotFound(_)
            | InvoiceError::AttachmentNotFound(_) => AppError::NotFound(err.to_string()),
            InvoiceError::DuplicateNumber(_) => AppError::Conflict(err.to_string()),
            InvoiceError::Calculation(_) => AppError::Validation(err.to_string()),
            InvoiceError::Database(_) => AppError::Database(err.to_string()),
        };
        Self(app)
    }
}

impl From<FilingError> for ApiError {
    fn from(err: FilingError) -> Self {
        let app = match &err {
            FilingError::NotFound(_) => AppError::NotFound(err.to_string()),
            FilingError::Transition(_) => AppError::Conflict(err.to_string()),
            FilingError::Calculation(_) => AppError::Validation(err.to_string()),
            FilingError::Database(_) => AppError::Database(err.to_string()),
        };
        Self(app)
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        let app = match &err {
            TaskError::NotFound(_) => AppError::NotFound(err.to_string()),
            TaskError::Forbidden => AppError::Forbidden(err.to_string()),
            TaskError::Database(_) => AppError::Database(err.to_string()),
        };
        Self(app)
    }
}

impl From<CompanyError> for ApiError {
    fn from(err: CompanyError) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Shorthand for a 403 with a fixed message.
#[must_use]
pub fn forbidden(message: &str) -> ApiError {
    ApiError(AppError::Forbidden(message.to_string()))
}

/// Shorthand for a 400 with a fixed message.
#[must_use]
pub fn validation(message: &str) -> ApiError {
    ApiError(AppError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_409() {
        let err = ApiError::from(InvoiceError::DuplicateNumber("INV-000001".to_string()));
        assert_eq!(err.0.status_code(), 409);
    }

    #[test]
    fn test_task_forbidden_maps_to_403() {
        let err = ApiError::from(TaskError::Forbidden);
        assert_eq!(err.0.status_code(), 403);
        assert_eq!(err.0.error_code(), "FORBIDDEN");
    }

    #[test]
    fn test_oversize_upload_maps_to_validation() {
        let err = ApiError::from(StorageError::FileTooLarge {
            size: 20_000_000,
            max: 16_777_216,
        });
        assert_eq!(err.0.status_code(), 400);
    }

    #[test]
    fn test_submit_twice_maps_to_conflict() {
        let err = ApiError::from(FilingError::Transition(
            muhasib_core::tax::FilingError::InvalidTransition {
                from: "submitted",
                to: "submitted",
            },
        ));
        assert_eq!(err.0.status_code(), 409);
    }
}

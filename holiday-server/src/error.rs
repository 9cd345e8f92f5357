//! Boundary error translator: every `HolidayError` becomes one status code and
//! a uniform `{message, errors}` body, logged once here.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use holiday_core::{status_code, HolidayError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub errors: BTreeMap<String, Vec<String>>,
}

#[derive(Debug)]
pub struct AppError(pub HolidayError);

impl From<HolidayError> for AppError {
    fn from(err: HolidayError) -> Self {
        Self(err)
    }
}

/// Unparseable path segments (e.g. a non-numeric year) get the same body as
/// every other failure.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self(HolidayError::InvalidInput(rejection.body_text()))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(status_code(self.0.kind()))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn body(&self) -> ErrorBody {
        let kind = self.0.kind();
        let mut errors = BTreeMap::new();
        errors.insert(String::new(), vec![self.0.detail()]);
        ErrorBody {
            message: kind.public_message().to_string(),
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self.0 {
            HolidayError::Internal(inner) => {
                tracing::error!(error = ?inner, "unhandled error");
            }
            err => {
                tracing::error!(kind = ?err.kind(), "{err}");
            }
        }
        (self.status(), Json(self.body())).into_response()
    }
}

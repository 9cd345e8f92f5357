use strum::EnumIter;
use thiserror::Error;

use crate::messages;

pub type Result<T> = std::result::Result<T, HolidayError>;

#[derive(Debug, Error)]
pub enum HolidayError {
    /// The upstream holiday source answered with a failure, or could not be
    /// reached at all (`upstream_status == None`).
    #[error("external service error: {message}")]
    ExternalService {
        upstream_status: Option<u16>,
        message: String,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Failure category, one per boundary status class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum ErrorKind {
    ExternalService,
    ExternalUnavailable,
    Storage,
    MalformedData,
    InvalidInput,
    InvalidState,
    Internal,
}

/// HTTP status for a failure category.
pub fn status_code(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::ExternalService => 502,
        ErrorKind::ExternalUnavailable => 503,
        ErrorKind::Storage => 500,
        ErrorKind::MalformedData => 400,
        ErrorKind::InvalidInput => 400,
        ErrorKind::InvalidState => 409,
        ErrorKind::Internal => 500,
    }
}

impl ErrorKind {
    /// Caller-facing summary. Never carries internal detail.
    pub fn public_message(self) -> &'static str {
        match self {
            Self::ExternalService => messages::EXTERNAL_SERVICE_ERROR,
            Self::ExternalUnavailable => messages::EXTERNAL_SERVICE_UNAVAILABLE,
            Self::Storage => messages::DATABASE_OPERATION_FAILED,
            Self::MalformedData => messages::INVALID_DATA,
            Self::InvalidInput => messages::INVALID_INPUT,
            Self::InvalidState => messages::INVALID_OPERATION,
            Self::Internal => messages::UNKNOWN_ERROR,
        }
    }
}

impl HolidayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExternalService {
                upstream_status: Some(_),
                ..
            } => ErrorKind::ExternalService,
            Self::ExternalService {
                upstream_status: None,
                ..
            } => ErrorKind::ExternalUnavailable,
            Self::Storage(_) => ErrorKind::Storage,
            Self::MalformedData(_) => ErrorKind::MalformedData,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn http_status(&self) -> u16 {
        status_code(self.kind())
    }

    /// Detail text for the error body. Internal errors are reduced to a
    /// generic line; their chain belongs in the server log only.
    pub fn detail(&self) -> String {
        match self {
            Self::ExternalService { message, .. } => message.clone(),
            Self::Storage(m)
            | Self::MalformedData(m)
            | Self::InvalidInput(m)
            | Self::InvalidState(m) => m.clone(),
            Self::Internal(_) => messages::UNHANDLED_ERROR.to_string(),
        }
    }
}

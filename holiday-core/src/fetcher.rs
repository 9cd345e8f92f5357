//! Port for the upstream holiday source.
//!
//! An implementation performs one lookup per `(year, country_code)` and
//! reports either the delivered holidays, an application-level rejection
//! (non-success status, optionally with a structured error body), or a
//! transport/decoding failure.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::messages;
use crate::types::HolidayPayload;

/// Structured error body returned by the upstream on rejection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Success; may be empty.
    Holidays(Vec<HolidayPayload>),
    Rejected {
        status: u16,
        body: Option<ApiErrorBody>,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// No usable response (connect/timeout/body read).
    #[error("transport failure: {0}")]
    Transport(String),

    /// A success response whose body is not a holiday list.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait HolidayFetcher: Send + Sync {
    async fn fetch(
        &self,
        year: i32,
        country_code: &str,
    ) -> std::result::Result<FetchOutcome, FetchError>;
}

/// Message for a rejected fetch.
///
/// With a body: `"API returned error. <status>: <title>. <msg>; <msg>"`.
/// Without: `"API returned status code <code>."`.
pub fn rejection_message(status: u16, body: Option<&ApiErrorBody>) -> String {
    match body {
        Some(body) => {
            let reported = if body.status != 0 { body.status } else { status };
            let details = body
                .errors
                .values()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            format!(
                "{} {}: {}. {}",
                messages::API_ERROR,
                reported,
                body.title,
                details
            )
        }
        None => format!("{} {}.", messages::API_STATUS_CODE, status),
    }
}

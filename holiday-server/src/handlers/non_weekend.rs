//! GET /api/Holidays/NonWeekendCount/:year?countryCodes=AT&countryCodes=CA
//!
//! The only endpoint that validates its input before calling the service.
//! Failures answer 400 with the regular envelope and an empty result.

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, RawQuery},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use holiday_core::{messages, validate, HolidayService, NonWeekendHolidayCount};

use crate::envelope::ApiEnvelope;
use crate::error::AppError;

pub const COUNTRY_CODES_PARAM: &str = "countryCodes";

/// Every `countryCodes` value in the query string. The key matches without
/// regard to case. `None` when the parameter is absent altogether.
pub fn country_codes_from_query(query: Option<&str>) -> Option<Vec<String>> {
    let codes: Vec<String> = url::form_urlencoded::parse(query?.as_bytes())
        .filter(|(key, _)| key.eq_ignore_ascii_case(COUNTRY_CODES_PARAM))
        .map(|(_, value)| value.into_owned())
        .collect();
    if codes.is_empty() {
        None
    } else {
        Some(codes)
    }
}

fn reject(message: &'static str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiEnvelope::<NonWeekendHolidayCount>::rejected(message)),
    )
        .into_response()
}

pub async fn non_weekend_count(
    Extension(service): Extension<Arc<dyn HolidayService>>,
    path: Result<Path<i32>, PathRejection>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let Path(year) = path?;
    if !validate::is_valid_year(Some(year)) {
        return Ok(reject(messages::INVALID_YEAR));
    }

    let codes = country_codes_from_query(query.as_deref());
    if !validate::are_valid_country_codes(codes.as_deref()) {
        return Ok(reject(messages::INVALID_COUNTRY_CODE));
    }
    let codes = codes.unwrap_or_default();

    let counts = service.non_weekend_counts(year, &codes).await?;
    Ok(Json(ApiEnvelope::new(
        counts,
        messages::RECORDS_FOUND,
        messages::NO_RECORDS_FOUND,
    ))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_parameter_is_collected() {
        let codes = country_codes_from_query(Some("countryCodes=AT&countryCodes=CA"));
        assert_eq!(codes, Some(vec!["AT".to_string(), "CA".to_string()]));
    }

    #[test]
    fn parameter_name_ignores_case() {
        let codes = country_codes_from_query(Some("countrycodes=AT&COUNTRYCODES=CA"));
        assert_eq!(codes, Some(vec!["AT".to_string(), "CA".to_string()]));
    }

    #[test]
    fn absent_parameter_is_none() {
        assert_eq!(country_codes_from_query(None), None);
        assert_eq!(country_codes_from_query(Some("other=1")), None);
    }

    #[test]
    fn values_are_percent_decoded() {
        let codes = country_codes_from_query(Some("countryCodes=%20US"));
        assert_eq!(codes, Some(vec![" US".to_string()]));
    }
}

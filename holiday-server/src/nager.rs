//! Nager.Date API client
//!
//! `GET <base>/<year>/<countryCode>` returning a JSON array of holidays, or a
//! problem-details object `{title, status, errors}` on rejection.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use holiday_core::{ApiErrorBody, FetchError, FetchOutcome, HolidayFetcher, HolidayPayload};
use reqwest::Client;

pub struct NagerClient {
    client: Client,
    base_url: String,
}

impl NagerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn holidays_url(&self, year: i32, country_code: &str) -> String {
        format!("{}/{}/{}", self.base_url, year, country_code)
    }
}

#[async_trait]
impl HolidayFetcher for NagerClient {
    async fn fetch(
        &self,
        year: i32,
        country_code: &str,
    ) -> std::result::Result<FetchOutcome, FetchError> {
        let url = self.holidays_url(year, country_code);
        tracing::debug!(%url, "fetching public holidays");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let outcome = interpret_response(status, &body)?;
        if let FetchOutcome::Rejected { status, .. } = &outcome {
            tracing::warn!(%url, status, "holiday source rejected request");
        }
        Ok(outcome)
    }
}

/// Classify an upstream response by status and raw body.
pub fn interpret_response(
    status: u16,
    body: &[u8],
) -> std::result::Result<FetchOutcome, FetchError> {
    if !(200..300).contains(&status) {
        let error_body = serde_json::from_slice::<ApiErrorBody>(body).ok();
        return Ok(FetchOutcome::Rejected {
            status,
            body: error_body,
        });
    }

    if status == 204 || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FetchOutcome::Holidays(Vec::new()));
    }

    serde_json::from_slice::<Vec<HolidayPayload>>(body)
        .map(FetchOutcome::Holidays)
        .map_err(|e| FetchError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_array_is_parsed() {
        let body = br#"[
            {"date":"2025-01-01","localName":"Nieuwjaarsdag","name":"New Year's Day","countryCode":"NL","fixed":true,"global":true,"counties":null,"launchYear":null,"types":["Public"]},
            {"date":"2025-04-27","localName":"Koningsdag","name":"King's Day","countryCode":"NL","fixed":false,"global":true,"counties":null,"launchYear":null,"types":["Public"]}
        ]"#;
        match interpret_response(200, body).unwrap() {
            FetchOutcome::Holidays(holidays) => {
                assert_eq!(holidays.len(), 2);
                assert_eq!(holidays[1].local_name, "Koningsdag");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn no_content_is_empty_success() {
        assert_eq!(
            interpret_response(204, b"").unwrap(),
            FetchOutcome::Holidays(vec![])
        );
        assert_eq!(
            interpret_response(200, b"  ").unwrap(),
            FetchOutcome::Holidays(vec![])
        );
    }

    #[test]
    fn success_with_wrong_shape_is_malformed() {
        let err = interpret_response(200, br#"{"unexpected":true}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn rejection_keeps_problem_details() {
        let body = br#"{"type":"https://tools.ietf.org/html/rfc7231#section-6.5.1","title":"Bad country code","status":400,"errors":{"countryCode":["invalid"]}}"#;
        match interpret_response(400, body).unwrap() {
            FetchOutcome::Rejected { status, body } => {
                assert_eq!(status, 400);
                let body = body.unwrap();
                assert_eq!(body.title, "Bad country code");
                assert_eq!(body.errors["countryCode"], vec!["invalid".to_string()]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn rejection_without_json_body() {
        assert_eq!(
            interpret_response(404, b"").unwrap(),
            FetchOutcome::Rejected {
                status: 404,
                body: None
            }
        );
    }

    #[test]
    fn url_layout() {
        let client = NagerClient::new(
            "https://date.nager.at/api/v3/PublicHolidays",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.holidays_url(2025, "NL"),
            "https://date.nager.at/api/v3/PublicHolidays/2025/NL"
        );
    }
}

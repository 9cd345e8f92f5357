//! HolidayService: fetch/dedupe/insert synchronization plus the three read
//! aggregates.
//!
//! Takes its store and fetcher as `Arc<dyn PortTrait>` so that the same logic
//! runs against Postgres and the Nager.Date client in production, or against
//! `MemoryHolidayStore` and a stub fetcher in tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::{HolidayError, Result};
use crate::fetcher::{rejection_message, FetchError, FetchOutcome, HolidayFetcher};
use crate::messages;
use crate::store::HolidayStore;
use crate::types::*;

/// Number of records returned by `previous_three`.
pub const PREVIOUS_HOLIDAY_LIMIT: usize = 3;

/// Source of "today" (UTC, date only).
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

// ── HolidayService trait ──────────────────────────────────────

#[async_trait]
pub trait HolidayService: Send + Sync {
    /// Fetch `(year, country_code)` from the upstream source and store every
    /// holiday whose date is not yet stored for that country. Returns exactly
    /// the inserted records.
    async fn sync_holidays(&self, year: i32, country_code: &str) -> Result<Vec<HolidayRecord>>;

    /// Up to three most recent holidays on or before today, newest first.
    async fn previous_three(&self, country_code: &str) -> Result<Vec<PreviousHoliday>>;

    /// Weekday-only holiday count per requested country in `year`, highest
    /// count first. Every requested code appears exactly once.
    async fn non_weekend_counts(
        &self,
        year: i32,
        country_codes: &[String],
    ) -> Result<Vec<NonWeekendHolidayCount>>;

    /// Dates in `year` on which both countries have a stored holiday.
    async fn shared_celebration_dates(
        &self,
        year: i32,
        first_country: &str,
        second_country: &str,
    ) -> Result<Vec<SharedHoliday>>;
}

// ── HolidayServiceImpl ────────────────────────────────────────

pub struct HolidayServiceImpl {
    store: Arc<dyn HolidayStore>,
    fetcher: Arc<dyn HolidayFetcher>,
    clock: Clock,
}

impl HolidayServiceImpl {
    pub fn new(store: Arc<dyn HolidayStore>, fetcher: Arc<dyn HolidayFetcher>) -> Self {
        Self {
            store,
            fetcher,
            clock: Arc::new(|| Utc::now().date_naive()),
        }
    }

    /// Replace the clock (builder pattern).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    async fn fetch(&self, year: i32, country_code: &str) -> Result<Vec<HolidayPayload>> {
        let outcome = self
            .fetcher
            .fetch(year, country_code)
            .await
            .map_err(|e| match e {
                FetchError::Transport(detail) => HolidayError::ExternalService {
                    upstream_status: None,
                    message: format!("{} {}", messages::API_UNREACHABLE, detail),
                },
                FetchError::Malformed(detail) => HolidayError::MalformedData(detail),
            })?;

        match outcome {
            FetchOutcome::Holidays(holidays) => Ok(holidays),
            FetchOutcome::Rejected { status, body } => Err(HolidayError::ExternalService {
                upstream_status: Some(status),
                message: rejection_message(status, body.as_ref()),
            }),
        }
    }
}

/// Canonical form of a country code: trimmed, ASCII uppercase. Every
/// service entry point applies it, so stored rows and lookups agree.
pub fn normalize_country_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn year_span(year: i32) -> Result<DateSpan> {
    DateSpan::year(year)
        .ok_or_else(|| HolidayError::InvalidInput(format!("year {year} is out of range")))
}

/// Holidays from `fetched` whose date is neither in `existing` nor repeated
/// earlier in `fetched`. Incoming duplicates are dropped, never merged.
pub fn select_new_holidays(
    fetched: Vec<HolidayPayload>,
    existing: &HashSet<NaiveDate>,
) -> Vec<HolidayPayload> {
    let mut seen = existing.clone();
    fetched
        .into_iter()
        .filter(|h| seen.insert(h.date))
        .collect()
}

/// One count per requested code (zero when absent), highest first. The sort
/// is stable, so equal counts keep request order.
pub fn count_non_weekend(
    records: &[HolidayRecord],
    country_codes: &[String],
) -> Vec<NonWeekendHolidayCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for record in records.iter().filter(|r| !is_weekend(r.date)) {
        *counts.entry(record.country_code.as_str()).or_default() += 1;
    }

    let mut result: Vec<NonWeekendHolidayCount> = country_codes
        .iter()
        .map(|code| NonWeekendHolidayCount {
            country_code: code.clone(),
            count: counts.get(code.as_str()).copied().unwrap_or(0),
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Normalized codes, each listed once in first-seen order.
fn dedupe_codes(country_codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    country_codes
        .iter()
        .map(|c| normalize_country_code(c))
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

#[async_trait]
impl HolidayService for HolidayServiceImpl {
    async fn sync_holidays(&self, year: i32, country_code: &str) -> Result<Vec<HolidayRecord>> {
        let country_code = normalize_country_code(country_code);
        let country_code = country_code.as_str();
        let fetched: Vec<HolidayPayload> = self
            .fetch(year, country_code)
            .await?
            .into_iter()
            .map(|mut h| {
                h.country_code = normalize_country_code(&h.country_code);
                h
            })
            .collect();
        if fetched.is_empty() {
            tracing::info!(year, country_code, "upstream returned no holidays");
            return Ok(Vec::new());
        }

        let existing = self
            .store
            .stored_dates(country_code, year_span(year)?)
            .await?;
        let fetched_count = fetched.len();
        let pending = select_new_holidays(fetched, &existing);
        if pending.is_empty() {
            tracing::info!(year, country_code, fetched_count, "holidays already up to date");
            return Ok(Vec::new());
        }

        let inserted = self.store.insert_batch(&pending).await?;
        tracing::info!(
            year,
            country_code,
            fetched_count,
            inserted = inserted.len(),
            "holidays synchronized"
        );
        Ok(inserted)
    }

    async fn previous_three(&self, country_code: &str) -> Result<Vec<PreviousHoliday>> {
        let country_code = normalize_country_code(country_code);
        let country_code = country_code.as_str();
        let today = (self.clock)();
        tracing::debug!(country_code, %today, "previous holidays");
        let records = self
            .store
            .recent_on_or_before(country_code, today, PREVIOUS_HOLIDAY_LIMIT)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| PreviousHoliday {
                date: r.date,
                name: r.name,
            })
            .collect())
    }

    async fn non_weekend_counts(
        &self,
        year: i32,
        country_codes: &[String],
    ) -> Result<Vec<NonWeekendHolidayCount>> {
        let span = year_span(year)?;
        let requested = dedupe_codes(country_codes);
        if requested.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(year, countries = ?requested, "non-weekend counts");
        let records = self.store.in_span(&requested, span).await?;
        Ok(count_non_weekend(&records, &requested))
    }

    async fn shared_celebration_dates(
        &self,
        year: i32,
        first_country: &str,
        second_country: &str,
    ) -> Result<Vec<SharedHoliday>> {
        let span = year_span(year)?;
        let first_country = normalize_country_code(first_country);
        let second_country = normalize_country_code(second_country);
        tracing::debug!(year, %first_country, %second_country, "shared dates");
        self.store
            .shared_dates(&first_country, &second_country, span)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::ApiErrorBody;
    use crate::store_memory::MemoryHolidayStore;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday(country: &str, date: NaiveDate, name: &str, local: &str) -> HolidayPayload {
        HolidayPayload {
            date,
            local_name: local.into(),
            name: name.into(),
            country_code: country.into(),
            is_fixed: false,
            is_global: true,
            counties: None,
            launch_year: None,
            types: vec!["Public".into()],
        }
    }

    type Outcome = std::result::Result<FetchOutcome, FetchError>;

    /// Answers every fetch from a closure.
    struct StubFetcher {
        outcome: Mutex<Box<dyn FnMut() -> Outcome + Send>>,
    }

    impl StubFetcher {
        fn holidays(holidays: Vec<HolidayPayload>) -> Self {
            Self::with(move || Ok(FetchOutcome::Holidays(holidays.clone())))
        }

        fn with(f: impl FnMut() -> Outcome + Send + 'static) -> Self {
            Self {
                outcome: Mutex::new(Box::new(f)),
            }
        }
    }

    #[async_trait]
    impl HolidayFetcher for StubFetcher {
        async fn fetch(&self, _year: i32, _country_code: &str) -> Outcome {
            let mut next = self.outcome.lock().unwrap();
            (*next)()
        }
    }

    fn service_with(
        store: Arc<MemoryHolidayStore>,
        fetcher: StubFetcher,
        today: NaiveDate,
    ) -> HolidayServiceImpl {
        HolidayServiceImpl::new(store, Arc::new(fetcher)).with_clock(Arc::new(move || today))
    }

    fn us_2025() -> Vec<HolidayPayload> {
        vec![
            holiday("US", day(2025, 1, 1), "New Year's Day", "New Year's Day"),
            holiday("US", day(2025, 7, 4), "Independence Day", "Independence Day"),
            holiday("US", day(2025, 12, 25), "Christmas Day", "Christmas Day"),
        ]
    }

    // ── sync ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn sync_inserts_then_is_idempotent() {
        let store = Arc::new(MemoryHolidayStore::new());
        let service = service_with(store.clone(), StubFetcher::holidays(us_2025()), day(2025, 9, 1));

        let first = service.sync_holidays(2025, "US").await.unwrap();
        assert_eq!(first.len(), 3);

        let second = service.sync_holidays(2025, "US").await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.all().await.len(), 3);
    }

    #[tokio::test]
    async fn sync_does_not_update_existing_date() {
        let store = Arc::new(MemoryHolidayStore::new());
        store
            .insert_batch(&[holiday("DE", day(2025, 12, 25), "Christmas Day", "Erster Weihnachtstag")])
            .await
            .unwrap();
        let fetcher = StubFetcher::holidays(vec![
            holiday("DE", day(2025, 12, 25), "Xmas", "Weihnachten"),
            holiday("DE", day(2025, 1, 1), "New Year's Day", "Neujahr"),
        ]);
        let service = service_with(store.clone(), fetcher, day(2025, 9, 1));

        let inserted = service.sync_holidays(2025, "DE").await.unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].date, day(2025, 1, 1));

        let all = store.all().await;
        let christmas = all.iter().find(|r| r.date == day(2025, 12, 25)).unwrap();
        assert_eq!(christmas.local_name, "Erster Weihnachtstag");
        assert_eq!(christmas.name, "Christmas Day");
    }

    #[tokio::test]
    async fn sync_skips_repeated_date_within_one_fetch() {
        let store = Arc::new(MemoryHolidayStore::new());
        let mut regional = holiday("DE", day(2025, 1, 6), "Epiphany", "Heilige Drei Könige");
        regional.counties = Some(vec!["DE-BW".into()]);
        let mut regional_again = regional.clone();
        regional_again.counties = Some(vec!["DE-BY".into()]);
        let service = service_with(
            store.clone(),
            StubFetcher::holidays(vec![regional, regional_again]),
            day(2025, 9, 1),
        );

        let inserted = service.sync_holidays(2025, "DE").await.unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].counties, Some(vec!["DE-BW".to_string()]));
    }

    #[tokio::test]
    async fn sync_with_empty_upstream_returns_empty() {
        let store = Arc::new(MemoryHolidayStore::new());
        let service = service_with(store.clone(), StubFetcher::holidays(vec![]), day(2025, 9, 1));
        assert!(service.sync_holidays(2025, "US").await.unwrap().is_empty());
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn sync_rejection_with_body_is_external_service_error() {
        let store = Arc::new(MemoryHolidayStore::new());
        let fetcher = StubFetcher::with(|| {
            let mut errors = BTreeMap::new();
            errors.insert("countryCode".to_string(), vec!["invalid".to_string()]);
            Ok(FetchOutcome::Rejected {
                status: 400,
                body: Some(ApiErrorBody {
                    title: "Bad country code".into(),
                    status: 400,
                    errors,
                }),
            })
        });
        let service = service_with(store.clone(), fetcher, day(2025, 9, 1));

        let err = service.sync_holidays(2025, "XX").await.unwrap_err();
        assert_eq!(err.http_status(), 502);
        let detail = err.detail();
        assert!(detail.contains("400"), "{detail}");
        assert!(detail.contains("Bad country code"), "{detail}");
        assert!(detail.contains("invalid"), "{detail}");
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn sync_rejection_without_body_reports_status_code() {
        let store = Arc::new(MemoryHolidayStore::new());
        let fetcher = StubFetcher::with(|| {
            Ok(FetchOutcome::Rejected {
                status: 404,
                body: None,
            })
        });
        let service = service_with(store, fetcher, day(2025, 9, 1));

        let err = service.sync_holidays(2025, "ZZ").await.unwrap_err();
        assert!(matches!(
            err,
            HolidayError::ExternalService {
                upstream_status: Some(404),
                ..
            }
        ));
        assert!(err.detail().contains("status code 404"));
    }

    #[tokio::test]
    async fn sync_transport_failure_is_unavailable() {
        let store = Arc::new(MemoryHolidayStore::new());
        let fetcher = StubFetcher::with(|| Err(FetchError::Transport("connection refused".into())));
        let service = service_with(store, fetcher, day(2025, 9, 1));

        let err = service.sync_holidays(2025, "US").await.unwrap_err();
        assert_eq!(err.http_status(), 503);
        assert!(err.detail().contains("connection refused"));
    }

    #[tokio::test]
    async fn sync_malformed_payload_is_bad_data() {
        let store = Arc::new(MemoryHolidayStore::new());
        let fetcher = StubFetcher::with(|| Err(FetchError::Malformed("expected array".into())));
        let service = service_with(store, fetcher, day(2025, 9, 1));

        let err = service.sync_holidays(2025, "US").await.unwrap_err();
        assert!(matches!(err, HolidayError::MalformedData(_)));
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn sync_with_lowercase_code_dedupes_against_stored_rows() {
        let store = Arc::new(MemoryHolidayStore::new());
        let mut upstream = us_2025();
        upstream[0].country_code = "us".into();
        let service = service_with(store.clone(), StubFetcher::holidays(upstream), day(2025, 9, 1));

        let first = service.sync_holidays(2025, "us").await.unwrap();
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|r| r.country_code == "US"));

        assert!(service.sync_holidays(2025, " Us ").await.unwrap().is_empty());
        assert_eq!(store.all().await.len(), 3);
    }

    // ── previous three ───────────────────────────────────────────

    async fn seeded_us() -> Arc<MemoryHolidayStore> {
        let store = Arc::new(MemoryHolidayStore::new());
        store
            .insert_batch(&[
                holiday("US", day(2025, 1, 1), "New Year's Day", "New Year's Day"),
                holiday("US", day(2025, 4, 18), "Good Friday", "Good Friday"),
                holiday("US", day(2025, 7, 4), "Independence Day", "Independence Day"),
                holiday("US", day(2025, 9, 1), "Labour Day", "Labor Day"),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn previous_three_returns_most_recent_first() {
        let service = service_with(seeded_us().await, StubFetcher::holidays(vec![]), day(2025, 10, 1));

        let result = service.previous_three("US").await.unwrap();
        let dates: Vec<_> = result.iter().map(|h| h.date).collect();
        assert_eq!(dates, vec![day(2025, 9, 1), day(2025, 7, 4), day(2025, 4, 18)]);
        assert_eq!(result[2].name, "Good Friday");
    }

    #[tokio::test]
    async fn previous_three_includes_today_and_excludes_future() {
        let service = service_with(seeded_us().await, StubFetcher::holidays(vec![]), day(2025, 7, 4));

        let result = service.previous_three("US").await.unwrap();
        let dates: Vec<_> = result.iter().map(|h| h.date).collect();
        assert_eq!(dates, vec![day(2025, 7, 4), day(2025, 4, 18), day(2025, 1, 1)]);
    }

    #[tokio::test]
    async fn queries_match_country_codes_case_insensitively() {
        let store = Arc::new(MemoryHolidayStore::new());
        store
            .insert_batch(&[
                holiday("DE", day(2025, 1, 1), "New Year's Day", "Neujahr"), // Wednesday
                holiday("BE", day(2025, 1, 1), "New Year's Day", "Nieuwjaar"),
            ])
            .await
            .unwrap();
        let service = service_with(store, StubFetcher::holidays(vec![]), day(2025, 9, 1));

        assert_eq!(service.previous_three("de").await.unwrap().len(), 1);

        let codes = vec!["de".to_string(), "DE".to_string()];
        let counts = service.non_weekend_counts(2025, &codes).await.unwrap();
        assert_eq!(
            counts,
            vec![NonWeekendHolidayCount {
                country_code: "DE".into(),
                count: 1
            }]
        );

        let shared = service.shared_celebration_dates(2025, "de", "be").await.unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].local_name_second, "Nieuwjaar");
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_country_code(" nl "), "NL");
        assert_eq!(normalize_country_code("De"), "DE");
    }

    #[tokio::test]
    async fn previous_three_unknown_country_is_empty() {
        let service = service_with(seeded_us().await, StubFetcher::holidays(vec![]), day(2025, 10, 1));
        assert!(service.previous_three("NL").await.unwrap().is_empty());
    }

    // ── non-weekend counts ───────────────────────────────────────

    #[tokio::test]
    async fn non_weekend_counts_exclude_weekends_and_include_zeroes() {
        let store = Arc::new(MemoryHolidayStore::new());
        store
            .insert_batch(&[
                holiday("AT", day(2025, 1, 1), "New Year's Day", "Neujahr"), // Wednesday
                holiday("AT", day(2025, 7, 4), "A", "A"),                    // Friday
                holiday("AT", day(2025, 7, 5), "B", "B"),                    // Saturday
                holiday("CA", day(2025, 12, 25), "Christmas Day", "Noël"),   // Thursday
                holiday("CA", day(2025, 12, 28), "C", "C"),                  // Sunday
                holiday("CA", day(2024, 12, 25), "Christmas Day", "Noël"),   // other year
            ])
            .await
            .unwrap();
        let service = service_with(store, StubFetcher::holidays(vec![]), day(2025, 9, 1));

        let codes = vec!["NL".to_string(), "CA".to_string(), "AT".to_string()];
        let result = service.non_weekend_counts(2025, &codes).await.unwrap();
        assert_eq!(
            result,
            vec![
                NonWeekendHolidayCount {
                    country_code: "AT".into(),
                    count: 2
                },
                NonWeekendHolidayCount {
                    country_code: "CA".into(),
                    count: 1
                },
                NonWeekendHolidayCount {
                    country_code: "NL".into(),
                    count: 0
                },
            ]
        );
    }

    #[tokio::test]
    async fn non_weekend_counts_list_each_code_once() {
        let store = Arc::new(MemoryHolidayStore::new());
        let service = service_with(store, StubFetcher::holidays(vec![]), day(2025, 9, 1));

        let codes = vec!["BE".to_string(), "DE".to_string(), "BE".to_string()];
        let result = service.non_weekend_counts(2025, &codes).await.unwrap();
        let listed: Vec<_> = result.iter().map(|c| c.country_code.as_str()).collect();
        assert_eq!(listed, vec!["BE", "DE"]);
    }

    #[test]
    fn count_ties_keep_request_order() {
        let codes = vec!["FR".to_string(), "BE".to_string(), "DE".to_string()];
        let result = count_non_weekend(&[], &codes);
        let listed: Vec<_> = result.iter().map(|c| c.country_code.as_str()).collect();
        assert_eq!(listed, vec!["FR", "BE", "DE"]);
    }

    // ── shared dates ─────────────────────────────────────────────

    #[tokio::test]
    async fn shared_dates_match_exact_dates_only() {
        let store = Arc::new(MemoryHolidayStore::new());
        store
            .insert_batch(&[
                holiday("DE", day(2025, 1, 1), "New Year's Day", "Neujahr"),
                holiday("DE", day(2025, 3, 8), "International Women's Day", "Internationaler Frauentag"),
                holiday("BE", day(2025, 1, 1), "New Year's Day", "Nieuwjaar"),
                holiday("BE", day(2025, 11, 11), "Armistice Day", "Wapenstilstand"),
            ])
            .await
            .unwrap();
        let service = service_with(store, StubFetcher::holidays(vec![]), day(2025, 9, 1));

        let shared = service.shared_celebration_dates(2025, "DE", "BE").await.unwrap();
        assert_eq!(
            shared,
            vec![SharedHoliday {
                date: day(2025, 1, 1),
                local_name_first: "Neujahr".into(),
                local_name_second: "Nieuwjaar".into(),
            }]
        );

        let none = service.shared_celebration_dates(2024, "DE", "BE").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn shared_dates_same_country_pairs_with_itself() {
        let service = service_with(seeded_us().await, StubFetcher::holidays(vec![]), day(2025, 9, 1));
        let shared = service.shared_celebration_dates(2025, "US", "US").await.unwrap();
        assert_eq!(shared.len(), 4);
        assert!(shared.iter().all(|s| s.local_name_first == s.local_name_second));
    }

    #[tokio::test]
    async fn out_of_calendar_year_is_invalid_input() {
        let service = service_with(seeded_us().await, StubFetcher::holidays(vec![]), day(2025, 9, 1));
        let err = service
            .shared_celebration_dates(i32::MAX, "US", "CA")
            .await
            .unwrap_err();
        assert!(matches!(err, HolidayError::InvalidInput(_)));
    }

    #[test]
    fn select_new_holidays_drops_known_dates() {
        let existing = HashSet::from([day(2025, 12, 25)]);
        let fetched = vec![
            holiday("NL", day(2025, 12, 25), "Christmas Day", "Eerste Kerstdag"),
            holiday("NL", day(2025, 4, 27), "King's Day", "Koningsdag"),
        ];
        let fresh = select_new_holidays(fetched, &existing);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "King's Day");
    }
}

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::types::*;

/// Persistence port for holiday records.
///
/// The aggregation service operates exclusively through this trait, so the
/// same logic runs against `MemoryHolidayStore` in tests and `PgHolidayStore`
/// in production. Every call reads a consistent snapshot at call time; no
/// transaction spans two calls.
#[async_trait]
pub trait HolidayStore: Send + Sync {
    /// Dates already stored for `country_code` within `span`.
    async fn stored_dates(&self, country_code: &str, span: DateSpan) -> Result<HashSet<NaiveDate>>;

    /// Records for `country_code` dated on or before `on_or_before`, newest
    /// first, ties broken by ascending id, at most `limit`.
    async fn recent_on_or_before(
        &self,
        country_code: &str,
        on_or_before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<HolidayRecord>>;

    /// Records for any of `country_codes` dated within `span`.
    async fn in_span(&self, country_codes: &[String], span: DateSpan) -> Result<Vec<HolidayRecord>>;

    /// Date-equality join of `first`'s records (restricted to `span`) against
    /// `second`'s records. Ordered by date, then first id, then second id.
    async fn shared_dates(
        &self,
        first: &str,
        second: &str,
        span: DateSpan,
    ) -> Result<Vec<SharedHoliday>>;

    /// Insert all of `holidays` as one batch. A holiday whose
    /// `(country_code, date)` is already present is skipped. Returns exactly
    /// the records that were written.
    async fn insert_batch(&self, holidays: &[HolidayPayload]) -> Result<Vec<HolidayRecord>>;
}

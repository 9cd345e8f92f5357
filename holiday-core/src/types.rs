use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// ─── Scalar aliases ───────────────────────────────────────────

/// Store-assigned row id.
pub type HolidayId = i64;

// ─── Records ──────────────────────────────────────────────────

/// A persisted public holiday.
///
/// At most one record exists per `(country_code, date)`. Records are only
/// ever created by a sync; there is no update or delete path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRecord {
    #[serde(skip_serializing)]
    pub id: HolidayId,
    pub date: NaiveDate,
    pub local_name: String,
    pub name: String,
    pub country_code: String,
    #[serde(rename = "fixed")]
    pub is_fixed: bool,
    #[serde(rename = "global")]
    pub is_global: bool,
    pub counties: Option<Vec<String>>,
    pub launch_year: Option<i32>,
    pub types: Vec<String>,
}

/// One holiday as delivered by the upstream source, before it has an id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayPayload {
    pub date: NaiveDate,
    #[serde(default)]
    pub local_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(rename = "fixed", default)]
    pub is_fixed: bool,
    #[serde(rename = "global", default)]
    pub is_global: bool,
    #[serde(default)]
    pub counties: Option<Vec<String>>,
    #[serde(default)]
    pub launch_year: Option<i32>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl HolidayPayload {
    /// Attach a store id.
    pub fn into_record(self, id: HolidayId) -> HolidayRecord {
        HolidayRecord {
            id,
            date: self.date,
            local_name: self.local_name,
            name: self.name,
            country_code: self.country_code,
            is_fixed: self.is_fixed,
            is_global: self.is_global,
            counties: self.counties,
            launch_year: self.launch_year,
            types: self.types,
        }
    }
}

// ─── Derived views (computed on read, never stored) ───────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviousHoliday {
    pub date: NaiveDate,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonWeekendHolidayCount {
    pub country_code: String,
    pub count: u32,
}

/// A date on which both compared countries have a recorded holiday.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SharedHoliday {
    pub date: NaiveDate,
    #[serde(rename = "holidayLocalNameFirstCountry")]
    pub local_name_first: String,
    #[serde(rename = "holidayLocalNameSecondCountry")]
    pub local_name_second: String,
}

// ─── Calendar helpers ─────────────────────────────────────────

/// Half-open date range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// `[Jan 1 of year, Jan 1 of year + 1)`. `None` when either bound is
    /// outside the representable calendar.
    pub fn year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Saturday or Sunday, by calendar day-of-week.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

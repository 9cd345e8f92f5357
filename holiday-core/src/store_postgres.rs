//! Postgres implementation of `HolidayStore`.
//!
//! All SQL is runtime-checked (sqlx::query, not sqlx::query!) to avoid a
//! compile-time database requirement. `(country_code, date)` is enforced by a
//! unique constraint; inserts use `ON CONFLICT DO NOTHING` so two concurrent
//! syncs for the same country cannot both write a date.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::{HolidayError, Result};
use crate::store::HolidayStore;
use crate::types::*;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS holidays (
    id           BIGSERIAL PRIMARY KEY,
    date         DATE    NOT NULL,
    local_name   TEXT    NOT NULL,
    name         TEXT    NOT NULL,
    country_code TEXT    NOT NULL,
    is_fixed     BOOLEAN NOT NULL,
    is_global    BOOLEAN NOT NULL,
    counties     TEXT[],
    launch_year  INTEGER,
    types        TEXT[]  NOT NULL DEFAULT '{}',
    CONSTRAINT holidays_country_date_key UNIQUE (country_code, date)
)
"#;

const CREATE_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS holidays_date_idx ON holidays (date)";

const RECORD_COLUMNS: &str = "id, date, local_name, name, country_code, is_fixed, is_global, \
                              counties, launch_year, types";

#[derive(sqlx::FromRow)]
struct HolidayRow {
    id: i64,
    date: NaiveDate,
    local_name: String,
    name: String,
    country_code: String,
    is_fixed: bool,
    is_global: bool,
    counties: Option<Vec<String>>,
    launch_year: Option<i32>,
    types: Vec<String>,
}

impl From<HolidayRow> for HolidayRecord {
    fn from(row: HolidayRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            local_name: row.local_name,
            name: row.name,
            country_code: row.country_code,
            is_fixed: row.is_fixed,
            is_global: row.is_global,
            counties: row.counties,
            launch_year: row.launch_year,
            types: row.types,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SharedRow {
    date: NaiveDate,
    local_name_first: String,
    local_name_second: String,
}

fn storage_err(e: sqlx::Error) -> HolidayError {
    let unique_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505");
    if unique_violation {
        HolidayError::InvalidState(e.to_string())
    } else {
        HolidayError::Storage(e.to_string())
    }
}

pub struct PgHolidayStore {
    pool: PgPool,
}

impl PgHolidayStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `holidays` table and its indexes if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in [CREATE_TABLE, CREATE_DATE_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;
        }
        tracing::info!("holidays schema ready");
        Ok(())
    }
}

#[async_trait]
impl HolidayStore for PgHolidayStore {
    async fn stored_dates(&self, country_code: &str, span: DateSpan) -> Result<HashSet<NaiveDate>> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT date
            FROM holidays
            WHERE country_code = $1
              AND date >= $2
              AND date < $3
            "#,
        )
        .bind(country_code)
        .bind(span.start)
        .bind(span.end)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(dates.into_iter().collect())
    }

    async fn recent_on_or_before(
        &self,
        country_code: &str,
        on_or_before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<HolidayRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let query = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM holidays
            WHERE country_code = $1
              AND date <= $2
            ORDER BY date DESC, id ASC
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, HolidayRow>(&query)
            .bind(country_code)
            .bind(on_or_before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(HolidayRecord::from).collect())
    }

    async fn in_span(&self, country_codes: &[String], span: DateSpan) -> Result<Vec<HolidayRecord>> {
        let query = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM holidays
            WHERE country_code = ANY($1)
              AND date >= $2
              AND date < $3
            ORDER BY id
            "#
        );
        let rows = sqlx::query_as::<_, HolidayRow>(&query)
            .bind(country_codes.to_vec())
            .bind(span.start)
            .bind(span.end)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(HolidayRecord::from).collect())
    }

    async fn shared_dates(
        &self,
        first: &str,
        second: &str,
        span: DateSpan,
    ) -> Result<Vec<SharedHoliday>> {
        let rows = sqlx::query_as::<_, SharedRow>(
            r#"
            SELECT a.date,
                   a.local_name AS local_name_first,
                   b.local_name AS local_name_second
            FROM holidays a
            JOIN holidays b ON b.date = a.date
            WHERE a.country_code = $1
              AND b.country_code = $2
              AND a.date >= $3
              AND a.date < $4
            ORDER BY a.date, a.id, b.id
            "#,
        )
        .bind(first)
        .bind(second)
        .bind(span.start)
        .bind(span.end)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(rows
            .into_iter()
            .map(|r| SharedHoliday {
                date: r.date,
                local_name_first: r.local_name_first,
                local_name_second: r.local_name_second,
            })
            .collect())
    }

    async fn insert_batch(&self, holidays: &[HolidayPayload]) -> Result<Vec<HolidayRecord>> {
        let query = format!(
            r#"
            INSERT INTO holidays
                (date, local_name, name, country_code, is_fixed, is_global,
                 counties, launch_year, types)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (country_code, date) DO NOTHING
            RETURNING {RECORD_COLUMNS}
            "#
        );

        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let mut inserted = Vec::with_capacity(holidays.len());
        for holiday in holidays {
            let row = sqlx::query_as::<_, HolidayRow>(&query)
                .bind(holiday.date)
                .bind(&holiday.local_name)
                .bind(&holiday.name)
                .bind(&holiday.country_code)
                .bind(holiday.is_fixed)
                .bind(holiday.is_global)
                .bind(holiday.counties.clone())
                .bind(holiday.launch_year)
                .bind(holiday.types.clone())
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage_err)?;
            match row {
                Some(row) => inserted.push(HolidayRecord::from(row)),
                None => tracing::debug!(
                    country_code = %holiday.country_code,
                    date = %holiday.date,
                    "holiday already stored, skipped"
                ),
            }
        }
        tx.commit().await.map_err(storage_err)?;
        Ok(inserted)
    }
}

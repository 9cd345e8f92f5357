//! In-process `HolidayStore` backed by a `Vec` under a tokio `RwLock`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::HolidayStore;
use crate::types::*;

#[derive(Default)]
struct Inner {
    rows: Vec<HolidayRecord>,
    next_id: HolidayId,
}

#[derive(Default)]
pub struct MemoryHolidayStore {
    inner: RwLock<Inner>,
}

impl MemoryHolidayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record in insertion order.
    pub async fn all(&self) -> Vec<HolidayRecord> {
        self.inner.read().await.rows.clone()
    }
}

#[async_trait]
impl HolidayStore for MemoryHolidayStore {
    async fn stored_dates(&self, country_code: &str, span: DateSpan) -> Result<HashSet<NaiveDate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.country_code == country_code && span.contains(r.date))
            .map(|r| r.date)
            .collect())
    }

    async fn recent_on_or_before(
        &self,
        country_code: &str,
        on_or_before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<HolidayRecord>> {
        let inner = self.inner.read().await;
        let mut matching: Vec<HolidayRecord> = inner
            .rows
            .iter()
            .filter(|r| r.country_code == country_code && r.date <= on_or_before)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn in_span(&self, country_codes: &[String], span: DateSpan) -> Result<Vec<HolidayRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|r| span.contains(r.date) && country_codes.contains(&r.country_code))
            .cloned()
            .collect())
    }

    async fn shared_dates(
        &self,
        first: &str,
        second: &str,
        span: DateSpan,
    ) -> Result<Vec<SharedHoliday>> {
        let inner = self.inner.read().await;
        // Rows are held in id order, so the nested scan yields (first id, second id) order.
        let mut pairs: Vec<SharedHoliday> = Vec::new();
        for a in inner
            .rows
            .iter()
            .filter(|r| r.country_code == first && span.contains(r.date))
        {
            for b in inner
                .rows
                .iter()
                .filter(|r| r.country_code == second && r.date == a.date)
            {
                pairs.push(SharedHoliday {
                    date: a.date,
                    local_name_first: a.local_name.clone(),
                    local_name_second: b.local_name.clone(),
                });
            }
        }
        pairs.sort_by_key(|p| p.date);
        Ok(pairs)
    }

    async fn insert_batch(&self, holidays: &[HolidayPayload]) -> Result<Vec<HolidayRecord>> {
        let mut inner = self.inner.write().await;
        let mut taken: HashSet<(String, NaiveDate)> = inner
            .rows
            .iter()
            .map(|r| (r.country_code.clone(), r.date))
            .collect();

        let mut inserted = Vec::new();
        for holiday in holidays {
            if !taken.insert((holiday.country_code.clone(), holiday.date)) {
                continue;
            }
            inner.next_id += 1;
            let record = holiday.clone().into_record(inner.next_id);
            inner.rows.push(record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }
}

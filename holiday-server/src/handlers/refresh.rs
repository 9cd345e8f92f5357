//! POST /api/Holidays/Refresh/:year/:country_code
//!
//! Pull holidays from the upstream source and store the ones not seen before.

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path},
    Extension, Json,
};
use holiday_core::{messages, HolidayRecord, HolidayService};

use crate::envelope::ApiEnvelope;
use crate::error::AppError;

pub async fn refresh(
    Extension(service): Extension<Arc<dyn HolidayService>>,
    path: Result<Path<(i32, String)>, PathRejection>,
) -> Result<Json<ApiEnvelope<HolidayRecord>>, AppError> {
    let Path((year, country_code)) = path?;
    let inserted = service.sync_holidays(year, &country_code).await?;
    Ok(Json(ApiEnvelope::new(
        inserted,
        messages::HOLIDAYS_UPDATED,
        messages::NO_HOLIDAYS_UPDATED,
    )))
}

//! GET /api/Holidays/Shared/:year/:first_country/:second_country

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path},
    Extension, Json,
};
use holiday_core::{messages, HolidayService, SharedHoliday};

use crate::envelope::ApiEnvelope;
use crate::error::AppError;

pub async fn shared_dates(
    Extension(service): Extension<Arc<dyn HolidayService>>,
    path: Result<Path<(i32, String, String)>, PathRejection>,
) -> Result<Json<ApiEnvelope<SharedHoliday>>, AppError> {
    let Path((year, first_country, second_country)) = path?;
    let shared = service
        .shared_celebration_dates(year, &first_country, &second_country)
        .await?;
    Ok(Json(ApiEnvelope::new(
        shared,
        messages::RECORDS_FOUND,
        messages::NO_RECORDS_FOUND,
    )))
}

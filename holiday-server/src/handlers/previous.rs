//! GET /api/Holidays/PreviousThree/:country_code

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path},
    Extension, Json,
};
use holiday_core::{messages, HolidayService, PreviousHoliday};

use crate::envelope::ApiEnvelope;
use crate::error::AppError;

pub async fn previous_three(
    Extension(service): Extension<Arc<dyn HolidayService>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiEnvelope<PreviousHoliday>>, AppError> {
    let Path(country_code) = path?;
    let holidays = service.previous_three(&country_code).await?;
    Ok(Json(ApiEnvelope::new(
        holidays,
        messages::RECORDS_FOUND,
        messages::NO_RECORDS_FOUND,
    )))
}

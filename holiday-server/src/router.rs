//! Router construction for the holiday server.
//!
//! Routes are registered in lowercase and matched case-insensitively:
//! `/api/Holidays/PreviousThree/US` and `/api/holidays/previousthree/us`
//! reach the same handler. Query strings are left untouched.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{uri::PathAndQuery, Uri},
    routing::{get, post},
    Extension, Router,
};
use holiday_core::HolidayService;
use tower::util::MapRequest;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// The router behind the path-lowercasing step. Serve it with
/// `axum::ServiceExt::<Request>::into_make_service`.
pub type HolidayApp = MapRequest<Router, fn(Request) -> Request>;

/// Build the full application with all routes and middleware.
pub fn build_router(service: Arc<dyn HolidayService>) -> HolidayApp {
    let holidays = Router::new()
        .route(
            "/refresh/:year/:country_code",
            post(handlers::refresh::refresh),
        )
        .route(
            "/previousthree/:country_code",
            get(handlers::previous::previous_three),
        )
        .route(
            "/nonweekendcount/:year",
            get(handlers::non_weekend::non_weekend_count),
        )
        .route(
            "/shared/:year/:first_country/:second_country",
            get(handlers::shared::shared_dates),
        );

    let router = Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/holidays", holidays)
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http());

    // Runs before routing; a `Router::layer` would run after the route match.
    MapRequest::new(router, lowercase_path as fn(Request) -> Request)
}

/// Lowercase the path component of the request URI.
pub fn lowercase_path(mut req: Request) -> Request {
    if let Some(uri) = lowercased_uri(req.uri()) {
        *req.uri_mut() = uri;
    }
    req
}

fn lowercased_uri(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    if !path.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let lowered = match uri.query() {
        Some(query) => format!("{}?{}", path.to_ascii_lowercase(), query),
        None => path.to_ascii_lowercase(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(lowered.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}

//! User-facing message texts shared by the service and the HTTP boundary.

// ─── Envelope messages ────────────────────────────────────────

pub const RECORDS_FOUND: &str = "Records found.";
pub const NO_RECORDS_FOUND: &str = "No records found.";
pub const HOLIDAYS_UPDATED: &str = "Holidays updated successfully.";
pub const NO_HOLIDAYS_UPDATED: &str = "No holidays were updated.";

pub const INVALID_YEAR: &str = "Invalid year. Year must be greater than or equal to 1975.";
pub const INVALID_COUNTRY_CODE: &str =
    "Invalid country code(s). Please refer this link- https://date.nager.at/Country";

// ─── Error categories ─────────────────────────────────────────

pub const EXTERNAL_SERVICE_ERROR: &str =
    "An external service error has occurred while processing your request.";
pub const EXTERNAL_SERVICE_UNAVAILABLE: &str =
    "The external holiday service could not be reached.";
pub const DATABASE_OPERATION_FAILED: &str =
    "An error occurred while performing operation with the database.";
pub const INVALID_DATA: &str = "Invalid JSON/data received from API.";
pub const INVALID_INPUT: &str = "The request contained invalid input.";
pub const INVALID_OPERATION: &str = "An error occurred while performing an invalid operation.";
pub const UNKNOWN_ERROR: &str = "An unexpected error occurred while processing your request.";
pub const UNHANDLED_ERROR: &str = "An unhandled exception occurred.";

// ─── Upstream failure details ─────────────────────────────────

pub const API_ERROR: &str = "API returned error.";
pub const API_STATUS_CODE: &str = "API returned status code";
pub const API_UNREACHABLE: &str = "API request failed:";

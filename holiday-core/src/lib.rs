//! holiday-core: public-holiday records, validation, the store/fetcher
//! ports and the aggregation service. No HTTP, no sqlx unless the
//! `postgres` feature is enabled.

pub mod error;
pub mod fetcher;
pub mod messages;
pub mod service;
pub mod store;
pub mod store_memory;
#[cfg(feature = "postgres")]
pub mod store_postgres;
pub mod types;
pub mod validate;

pub use error::{status_code, ErrorKind, HolidayError, Result};
pub use fetcher::{ApiErrorBody, FetchError, FetchOutcome, HolidayFetcher};
pub use service::{HolidayService, HolidayServiceImpl};
pub use store::HolidayStore;
pub use store_memory::MemoryHolidayStore;
#[cfg(feature = "postgres")]
pub use store_postgres::PgHolidayStore;
pub use types::*;

//! holiday-server: REST surface over `holiday-core`.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod nager;
pub mod router;

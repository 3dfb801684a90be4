//! Data access layer.
//!
//! Split into [`models`] (structs matching table rows and insert/update
//! payloads), [`handlers`] (one repository per table, each wrapping a
//! `&mut PgConnection`), and [`errors`] (a unified error type that
//! categorizes constraint violations so the API layer can turn them into
//! meaningful status codes).

pub mod errors;
pub mod handlers;
pub mod models;

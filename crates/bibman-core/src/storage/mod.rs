//! Storage layer
//!
//! A single SQLite table holds every entry. The table is created on open
//! if it does not exist yet; there is no migration tooling.

pub mod record_store;
pub mod schema;

pub use record_store::RecordStore;
pub use schema::{init_schema, validate_table_name};

//! bibman Core Library
//!
//! This crate provides the core functionality for bibman, a small
//! bibliography manager backed by a single SQLite table.
//!
//! # Architecture
//!
//! - **RecordStore**: owns the `bibentries` table (create, list, find,
//!   search, update, delete)
//! - **Codec**: converts entries to and from the line-oriented BibTeX
//!   format used for import/export
//!
//! Every operation is a stateless read-modify cycle against one table.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = RecordStore::open(&config)?;
//!
//! // Add an entry
//! let entry = BibEntry::new("A Study", "Jane Doe", 2021, "Nature");
//! let id = store.create(&entry)?;
//!
//! // Query entries
//! let matches = store.find_by_criteria("doe")?;
//! ```
//!
//! # Modules
//!
//! - `storage`: SQLite table and the record store (main entry point)
//! - `models`: The bibliography entry
//! - `codec`: BibTeX parse/serialize
//! - `transfer`: File import and export
//! - `config`: Application configuration
//! - `error`: Typed errors

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod transfer;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use models::{parse_entry_id, parse_year, BibEntry};
pub use storage::RecordStore;
pub use transfer::{export_entry, import_file, import_str, ExportArtifact, ImportOutcome};

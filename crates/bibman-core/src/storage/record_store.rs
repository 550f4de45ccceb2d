//! Record store
//!
//! The `RecordStore` owns one SQLite table of bibliography entries and
//! exposes the CRUD and search operations the front end needs.
//!
//! ## Usage
//!
//! ```text
//! let store = RecordStore::open(&config)?;  // Creates the table if needed
//!
//! let id = store.create(&entry)?;
//! let entry = store.find_by_id(id)?;
//! let hits = store.find_by_criteria("nature")?;
//! ```
//!
//! Every statement binds its values as parameters. Only the table name,
//! validated on open, is interpolated.

use std::collections::BTreeMap;

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, Params, Row};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::BibEntry;
use crate::storage::schema::init_schema;

/// Columns selected for every entry query, in `row_to_entry` order
const ENTRY_COLUMNS: &str = "id, title, author, year, journal";

/// Text columns searched by `find_by_criteria`
const SEARCH_COLUMNS: [&str; 3] = ["title", "author", "journal"];

/// SQL function lowercasing its argument with full Unicode rules
///
/// SQLite's built-in `lower()` only folds ASCII.
const FOLD_CASE_FN: &str = "fold_case";

/// SQLite-backed storage for bibliography entries
pub struct RecordStore {
    conn: Connection,
    table: String,
}

impl RecordStore {
    /// Open the on-disk store described by the configuration
    ///
    /// Creates the data directory and the entry table when missing.
    pub fn open(config: &Config) -> StoreResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;
        debug!("Opened database at {:?}", path);
        Self::with_connection(conn, &config.table_name)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory(table: &str) -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    /// Wrap an existing connection, creating the table if needed
    pub fn with_connection(conn: Connection, table: &str) -> StoreResult<Self> {
        init_schema(&conn, table)?;
        register_fold_case(&conn)?;

        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Name of the table this store reads and writes
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert a new entry and return its store-assigned id
    ///
    /// Any id already set on `entry` is ignored.
    pub fn create(&self, entry: &BibEntry) -> StoreResult<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (title, author, year, journal) VALUES (?1, ?2, ?3, ?4)",
                self.table
            ),
            params![entry.title, entry.author, entry.year, entry.journal],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, "Created entry");
        Ok(id)
    }

    /// Get every entry in storage order
    pub fn list_all(&self) -> StoreResult<Vec<BibEntry>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", ENTRY_COLUMNS, self.table);
        self.query_entries(&sql, [])
    }

    /// Get an entry by id
    pub fn find_by_id(&self, id: i64) -> StoreResult<BibEntry> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", ENTRY_COLUMNS, self.table);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(row_to_entry(row)?),
            None => Err(StoreError::NotFound { id }),
        }
    }

    /// Search entries by free text
    ///
    /// Matches `text` case-insensitively as a substring of title, author or
    /// journal, and matches the year exactly when `text` is an integer. Each
    /// condition runs as its own query; hits are merged by id so an entry
    /// matching several conditions is returned once. Results are ordered by id.
    pub fn find_by_criteria(&self, text: &str) -> StoreResult<Vec<BibEntry>> {
        let mut matches: BTreeMap<i64, BibEntry> = BTreeMap::new();

        for column in SEARCH_COLUMNS {
            let sql = format!(
                "SELECT {cols} FROM {table} WHERE instr({fold}({column}), {fold}(?1)) > 0",
                cols = ENTRY_COLUMNS,
                table = self.table,
                fold = FOLD_CASE_FN,
            );
            merge_by_id(&mut matches, self.query_entries(&sql, params![text])?);
        }

        if let Ok(year) = text.trim().parse::<i32>() {
            let sql = format!("SELECT {} FROM {} WHERE year = ?1", ENTRY_COLUMNS, self.table);
            merge_by_id(&mut matches, self.query_entries(&sql, params![year])?);
        }

        debug!(query = text, hits = matches.len(), "Searched entries");
        Ok(matches.into_values().collect())
    }

    /// Replace the content fields of the entry with this id
    ///
    /// Returns the number of rows affected; 0 means no such entry.
    pub fn update_by_id(&self, id: i64, entry: &BibEntry) -> StoreResult<usize> {
        let affected = self.conn.execute(
            &format!(
                "UPDATE {} SET title = ?1, author = ?2, year = ?3, journal = ?4 WHERE id = ?5",
                self.table
            ),
            params![entry.title, entry.author, entry.year, entry.journal, id],
        )?;

        info!(id, affected, "Updated entry");
        Ok(affected)
    }

    /// Delete the entry with this id
    ///
    /// Returns the number of rows affected; 0 means no such entry.
    pub fn delete_by_id(&self, id: i64) -> StoreResult<usize> {
        let affected = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            params![id],
        )?;

        info!(id, affected, "Deleted entry");
        Ok(affected)
    }

    /// Get entry count
    pub fn count(&self) -> StoreResult<i64> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
                row.get(0)
            })
            .map_err(Into::into)
    }

    /// Ids of entries whose four content fields all equal `entry`'s
    pub fn find_matching(&self, entry: &BibEntry) -> StoreResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {} WHERE title = ?1 AND author = ?2 AND year = ?3 AND journal = ?4 ORDER BY id",
            self.table
        ))?;

        let ids = stmt
            .query_map(
                params![entry.title, entry.author, entry.year, entry.journal],
                |row| row.get(0),
            )?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn query_entries<P: Params>(&self, sql: &str, params: P) -> StoreResult<Vec<BibEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params, row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn register_fold_case(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

fn row_to_entry(row: &Row) -> rusqlite::Result<BibEntry> {
    Ok(BibEntry {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        journal: row.get(4)?,
    })
}

fn merge_by_id(matches: &mut BTreeMap<i64, BibEntry>, entries: Vec<BibEntry>) {
    for entry in entries {
        if let Some(id) = entry.id {
            matches.entry(id).or_insert(entry);
        }
    }
}

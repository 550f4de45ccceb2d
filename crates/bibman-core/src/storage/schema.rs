//! SQLite schema for the entry table
//!
//! The table name comes from configuration, so it is validated as a plain
//! identifier before being interpolated into any statement.

use rusqlite::Connection;

use crate::error::{StoreError, StoreResult};

/// Check that a table name is a bare SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn validate_table_name(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidArgument(format!(
            "table name must be a plain identifier, got '{}'",
            name
        )))
    }
}

/// Create the entry table if it does not exist
pub fn init_schema(conn: &Connection, table: &str) -> StoreResult<()> {
    validate_table_name(table)?;

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            author TEXT NOT NULL DEFAULT '',
            year INTEGER NOT NULL DEFAULT 0,
            journal TEXT NOT NULL DEFAULT ''
        );
        "#
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_table(conn: &Connection, table: &str) -> bool {
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?1")
            .unwrap()
            .exists([table])
            .unwrap()
    }

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!has_table(&conn, "bibentries"));

        init_schema(&conn, "bibentries").unwrap();
        assert!(has_table(&conn, "bibentries"));

        let columns: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('bibentries') ORDER BY cid")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert_eq!(columns, vec!["id", "title", "author", "year", "journal"]);
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "bibentries").unwrap();
        conn.execute(
            "INSERT INTO bibentries (title, author, year, journal) VALUES ('t', 'a', 1, 'j')",
            [],
        )
        .unwrap();

        init_schema(&conn, "bibentries").unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM bibentries", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("bibentries").is_ok());
        assert!(validate_table_name("_refs2").is_ok());

        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2refs").is_err());
        assert!(validate_table_name("refs; DROP TABLE x").is_err());
        assert!(validate_table_name("my-table").is_err());
    }

    #[test]
    fn test_init_schema_rejects_bad_name() {
        let conn = Connection::open_in_memory().unwrap();
        let err = init_schema(&conn, "bad name").unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }
}

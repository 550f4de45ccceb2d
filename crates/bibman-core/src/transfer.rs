//! File import and export
//!
//! Import accepts one `.bib` file holding a single entry, parses it with
//! the codec and stores it. Export renders one stored entry as a file
//! artifact named after its title.
//!
//! A failed export write never undoes database changes made earlier in the
//! same command.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codec;
use crate::error::{IoOp, StoreError, StoreResult};
use crate::models::BibEntry;
use crate::storage::RecordStore;

/// Suffix an import file name must end in, and that export appends to the
/// sanitized title
pub const BIB_SUFFIX: &str = ".bib";

/// Content type of an exported file
pub const EXPORT_CONTENT_TYPE: &str = "application/x-bibtex";

/// Result of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Id assigned to the new entry
    pub id: i64,
    /// The entry as stored
    pub entry: BibEntry,
    /// Ids of identical entries that already existed before the import
    pub duplicates: Vec<i64>,
}

/// A downloadable rendering of one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ExportArtifact {
    /// Render an entry as an export artifact
    pub fn from_entry(entry: &BibEntry) -> Self {
        Self {
            file_name: format!("{}{}", sanitize_file_stem(&entry.title), BIB_SUFFIX),
            content_type: EXPORT_CONTENT_TYPE,
            body: codec::serialize(entry),
        }
    }

    /// Write the artifact into `dir`, creating it if needed
    ///
    /// Returns the path of the written file.
    pub fn write_to(&self, dir: &Path) -> StoreResult<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| StoreError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.body)
            .map_err(|e| StoreError::from_io(e, path.clone(), IoOp::Write))?;

        info!(path = %path.display(), "Exported entry");
        Ok(path)
    }
}

/// Import the entry contained in a `.bib` file
///
/// Files whose name does not end in `.bib` are rejected before they are read.
/// A file named just `.bib` is accepted.
pub fn import_file(store: &RecordStore, path: &Path) -> StoreResult<ImportOutcome> {
    check_import_suffix(path)?;

    let contents =
        fs::read_to_string(path).map_err(|e| StoreError::from_io(e, path.to_path_buf(), IoOp::Read))?;

    import_contents(store, path, &contents)
}

/// Import an entry from contents already in memory (an uploaded file)
///
/// `file_name` is only used for the suffix check.
pub fn import_str(store: &RecordStore, file_name: &str, contents: &str) -> StoreResult<ImportOutcome> {
    let path = Path::new(file_name);
    check_import_suffix(path)?;
    import_contents(store, path, contents)
}

/// Look up an entry and render it for export
pub fn export_entry(store: &RecordStore, id: i64) -> StoreResult<ExportArtifact> {
    let entry = store.find_by_id(id)?;
    Ok(ExportArtifact::from_entry(&entry))
}

/// Replace characters that cannot appear in a single file name component
///
/// Spaces become underscores, as do path separators.
pub fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

fn check_import_suffix(path: &Path) -> StoreResult<()> {
    let supported = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(has_bib_suffix);

    if supported {
        Ok(())
    } else {
        debug!(path = %path.display(), "Rejected import");
        Err(StoreError::UnsupportedFileType {
            path: path.to_path_buf(),
        })
    }
}

fn has_bib_suffix(name: &str) -> bool {
    name.len() >= BIB_SUFFIX.len()
        && name.as_bytes()[name.len() - BIB_SUFFIX.len()..]
            .eq_ignore_ascii_case(BIB_SUFFIX.as_bytes())
}

fn import_contents(store: &RecordStore, path: &Path, contents: &str) -> StoreResult<ImportOutcome> {
    let entry = codec::parse(contents);
    let duplicates = store.find_matching(&entry)?;
    let id = store.create(&entry)?;

    info!(id, path = %path.display(), "Imported entry");
    Ok(ImportOutcome {
        id,
        entry: entry.with_id(id),
        duplicates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "@article{doe2021,\n\
                          author = {Jane Doe},\n\
                          title={A Study},\n\
                          year=2021,\n\
                          journal={Nature}\n\
                          }\n";

    fn store() -> RecordStore {
        RecordStore::open_in_memory("bibentries").unwrap()
    }

    #[test]
    fn test_import_bib_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x.bib");
        fs::write(&path, SAMPLE).unwrap();

        let store = store();
        let outcome = import_file(&store, &path).unwrap();

        let stored = store.find_by_id(outcome.id).unwrap();
        assert!(stored.same_content(&BibEntry::new("A Study", "Jane Doe", 2021, "Nature")));
        assert_eq!(outcome.entry, stored);
        assert!(outcome.duplicates.is_empty());
    }

    #[test]
    fn test_import_wrong_extension_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x.txt");
        fs::write(&path, SAMPLE).unwrap();

        let store = store();
        let err = import_file(&store, &path).unwrap_err();

        assert!(matches!(err, StoreError::UnsupportedFileType { .. }));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_import_rejects_before_reading() {
        // The file does not exist; the extension check must fire first
        let store = store();
        let err = import_file(&store, Path::new("/nonexistent/notes.md")).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFileType { .. }));

        let err = import_file(&store, Path::new("/nonexistent/noext")).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFileType { .. }));
    }

    #[test]
    fn test_import_extension_is_case_insensitive() {
        let store = store();
        let outcome = import_str(&store, "UPPER.BIB", SAMPLE).unwrap();
        assert_eq!(outcome.entry.author, "Jane Doe");
    }

    #[test]
    fn test_import_missing_file() {
        let store = store();
        let err = import_file(&store, Path::new("/nonexistent/missing.bib")).unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_import_reports_duplicates() {
        let store = store();
        let first = import_str(&store, "a.bib", SAMPLE).unwrap();
        let second = import_str(&store, "b.bib", SAMPLE).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.duplicates, vec![first.id]);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_import_unrecognized_content_stores_defaults() {
        let store = store();
        let outcome = import_str(&store, "empty.bib", "nothing useful here\n").unwrap();

        assert_eq!(outcome.entry.title, "");
        assert_eq!(outcome.entry.year, 0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("A Study of Things"), "A_Study_of_Things");
        assert_eq!(sanitize_file_stem("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_file_stem("plain"), "plain");
    }

    #[test]
    fn test_export_entry() {
        let store = store();
        let entry = BibEntry::new("A Study", "Jane Doe", 2021, "Nature");
        let id = store.create(&entry).unwrap();

        let artifact = export_entry(&store, id).unwrap();
        assert_eq!(artifact.file_name, "A_Study.bib");
        assert_eq!(artifact.content_type, EXPORT_CONTENT_TYPE);
        assert_eq!(artifact.body, codec::serialize(&entry));
    }

    #[test]
    fn test_export_missing_entry() {
        let store = store();
        assert!(matches!(
            export_entry(&store, 7),
            Err(StoreError::NotFound { id: 7 })
        ));
    }

    #[test]
    fn test_export_write_then_import() {
        let temp_dir = TempDir::new().unwrap();
        let store = store();
        let entry = BibEntry::new("Round Trip", "Ann Author", 1999, "Letters");
        let id = store.create(&entry).unwrap();

        let artifact = export_entry(&store, id).unwrap();
        let path = artifact.write_to(&temp_dir.path().join("out")).unwrap();

        assert!(path.ends_with("Round_Trip.bib"));
        assert_eq!(fs::read_to_string(&path).unwrap(), artifact.body);

        let outcome = import_file(&store, &path).unwrap();
        assert!(outcome.entry.same_content(&entry));
        assert_eq!(outcome.duplicates, vec![id]);
    }

    #[test]
    fn test_export_empty_title_then_import() {
        let temp_dir = TempDir::new().unwrap();
        let store = store();
        let entry = BibEntry::new("", "Anonymous", 1900, "Gazette");
        let id = store.create(&entry).unwrap();

        let artifact = export_entry(&store, id).unwrap();
        assert_eq!(artifact.file_name, ".bib");

        let path = artifact.write_to(temp_dir.path()).unwrap();
        let outcome = import_file(&store, &path).unwrap();
        assert!(outcome.entry.same_content(&entry));
        assert_eq!(outcome.duplicates, vec![id]);
    }

    #[test]
    fn test_has_bib_suffix() {
        assert!(has_bib_suffix("x.bib"));
        assert!(has_bib_suffix(".bib"));
        assert!(has_bib_suffix("Refs.BiB"));
        assert!(!has_bib_suffix("bib"));
        assert!(!has_bib_suffix("x.bibx"));
        assert!(!has_bib_suffix("über"));
    }

    #[test]
    fn test_write_failure_keeps_database_state() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the export directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let store = store();
        let id = store
            .create(&BibEntry::new("Kept", "A", 2000, "J"))
            .unwrap();

        let artifact = export_entry(&store, id).unwrap();
        assert!(artifact.write_to(&blocker).is_err());
        assert_eq!(store.find_by_id(id).unwrap().title, "Kept");
    }
}

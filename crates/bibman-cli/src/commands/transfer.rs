//! Import and export command handlers

use std::path::PathBuf;

use anyhow::Result;

use bibman_core::{export_entry, import_file, parse_entry_id, RecordStore};

use crate::output::Output;

/// Import one entry from a .bib file
pub fn import(store: &RecordStore, file: PathBuf, output: &Output) -> Result<()> {
    let outcome = import_file(store, &file)?;

    output.success(&format!("Imported entry: {}", outcome.id));
    if !outcome.duplicates.is_empty() {
        let ids: Vec<String> = outcome.duplicates.iter().map(|id| id.to_string()).collect();
        output.message(&format!(
            "Note: identical entry already existed (id {})",
            ids.join(", ")
        ));
    }
    output.print_entry(&outcome.entry);
    Ok(())
}

/// Export an entry into `dir`
pub fn export(store: &RecordStore, id: String, dir: PathBuf, output: &Output) -> Result<()> {
    let id = parse_entry_id(&id)?;
    let artifact = export_entry(store, id)?;
    let path = artifact.write_to(&dir)?;

    output.print_export(&artifact, &path);
    Ok(())
}

//! Entry command handlers

use anyhow::{bail, Context, Result};

use bibman_core::{parse_entry_id, parse_year, BibEntry, RecordStore, StoreError, StoreResult};

use crate::output::Output;
use crate::prompt::{confirm, is_interactive, prompt_with_default};

/// Field values supplied for an edit; `None` keeps the stored value
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    pub journal: Option<String>,
}

impl EntryFields {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.year.is_none()
            && self.journal.is_none()
    }

    /// Overwrite the supplied fields on `entry`
    ///
    /// The year is validated before anything is changed.
    pub fn apply_to(self, entry: &mut BibEntry) -> StoreResult<()> {
        let year = self.year.as_deref().map(parse_year).transpose()?;

        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(author) = self.author {
            entry.author = author;
        }
        if let Some(year) = year {
            entry.year = year;
        }
        if let Some(journal) = self.journal {
            entry.journal = journal;
        }
        Ok(())
    }
}

/// List all entries
pub fn list(store: &RecordStore, output: &Output) -> Result<()> {
    let entries = store.list_all()?;
    output.print_entries(&entries);
    Ok(())
}

/// Create a new entry
pub fn add(
    store: &RecordStore,
    title: String,
    author: String,
    year: String,
    journal: String,
    output: &Output,
) -> Result<()> {
    let year = parse_year(&year)?;
    let entry = BibEntry::new(title, author, year, journal);

    let id = store.create(&entry).context("Failed to create entry")?;

    output.success(&format!("Created entry: {}", id));
    output.print_entry(&entry.with_id(id));
    Ok(())
}

/// Show a single entry
pub fn show(store: &RecordStore, id: String, output: &Output) -> Result<()> {
    let id = parse_entry_id(&id)?;
    let entry = store.find_by_id(id)?;
    output.print_entry(&entry);
    Ok(())
}

/// Edit an entry
pub fn edit(store: &RecordStore, id: String, fields: EntryFields, output: &Output) -> Result<()> {
    let id = parse_entry_id(&id)?;
    let mut entry = store.find_by_id(id)?;

    let fields = if fields.is_empty() {
        if !(output.should_prompt() && is_interactive()) {
            bail!("Nothing to change. Pass --title, --author, --year or --journal.");
        }
        prompt_for_fields(&entry)?
    } else {
        fields
    };

    fields.apply_to(&mut entry)?;

    let affected = store
        .update_by_id(id, &entry)
        .context("Failed to update entry")?;
    if affected == 0 {
        // Deleted between lookup and update
        return Err(StoreError::NotFound { id }.into());
    }

    output.success("Entry updated");
    output.print_entry(&entry);
    Ok(())
}

/// Delete an entry
pub fn delete(store: &RecordStore, id: String, output: &Output) -> Result<()> {
    let id = parse_entry_id(&id)?;
    let entry = store.find_by_id(id)?;

    if output.should_prompt() {
        println!("Delete entry: {} - {}", id, entry.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let affected = store.delete_by_id(id).context("Failed to delete entry")?;
    if affected == 0 {
        return Err(StoreError::NotFound { id }.into());
    }

    output.success(&format!("Deleted entry: {}", id));
    Ok(())
}

/// Search entries
pub fn search(store: &RecordStore, query: String, output: &Output) -> Result<()> {
    let entries = store.find_by_criteria(&query)?;
    output.print_entries(&entries);
    Ok(())
}

/// Ask for each field, keeping the current value on empty input
fn prompt_for_fields(entry: &BibEntry) -> Result<EntryFields> {
    println!("Editing entry: {}", entry.id.unwrap_or_default());
    println!("Press Enter to keep current value, or type new value.\n");

    Ok(EntryFields {
        title: prompt_with_default("Title", &entry.title)?,
        author: prompt_with_default("Author", &entry.author)?,
        year: prompt_with_default("Year", &entry.year.to_string())?,
        journal: prompt_with_default("Journal", &entry.journal)?,
    })
}

//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::path::Path;

use serde::Serialize;

use bibman_core::{BibEntry, ExportArtifact};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single entry
    pub fn print_entry(&self, entry: &BibEntry) {
        match self.format {
            OutputFormat::Human => {
                if let Some(id) = entry.id {
                    println!("ID:      {}", id);
                }
                println!("Title:   {}", entry.title);
                println!("Author:  {}", entry.author);
                println!("Year:    {}", entry.year);
                println!("Journal: {}", entry.journal);
            }
            OutputFormat::Json => print_json(entry),
            OutputFormat::Quiet => {
                if let Some(id) = entry.id {
                    println!("{}", id);
                }
            }
        }
    }

    /// Print a list of entries
    pub fn print_entries(&self, entries: &[BibEntry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No entries found.");
                    return;
                }
                for entry in entries {
                    println!("{}", entry_line(entry));
                }
                let noun = if entries.len() == 1 { "entry" } else { "entries" };
                println!("\n{} {}", entries.len(), noun);
            }
            OutputFormat::Json => print_json(entries),
            OutputFormat::Quiet => {
                for id in entries.iter().filter_map(|e| e.id) {
                    println!("{}", id);
                }
            }
        }
    }

    /// Print where an exported entry was written
    pub fn print_export(&self, artifact: &ExportArtifact, path: &Path) {
        match self.format {
            OutputFormat::Human => {
                println!("✓ Exported to {}", path.display());
                println!("  Content-Type: {}", artifact.content_type);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": path,
                        "file_name": artifact.file_name,
                        "content_type": artifact.content_type,
                    })
                );
            }
            OutputFormat::Quiet => println!("{}", path.display()),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

/// One-line summary used in entry listings
fn entry_line(entry: &BibEntry) -> String {
    let id = entry.id.map(|id| id.to_string()).unwrap_or_default();
    format!(
        "{:>5} | {} | {} | {} | {}",
        id,
        truncate(&entry.title, 40),
        truncate(&entry.author, 25),
        entry.year,
        truncate(&entry.journal, 25)
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

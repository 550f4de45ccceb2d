//! Status command handler

use anyhow::Result;

use bibman_core::{Config, RecordStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &RecordStore, config: &Config, output: &Output) -> Result<()> {
    let count = store.count()?;
    let db_path = config.sqlite_path();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "database": db_path,
                    "table": store.table(),
                    "entries": count
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", count);
        }
        OutputFormat::Human => {
            println!("bibman Status");
            println!("=============");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Database: {}", db_path.display());
            println!("  Table:    {}", store.table());
            println!();
            println!("Contents:");
            println!("  Entries: {}", count);
        }
    }

    Ok(())
}

//! Import and export command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use quotesync_core::{Config, ImportPolicy, QuoteStore, EXPORT_FILE_NAME};

use crate::output::Output;

/// Import quotes from a JSON file
///
/// `--append` forces the append policy; otherwise the configured one is used.
pub fn import(
    store: &mut QuoteStore,
    config: &Config,
    file: PathBuf,
    append: bool,
    output: &Output,
) -> Result<()> {
    let payload = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let policy = if append {
        ImportPolicy::Append
    } else {
        config.import_policy
    };

    let summary = store.import_json(&payload, policy)?;
    output.print_import_summary(&summary, store.len());
    Ok(())
}

/// Export quotes to a JSON file, or stdout for "-"
pub fn export(store: &QuoteStore, file: Option<PathBuf>, output: &Output) -> Result<()> {
    let path = file.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));

    if path.as_os_str() == "-" {
        println!("{}", store.export_json()?);
        return Ok(());
    }

    store
        .export_to(&path)
        .with_context(|| format!("Failed to export to {}", path.display()))?;
    output.success(&format!(
        "Exported {} quote(s) to {}",
        store.len(),
        path.display()
    ));
    Ok(())
}

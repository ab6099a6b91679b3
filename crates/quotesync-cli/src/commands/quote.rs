//! Quote command handlers

use anyhow::{bail, Result};

use quotesync_core::{Config, Quote, QuoteStore};

use crate::output::Output;

/// Show a random quote from the selected (or given) category
pub fn show(store: &mut QuoteStore, category: Option<String>, output: &Output) -> Result<()> {
    if let Some(category) = category {
        select(store, &category)?;
    }

    if let Some(previous) = store.last_viewed() {
        output.message(&format!("Last viewed: {}", previous));
    }

    match store.random_quote() {
        Some(quote) => output.print_quote(&quote),
        None => output.message(&format!(
            "No quotes in category '{}'.",
            store.selected_category()
        )),
    }

    Ok(())
}

/// Add a quote, uploading it when sync is enabled
pub async fn add(
    mut store: QuoteStore,
    config: &Config,
    text: String,
    category: String,
    output: &Output,
) -> Result<()> {
    let quote = Quote::from_input(&text, &category)?;

    if !config.sync_enabled {
        store.add(quote.clone())?;
        output.success(&format!("Quote added: {}", quote));
        return Ok(());
    }

    let coordinator = super::sync::coordinator(store, config)?;
    let report = coordinator.add_quote(quote).await?;
    output.success(&format!("Quote added: {}", report.quote));

    match report.push {
        Ok(ack) => {
            if let Some(id) = ack.remote_id {
                output.message(&format!("  Uploaded to server (id {})", id));
            }
        }
        Err(e) => output.warning(&format!("Saved locally, upload failed: {}", e)),
    }

    Ok(())
}

/// List quotes in a category
///
/// An explicit category becomes the selected category.
pub fn list(store: &mut QuoteStore, category: Option<String>, output: &Output) -> Result<()> {
    if let Some(category) = category {
        select(store, &category)?;
    }

    let selected = store.selected_category().to_string();
    let quotes = store.filtered(&selected);
    output.print_quotes(quotes.as_slice(), &selected);
    Ok(())
}

/// List categories with usage counts
pub fn categories(store: &QuoteStore, output: &Output) -> Result<()> {
    output.print_categories(&store.category_counts(), store.selected_category());
    Ok(())
}

fn select(store: &mut QuoteStore, category: &str) -> Result<()> {
    if !store.categories().contains(category) {
        let known: Vec<&str> = store.categories().iter().collect();
        bail!(
            "Unknown category: '{}'\nKnown categories: {}",
            category,
            known.join(", ")
        );
    }
    store.select_category(category)?;
    Ok(())
}

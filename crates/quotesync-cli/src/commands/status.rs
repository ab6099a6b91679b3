//! Status command handler

use anyhow::Result;

use quotesync_core::{Config, QuoteStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &QuoteStore, config: &Config, output: &Output) -> Result<()> {
    let store_path = config.quotes_path();
    let location = store.location().unwrap_or(config.data_dir.as_path());
    let category_count = store.category_counts().len();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": location,
                    "store_exists": store_path.exists(),
                    "sync_enabled": config.sync_enabled,
                    "remote_url": config.remote_url,
                    "sync_interval_secs": config.sync_interval().as_secs(),
                    "counts": {
                        "quotes": store.len(),
                        "categories": category_count
                    },
                    "selected_category": store.selected_category()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("quotesync Status");
            println!("================");
            println!();
            println!("Sync:");
            println!(
                "  Status:   {}",
                if config.sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("  Remote:   {}", config.remote_url);
            println!("  Interval: {}s", config.sync_interval().as_secs());
            println!();
            println!("Storage:");
            println!("  Location: {}", location.display());
            if !store_path.exists() {
                println!("  (nothing saved yet, showing seed quotes)");
            }
            println!();
            println!("Contents:");
            println!("  Quotes:     {}", store.len());
            println!("  Categories: {}", category_count);
            println!("  Selected:   {}", store.selected_category());
        }
    }

    Ok(())
}

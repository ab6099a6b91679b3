//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use quotesync_core::sync::{SyncOutcome, SyncReport};
use quotesync_core::{ImportSummary, Quote};

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

    /// Print a single quote
    pub fn print_quote(&self, quote: &Quote) {
        match self.format {
            OutputFormat::Human => {
                println!("\"{}\"", quote.text);
                println!("  - {}", quote.category);
            }
            OutputFormat::Json => {
                println!("{}", pretty(quote));
            }
            OutputFormat::Quiet => {
                println!("{}", quote.text);
            }
        }
    }

    /// Print a list of quotes
    pub fn print_quotes(&self, quotes: &[Quote], category: &str) {
        match self.format {
            OutputFormat::Human => {
                if quotes.is_empty() {
                    println!("No quotes found in category '{}'.", category);
                    return;
                }
                for quote in quotes {
                    println!(
                        "{:<14} | {}",
                        truncate(&quote.category, 14),
                        truncate(&quote.text, 60)
                    );
                }
                println!("\n{} quote(s) in '{}'", quotes.len(), category);
            }
            OutputFormat::Json => {
                println!("{}", pretty(&quotes));
            }
            OutputFormat::Quiet => {
                for quote in quotes {
                    println!("{}", quote.text);
                }
            }
        }
    }

    /// Print categories with quote counts
    pub fn print_categories(&self, categories: &[(String, usize)], selected: &str) {
        match self.format {
            OutputFormat::Human => {
                for (name, count) in categories {
                    let marker = if name == selected { "*" } else { " " };
                    println!("{} {} ({})", marker, name, count);
                }
                println!("\n{}", categories_footer(categories));
            }
            OutputFormat::Json => {
                let json_categories: Vec<_> = categories
                    .iter()
                    .map(|(name, count)| {
                        serde_json::json!({
                            "name": name,
                            "count": count,
                            "selected": name == selected
                        })
                    })
                    .collect();
                println!("{}", pretty(&json_categories));
            }
            OutputFormat::Quiet => {
                for (name, _) in categories {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print the outcome of a sync cycle
    pub fn print_sync_report(&self, report: &SyncReport) {
        match self.format {
            OutputFormat::Human => {
                let marker = match report.outcome {
                    SyncOutcome::Success => "✓",
                    SyncOutcome::PartialFailure | SyncOutcome::Failure => "⚠",
                };
                println!(
                    "{} [{}] {}",
                    marker,
                    report.finished_at.format("%H:%M:%S"),
                    report.message
                );
                for failure in &report.push_failures {
                    println!("    {}", failure);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "mode": report.mode.to_string(),
                        "outcome": format!("{:?}", report.outcome),
                        "fetched": report.fetched,
                        "new_from_remote": report.new_from_remote,
                        "total": report.total,
                        "pushed": report.pushed,
                        "push_failures": report.push_failures,
                        "message": report.message,
                        "finished_at": report.finished_at.to_rfc3339()
                    })
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print the result of an import
    pub fn print_import_summary(&self, summary: &ImportSummary, total: usize) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Quotes imported successfully ({}): {} imported, {} skipped",
                    summary.policy, summary.imported, summary.skipped
                );
                println!("  Collection now has {} quote(s)", total);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "success",
                        "policy": summary.policy.to_string(),
                        "imported": summary.imported,
                        "skipped": summary.skipped,
                        "total": total
                    })
                );
            }
            OutputFormat::Quiet => {}
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

    /// Print a warning that does not fail the command
    pub fn warning(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("⚠ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "warning", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
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

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

/// Summary line under the category listing
///
/// `categories` comes from `QuoteStore::category_counts`, which excludes `"all"`.
fn categories_footer(categories: &[(String, usize)]) -> String {
    match categories.len() {
        1 => "1 category".to_string(),
        n => format!("{} categories", n),
    }
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

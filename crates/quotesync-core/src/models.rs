//! Data models for quotesync
//!
//! Defines the core data structures: `Quote` and `Collection`.
//! A quote has no identity beyond its text; two quotes with the same text are
//! the same quote, whatever their categories.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category assigned to every quote that came from the remote feed
pub const SERVER_CATEGORY: &str = "Server";

/// Validation failures for a single quote
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Quote text must not be empty")]
    EmptyText,

    #[error("Quote category must not be empty")]
    EmptyCategory,
}

/// A single quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Quote {
    /// The quote itself; also the dedup key
    pub text: String,
    /// User-defined tag used for filtering
    pub category: String,
}

impl Quote {
    /// Create a new quote
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Build a quote from user input, trimming both fields and validating them
    pub fn from_input(text: &str, category: &str) -> Result<Self, QuoteError> {
        let quote = Self::new(text.trim(), category.trim());
        quote.validate()?;
        Ok(quote)
    }

    /// Quote mapped from a remote feed item
    pub fn from_server(title: impl Into<String>) -> Self {
        Self::new(title, SERVER_CATEGORY)
    }

    /// Check that text and category are non-empty
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.text.trim().is_empty() {
            return Err(QuoteError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(QuoteError::EmptyCategory);
        }
        Ok(())
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" ({})", self.text, self.category)
    }
}

/// Ordered sequence of quotes, in insertion order
///
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Collection(Vec<Quote>);

impl Collection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// The seed collection used on first run and when persisted data is unusable
    pub fn seed() -> Self {
        Self(vec![
            Quote::new(
                "The only limit to our realization of tomorrow is our doubts of today.",
                "Motivation",
            ),
            Quote::new(
                "Life is what happens when you're busy making other plans.",
                "Life",
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.0.get(index)
    }

    pub fn as_slice(&self) -> &[Quote] {
        &self.0
    }

    /// Append a quote without any dedup check
    pub fn push(&mut self, quote: Quote) {
        self.0.push(quote);
    }

    /// Find a quote by its exact text
    pub fn find_by_text(&self, text: &str) -> Option<&Quote> {
        self.0.iter().find(|q| q.text == text)
    }

    /// Whether a quote with this exact text is present
    pub fn contains_text(&self, text: &str) -> bool {
        self.find_by_text(text).is_some()
    }

    /// Set of all texts, for dedup lookups
    pub fn texts(&self) -> HashSet<&str> {
        self.0.iter().map(|q| q.text.as_str()).collect()
    }

    /// Whether any two quotes share the same text
    pub fn has_duplicate_texts(&self) -> bool {
        let mut seen = HashSet::new();
        !self.0.iter().all(|q| seen.insert(q.text.as_str()))
    }
}

impl From<Vec<Quote>> for Collection {
    fn from(quotes: Vec<Quote>) -> Self {
        Self(quotes)
    }
}

impl FromIterator<Quote> for Collection {
    fn from_iter<I: IntoIterator<Item = Quote>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Collection {
    type Item = Quote;
    type IntoIter = std::vec::IntoIter<Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<Quote> for Collection {
    fn extend<I: IntoIterator<Item = Quote>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new("Stay hungry.", "Motivation");
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.category, "Motivation");
        assert!(quote.validate().is_ok());
    }

    #[test]
    fn test_quote_from_input_trims() {
        let quote = Quote::from_input("  Stay hungry.  ", " Motivation ").unwrap();
        assert_eq!(quote, Quote::new("Stay hungry.", "Motivation"));
    }

    #[test]
    fn test_quote_validation() {
        assert_eq!(Quote::from_input("   ", "Life"), Err(QuoteError::EmptyText));
        assert_eq!(
            Quote::from_input("Some text", ""),
            Err(QuoteError::EmptyCategory)
        );
        assert_eq!(Quote::new("", "").validate(), Err(QuoteError::EmptyText));
    }

    #[test]
    fn test_quote_from_server() {
        let quote = Quote::from_server("sunt aut facere");
        assert_eq!(quote.category, SERVER_CATEGORY);
        assert_eq!(quote.text, "sunt aut facere");
    }

    #[test]
    fn test_quote_display() {
        let quote = Quote::new("Be kind.", "Life");
        assert_eq!(quote.to_string(), "\"Be kind.\" (Life)");
    }

    #[test]
    fn test_seed_collection() {
        let seed = Collection::seed();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed.get(0).unwrap().category, "Motivation");
        assert_eq!(seed.get(1).unwrap().category, "Life");
        assert!(!seed.has_duplicate_texts());
    }

    #[test]
    fn test_collection_lookup() {
        let collection: Collection = vec![Quote::new("A", "x"), Quote::new("B", "y")].into();
        assert!(collection.contains_text("A"));
        assert!(!collection.contains_text("a"));
        assert_eq!(collection.find_by_text("B").unwrap().category, "y");
        assert_eq!(collection.texts().len(), 2);
    }

    #[test]
    fn test_collection_duplicate_detection() {
        let mut collection = Collection::new();
        collection.push(Quote::new("A", "x"));
        collection.push(Quote::new("B", "x"));
        assert!(!collection.has_duplicate_texts());

        collection.push(Quote::new("A", "y"));
        assert!(collection.has_duplicate_texts());
    }

    #[test]
    fn test_collection_serializes_as_array() {
        let collection: Collection = vec![Quote::new("A", "x")].into();
        let json = serde_json::to_string(&collection).unwrap();
        assert_eq!(json, r#"[{"text":"A","category":"x"}]"#);

        let parsed: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, collection);
    }
}

//! Category index
//!
//! Derives the distinct categories of a collection and filtered views of it.

use crate::models::Collection;

/// Sentinel category selecting every quote
pub const ALL_CATEGORIES: &str = "all";

/// Distinct categories of a collection, `"all"` first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether `category` is selectable (including the sentinel)
    pub fn contains(&self, category: &str) -> bool {
        self.0.iter().any(|c| c == category)
    }

    /// Number of entries, including the sentinel
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self(vec![ALL_CATEGORIES.to_string()])
    }
}

/// Category set kept in step with the collection
#[derive(Debug, Clone, Default)]
pub struct CollectionIndex {
    categories: CategorySet,
}

impl CollectionIndex {
    /// Build an index for `collection`
    pub fn build(collection: &Collection) -> Self {
        let mut index = Self::default();
        index.rebuild(collection);
        index
    }

    /// Recompute the category set; categories keep first-occurrence order
    pub fn rebuild(&mut self, collection: &Collection) -> &CategorySet {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for quote in collection {
            if !categories[1..].iter().any(|c| *c == quote.category) {
                categories.push(quote.category.clone());
            }
        }
        self.categories = CategorySet(categories);
        &self.categories
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Quotes per category, in index order (sentinel excluded)
    pub fn counts(&self, collection: &Collection) -> Vec<(String, usize)> {
        self.categories
            .iter()
            .skip(1)
            .map(|category| {
                let count = collection.iter().filter(|q| q.category == category).count();
                (category.to_string(), count)
            })
            .collect()
    }
}

/// Quotes matching `category`, order preserved; `"all"` returns everything
pub fn filter(collection: &Collection, category: &str) -> Collection {
    if category == ALL_CATEGORIES {
        return collection.clone();
    }
    collection
        .iter()
        .filter(|q| q.category == category)
        .cloned()
        .collect()
}

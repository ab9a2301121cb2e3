use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use log2::debug;
use serde::{Deserialize, Serialize};

/// Raw text of every known page, keyed by address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIndex {
    pages: BTreeMap<String, String>,
}

impl ContentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON object of `address -> raw text`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file {:?}", path))?;
        let index: ContentIndex = serde_json::from_str(&raw)
            .with_context(|| format!("Content file {:?} is not a JSON object of strings", path))?;
        Ok(index)
    }

    pub fn insert(&mut self, address: impl Into<String>, raw: impl Into<String>) {
        self.pages.insert(address.into(), raw.into());
    }

    pub fn get(&self, address: &str) -> Option<&str> {
        self.pages.get(address).map(String::as_str)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.pages.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates in address order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages.iter().map(|(address, raw)| (address.as_str(), raw.as_str()))
    }

    /// Addresses of every page whose content contains all keywords of `query`.
    /// Matching ignores case; an empty query matches nothing.
    pub fn relevant_pages(&self, query: &str) -> BTreeSet<String> {
        let words = keywords(query);
        if words.is_empty() {
            return BTreeSet::new();
        }

        let hits: BTreeSet<String> = self
            .pages
            .iter()
            .filter(|(_, raw)| {
                let lowered = raw.to_lowercase();
                words.iter().all(|word| lowered.contains(word.as_str()))
            })
            .map(|(address, _)| address.clone())
            .collect();

        debug!("Query {:?} matched {} of {} pages", query, hits.len(), self.pages.len());
        hits
    }
}

impl FromIterator<(String, String)> for ContentIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { pages: iter.into_iter().collect() }
    }
}

/// Lowercased whitespace separated words of a query
pub fn keywords(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}
